use tracing::info;

use crate::{
    dao::models::{Category, ScoreBoard, TeamSlot},
    error::ServiceError,
    services::events,
    state::SharedState,
};

/// Raw per-category values as submitted by the admin form.
#[derive(Debug, Clone, Default)]
pub struct ScoreInput {
    pub red: Option<String>,
    pub white: Option<String>,
    pub gray: Option<String>,
}

impl ScoreInput {
    fn raw(&self, category: Category) -> Option<&str> {
        match category {
            Category::Red => self.red.as_deref(),
            Category::White => self.white.as_deref(),
            Category::Gray => self.gray.as_deref(),
        }
    }
}

/// Partial update to the scoreboard. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ScoreboardUpdate {
    pub team1_name: Option<String>,
    pub team2_name: Option<String>,
    pub team1_scores: ScoreInput,
    pub team2_scores: ScoreInput,
}

impl ScoreboardUpdate {
    fn name(&self, slot: TeamSlot) -> Option<&str> {
        match slot {
            TeamSlot::Team1 => self.team1_name.as_deref(),
            TeamSlot::Team2 => self.team2_name.as_deref(),
        }
    }

    fn scores(&self, slot: TeamSlot) -> &ScoreInput {
        match slot {
            TeamSlot::Team1 => &self.team1_scores,
            TeamSlot::Team2 => &self.team2_scores,
        }
    }
}

/// Merge `update` into `board`.
///
/// A present name always wins, even when empty. A score only replaces the stored one
/// when it parses as a non-negative integer; anything else counts as not provided.
pub fn apply_update(board: &mut ScoreBoard, update: &ScoreboardUpdate) {
    for slot in TeamSlot::ALL {
        let team = board.team_mut(slot);
        if let Some(name) = update.name(slot) {
            team.name = name.to_string();
        }

        let input = update.scores(slot);
        for category in Category::ALL {
            if let Some(value) = parse_count(input.raw(category)) {
                team.score.set(category, value);
            }
        }
    }
}

fn parse_count(raw: Option<&str>) -> Option<u32> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())?
        .parse()
        .ok()
}

/// Current document, read fresh from the store.
pub async fn get_state(state: &SharedState) -> ScoreBoard {
    state.store().load().await
}

/// Apply a partial update, persist the merged document and notify viewers.
pub async fn update(
    state: &SharedState,
    update: ScoreboardUpdate,
) -> Result<ScoreBoard, ServiceError> {
    let _gate = state.lock_writes().await;
    let mut board = state.store().load().await;
    apply_update(&mut board, &update);
    state.store().save(board.clone()).await?;

    info!(
        team1 = %board.team1.name,
        team2 = %board.team2.name,
        "scoreboard updated"
    );
    events::broadcast_score_update(state, &board);
    Ok(board)
}

/// Record `winner` verbatim (or clear it with `None`), persist and notify viewers.
pub async fn declare_winner(
    state: &SharedState,
    winner: Option<String>,
) -> Result<ScoreBoard, ServiceError> {
    let _gate = state.lock_writes().await;
    let mut board = state.store().load().await;
    board.winner = winner;
    state.store().save(board.clone()).await?;

    info!(winner = ?board.winner, "winner declared");
    events::broadcast_winner_declared(state, board.winner.as_deref());
    events::broadcast_score_update(state, &board);
    Ok(board)
}

/// Restore the default document and notify viewers.
pub async fn reset(state: &SharedState) -> Result<ScoreBoard, ServiceError> {
    let _gate = state.lock_writes().await;
    let board = ScoreBoard::default();
    state.store().save(board.clone()).await?;

    info!("scoreboard reset to defaults");
    events::broadcast_score_update(state, &board);
    Ok(board)
}
