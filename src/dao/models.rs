use serde::{
    Deserialize, Deserializer, Serialize,
    de::{DeserializeOwned, Error as _},
};
use serde_json::{Map, Value};
use serde_with::{DeserializeAs, DefaultOnError, serde_as};
use utoipa::ToSchema;

/// One of the two fixed team slots of the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamSlot {
    Team1,
    Team2,
}

impl TeamSlot {
    /// Both slots, in display order.
    pub const ALL: [TeamSlot; 2] = [TeamSlot::Team1, TeamSlot::Team2];

    /// Key used for the slot in the persisted document and in form fields.
    pub fn key(self) -> &'static str {
        match self {
            TeamSlot::Team1 => "team1",
            TeamSlot::Team2 => "team2",
        }
    }

    /// Name given to a team that has never been renamed.
    pub fn default_name(self) -> &'static str {
        match self {
            TeamSlot::Team1 => "Team 1",
            TeamSlot::Team2 => "Team 2",
        }
    }
}

/// Closed set of score categories tracked per team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Red,
    White,
    Gray,
}

impl Category {
    /// Every category, in the order they are rendered.
    pub const ALL: [Category; 3] = [Category::Red, Category::White, Category::Gray];

    /// Key used for the category in the persisted document.
    pub fn key(self) -> &'static str {
        match self {
            Category::Red => "red",
            Category::White => "white",
            Category::Gray => "gray",
        }
    }
}

/// Per-category counters for a team. All three keys are always serialised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreSet {
    pub red: u32,
    pub white: u32,
    pub gray: u32,
}

impl ScoreSet {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Red => self.red,
            Category::White => self.white,
            Category::Gray => self.gray,
        }
    }

    pub fn set(&mut self, category: Category, value: u32) {
        match category {
            Category::Red => self.red = value,
            Category::White => self.white = value,
            Category::Gray => self.gray = value,
        }
    }

    /// Sum of every category, widened so large counters cannot overflow.
    pub fn total(&self) -> u64 {
        Category::ALL
            .iter()
            .map(|category| u64::from(self.get(*category)))
            .sum()
    }
}

/// A named team and its scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Team {
    pub name: String,
    pub score: ScoreSet,
}

impl Team {
    /// Fresh team for `slot` with its default name and zeroed scores.
    pub fn for_slot(slot: TeamSlot) -> Self {
        Self {
            name: slot.default_name().to_string(),
            score: ScoreSet::default(),
        }
    }
}

/// The whole persisted scoreboard document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreBoard {
    pub team1: Team,
    pub team2: Team,
    /// Winner token exactly as declared by the admin, usually `team1` or `team2`.
    pub winner: Option<String>,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self {
            team1: Team::for_slot(TeamSlot::Team1),
            team2: Team::for_slot(TeamSlot::Team2),
            winner: None,
        }
    }
}

impl ScoreBoard {
    pub fn team(&self, slot: TeamSlot) -> &Team {
        match slot {
            TeamSlot::Team1 => &self.team1,
            TeamSlot::Team2 => &self.team2,
        }
    }

    pub fn team_mut(&mut self, slot: TeamSlot) -> &mut Team {
        match slot {
            TeamSlot::Team1 => &mut self.team1,
            TeamSlot::Team2 => &mut self.team2,
        }
    }

    /// Decode a stored document, filling every missing or mistyped field with its default.
    ///
    /// Only fails when the bytes are not a JSON object at all; callers substitute
    /// [`ScoreBoard::default()`] in that case. Nested teams and score sets given as
    /// anything but objects are replaced by their defaults.
    pub fn repair_from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        let object: Map<String, Value> = serde_json::from_slice(bytes)?;
        serde_json::from_value::<RawScoreBoard>(Value::Object(object)).map(Into::into)
    }
}

/// Accepts a struct only when it is written as a JSON object.
///
/// Derived struct decoding also takes sequences, matching fields by position.
struct JsonObject;

impl<'de, T> DeserializeAs<'de, T> for JsonObject
where
    T: DeserializeOwned,
{
    fn deserialize_as<D>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        serde_json::from_value(Value::Object(object)).map_err(D::Error::custom)
    }
}

/// Lenient mirror of [`ScoreBoard`] used while loading documents that may have drifted.
#[serde_as]
#[derive(Debug, Deserialize)]
struct RawScoreBoard {
    #[serde_as(as = "DefaultOnError<Option<JsonObject>>")]
    #[serde(default)]
    team1: Option<RawTeam>,
    #[serde_as(as = "DefaultOnError<Option<JsonObject>>")]
    #[serde(default)]
    team2: Option<RawTeam>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    winner: Option<String>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct RawTeam {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    name: Option<String>,
    #[serde_as(as = "DefaultOnError<Option<JsonObject>>")]
    #[serde(default)]
    score: Option<RawScoreSet>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
struct RawScoreSet {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    red: u32,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    white: u32,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    gray: u32,
}

impl RawTeam {
    fn into_team(self, slot: TeamSlot) -> Team {
        let score = self.score.unwrap_or_default();
        Team {
            name: self.name.unwrap_or_else(|| slot.default_name().to_string()),
            score: ScoreSet {
                red: score.red,
                white: score.white,
                gray: score.gray,
            },
        }
    }
}

impl From<RawScoreBoard> for ScoreBoard {
    fn from(raw: RawScoreBoard) -> Self {
        let team = |raw_team: Option<RawTeam>, slot: TeamSlot| {
            raw_team
                .map(|team| team.into_team(slot))
                .unwrap_or_else(|| Team::for_slot(slot))
        };
        Self {
            team1: team(raw.team1, TeamSlot::Team1),
            team2: team(raw.team2, TeamSlot::Team2),
            winner: raw.winner,
        }
    }
}
