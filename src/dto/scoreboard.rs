//! Request and response bodies for the scoreboard endpoints.

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, serde_as};
use utoipa::{IntoParams, ToSchema};

use crate::{
    dao::models::ScoreBoard,
    services::scoreboard_service::{ScoreInput, ScoreboardUpdate},
};

/// Form posted by the admin dashboard. Every field is optional and kept raw so that
/// malformed numbers can fall back to the stored value.
#[derive(Debug, Default, ToSchema)]
pub struct DashboardForm {
    pub team1_name: Option<String>,
    pub team2_name: Option<String>,
    pub team1_red: Option<String>,
    pub team1_white: Option<String>,
    pub team1_gray: Option<String>,
    pub team2_red: Option<String>,
    pub team2_white: Option<String>,
    pub team2_gray: Option<String>,
}

impl DashboardForm {
    /// Collect the known fields from decoded form pairs. Unknown names are ignored and
    /// the first occurrence of a repeated name wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = Self::default();
        for (name, value) in pairs {
            let field = match name.as_str() {
                "team1_name" => &mut form.team1_name,
                "team2_name" => &mut form.team2_name,
                "team1_red" => &mut form.team1_red,
                "team1_white" => &mut form.team1_white,
                "team1_gray" => &mut form.team1_gray,
                "team2_red" => &mut form.team2_red,
                "team2_white" => &mut form.team2_white,
                "team2_gray" => &mut form.team2_gray,
                _ => continue,
            };
            if field.is_none() {
                *field = Some(value);
            }
        }
        form
    }
}

impl From<DashboardForm> for ScoreboardUpdate {
    fn from(form: DashboardForm) -> Self {
        Self {
            team1_name: form.team1_name,
            team2_name: form.team2_name,
            team1_scores: ScoreInput {
                red: form.team1_red,
                white: form.team1_white,
                gray: form.team1_gray,
            },
            team2_scores: ScoreInput {
                red: form.team2_red,
                white: form.team2_white,
                gray: form.team2_gray,
            },
        }
    }
}

/// JSON echo returned to programmatic dashboard callers.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreboardResponse {
    pub status: String,
    pub scoreboard: ScoreBoard,
}

impl ScoreboardResponse {
    pub fn success(scoreboard: ScoreBoard) -> Self {
        Self {
            status: "success".to_string(),
            scoreboard,
        }
    }
}

/// Body of `POST /declare_winner`. A missing or non-string winner clears it.
#[serde_as]
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct WinnerRequest {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub winner: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WinnerResponse {
    pub status: String,
    pub winner: Option<String>,
}

impl WinnerResponse {
    pub fn success(winner: Option<String>) -> Self {
        Self {
            status: "success".to_string(),
            winner,
        }
    }
}

/// Query string accepted by the public page.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ViewQuery {
    /// Viewer screen size, recorded in the visit log.
    pub screen: Option<String>,
}
