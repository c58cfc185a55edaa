use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    controller::{Outcome, UiState},
    models::User,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DraftRequest {
    /// Note name
    pub name: String,
    /// Note description
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EditFieldsRequest {
    /// New name
    pub name: String,
    /// New description
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeResponse {
    Applied,
    Skipped,
}

impl From<Outcome> for OutcomeResponse {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Applied => Self::Applied,
            Outcome::Skipped => Self::Skipped,
        }
    }
}

/// Result of a create or save, with the page state after it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MutationResponse {
    pub outcome: OutcomeResponse,
    pub state: UiState,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Username assigned by the identity provider
    pub username: String,
    /// Login identifier, usually an email address
    pub login_id: Option<String>,
    /// What the page shows after "Signed in as"
    pub display_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            display_name: user.display_name().to_string(),
            username: user.username,
            login_id: user.login_id,
        }
    }
}
