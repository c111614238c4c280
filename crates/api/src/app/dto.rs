//! Request/response bodies that have no domain counterpart.

use serde::{Deserialize, Serialize};

use courseadmin_auth::Principal;
use courseadmin_core::UserId;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub message: String,
}

/// `?score=` on the grading endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GradeQuery {
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub user_id: UserId,
    pub username: String,
    pub authorities: Vec<String>,
}

impl From<&Principal> for WhoAmI {
    fn from(principal: &Principal) -> Self {
        Self {
            user_id: principal.user_id,
            username: principal.username.clone(),
            authorities: principal.authority_names(),
        }
    }
}
