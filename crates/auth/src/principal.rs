use std::collections::BTreeSet;

use serde::Serialize;

use courseadmin_core::UserId;

use crate::Role;

/// Authenticated identity reconstructed from a token for one request.
///
/// Never persisted. The Credential Verifier produces one at login and the
/// Token Validator rebuilds one from claims on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub authorities: BTreeSet<Role>,
}

impl Principal {
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        authorities: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            authorities: authorities.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.authorities.contains(role)
    }

    /// True when the authority set intersects `required`.
    pub fn has_any_role(&self, required: &[Role]) -> bool {
        required.iter().any(|r| self.authorities.contains(r))
    }

    pub fn authority_names(&self) -> Vec<String> {
        self.authorities.iter().map(|r| r.as_str().to_string()).collect()
    }
}
