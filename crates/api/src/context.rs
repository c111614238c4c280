use courseadmin_auth::{AuthError, Principal};
use courseadmin_core::UserId;

/// Security context for a request.
///
/// Set by the auth middleware on every request and immutable afterwards.
/// Anonymous when no bearer token was presented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self { principal: Some(principal) }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn require_principal(&self) -> Result<&Principal, AuthError> {
        self.principal.as_ref().ok_or(AuthError::Unauthenticated)
    }

    pub fn current_user_id(&self) -> Result<UserId, AuthError> {
        Ok(self.require_principal()?.user_id)
    }

    pub fn current_username(&self) -> Result<&str, AuthError> {
        Ok(self.require_principal()?.username.as_str())
    }
}
