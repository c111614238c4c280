//! Credential Verifier and the login flow built on top of it.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::authorize::AuthError;
use crate::password::PasswordEncoder;
use crate::token::{IssuedToken, TokenIssuer};
use crate::user::UserStore;
use crate::Principal;

/// Checks a username/password pair against stored hashed credentials.
///
/// Read-only. Unknown users, disabled accounts and wrong passwords all yield
/// `AuthenticationFailed`, and an unknown username still pays for one hash
/// verification.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
    passwords: Arc<dyn PasswordEncoder>,
    dummy_hash: String,
}

impl CredentialVerifier {
    pub fn new(
        users: Arc<dyn UserStore>,
        passwords: Arc<dyn PasswordEncoder>,
    ) -> courseadmin_core::DomainResult<Self> {
        let dummy_hash = passwords.hash("no-such-user-placeholder")?;
        Ok(Self { users, passwords, dummy_hash })
    }

    /// The username is trimmed the same way registration trims it.
    pub fn verify(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let Some(user) = self.users.find_by_username(username.trim())? else {
            let _ = self.passwords.verify(password, &self.dummy_hash);
            return Err(AuthError::AuthenticationFailed);
        };

        let matches = self.passwords.verify(password, &user.password_hash);
        if !matches || !user.enabled {
            return Err(AuthError::AuthenticationFailed);
        }

        Ok(user.principal())
    }
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub principal: Principal,
    pub token: IssuedToken,
}

/// Credential Verifier followed by the Token Issuer.
#[derive(Clone)]
pub struct Authenticator {
    verifier: CredentialVerifier,
    issuer: Arc<dyn TokenIssuer>,
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(
        verifier: CredentialVerifier,
        issuer: Arc<dyn TokenIssuer>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self { verifier, issuer, users }
    }

    /// Verify credentials, issue a token and record the login time.
    ///
    /// A failed last-login update is logged and does not fail the login.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AuthError> {
        let principal = match self.verifier.verify(username, password) {
            Ok(principal) => principal,
            Err(err) => {
                if matches!(err, AuthError::AuthenticationFailed) {
                    tracing::warn!(username = %username, "login failed");
                }
                return Err(err);
            }
        };

        let token = self.issuer.issue(&principal, now)?;

        if let Err(err) = self.users.touch_last_login(&principal.username, now) {
            tracing::warn!(user_id = %principal.user_id, error = %err, "failed to record last login");
        }

        tracing::info!(user_id = %principal.user_id, username = %principal.username, "login succeeded");
        Ok(LoginOutcome { principal, token })
    }
}
