use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use courseadmin_core::UserId;

use crate::{Principal, Role};

/// Session lifetime: `exp = iat + 24h`, fixed at issuance.
pub const TOKEN_TTL_SECS: i64 = 86_400;

/// Claim set carried by a session token.
///
/// Authorities travel as bare role-name strings. The Validator never needs to
/// know anything about how roles are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username.
    pub sub: String,

    #[serde(rename = "userId")]
    pub user_id: i64,

    #[serde(default)]
    pub authorities: Vec<String>,

    /// Issued-at (unix seconds).
    pub iat: i64,

    /// Expiration (unix seconds).
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

impl TokenClaims {
    /// Build the claim set for `principal`, issued at `now`.
    pub fn for_principal(principal: &Principal, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            sub: principal.username.clone(),
            user_id: principal.user_id.get(),
            authorities: principal.authority_names(),
            iat,
            exp: iat + TOKEN_TTL_SECS,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Rebuild the request principal.
    ///
    /// Each authority string is canonicalized; an entry that cannot be a role
    /// name at all makes the whole token unusable.
    pub fn into_principal(self) -> Result<Principal, courseadmin_core::DomainError> {
        let authorities = self
            .authorities
            .iter()
            .map(|name| Role::canonical(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Principal::new(UserId::new(self.user_id), self.sub, authorities))
    }
}

/// Deterministically validate the token time window.
///
/// Signature verification happens before this, in [`crate::token`]. Keeping the
/// clock check here lets callers pass an arbitrary `now`.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
