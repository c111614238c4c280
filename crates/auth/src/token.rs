//! Token Issuer and Token Validator (HS256 session tokens).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::Principal;
use crate::claims::{TokenClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token time window is invalid")]
    InvalidTimeWindow,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenValidationError> for TokenError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => Self::Expired,
            TokenValidationError::NotYetValid => Self::NotYetValid,
            TokenValidationError::InvalidTimeWindow => Self::InvalidTimeWindow,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("signing key is empty")]
    Empty,

    #[error("signing key is not valid base64: {0}")]
    Base64(String),
}

/// Process-wide HMAC key. Loaded once at startup, read-only afterwards.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self(bytes))
    }

    /// Decode a standard-alphabet base64 secret.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| KeyError::Base64(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningKey").field("len", &self.0.len()).finish_non_exhaustive()
    }
}

/// Signed token plus the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<IssuedToken, TokenError>;
}

pub trait TokenValidator: Send + Sync {
    /// Verify `token` and rebuild the principal it was issued for.
    ///
    /// `token` is the compact form without any `Bearer ` prefix.
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError>;
}

/// HS256 implementation of both token roles, sharing one key.
pub struct Hs256Tokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Hs256Tokens {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(&key.0),
            decoding_key: DecodingKey::from_secret(&key.0),
            validation,
        }
    }
}

impl TokenIssuer for Hs256Tokens {
    fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let claims = TokenClaims::for_principal(principal, now);
        let expires_at = claims.expires_at().ok_or(TokenError::InvalidTimeWindow)?;

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }
}

impl TokenValidator for Hs256Tokens {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;

        validate_claims(&data.claims, now)?;

        data.claims.into_principal().map_err(|_| TokenError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::{Duration, TimeZone};
    use courseadmin_core::UserId;
    use proptest::prelude::*;

    use crate::Role;

    fn tokens() -> Hs256Tokens {
        Hs256Tokens::new(&SigningKey::from_bytes(b"0123456789abcdef0123456789abcdef".to_vec()).unwrap())
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 8, 30, 0).unwrap()
    }

    fn ana() -> Principal {
        Principal::new(UserId::new(11), "ana", [Role::student()])
    }

    fn segments(token: &str) -> Vec<String> {
        token.split('.').map(str::to_string).collect()
    }

    #[test]
    fn issued_token_validates_before_expiry_only() {
        let t = tokens();
        let issued = t.issue(&ana(), t0()).unwrap();
        assert_eq!(issued.expires_at, t0() + Duration::hours(24));

        let almost = t0() + Duration::hours(24) - Duration::seconds(1);
        assert_eq!(t.validate(&issued.token, almost).unwrap(), ana());
        assert_eq!(
            t.validate(&issued.token, t0() + Duration::hours(24)),
            Err(TokenError::Expired)
        );
        assert_eq!(
            t.validate(&issued.token, t0() + Duration::days(30)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn every_signature_byte_matters() {
        let t = tokens();
        let issued = t.issue(&ana(), t0()).unwrap();
        let parts = segments(&issued.token);
        let signature = URL_SAFE_NO_PAD.decode(&parts[2]).unwrap();

        for i in 0..signature.len() {
            let mut flipped = signature.clone();
            flipped[i] ^= 0x01;
            let forged = format!("{}.{}.{}", parts[0], parts[1], URL_SAFE_NO_PAD.encode(&flipped));
            assert_eq!(t.validate(&forged, t0()), Err(TokenError::BadSignature), "byte {i}");
        }
    }

    #[test]
    fn altered_claims_without_resigning_fail() {
        let t = tokens();
        let issued = t.issue(&ana(), t0()).unwrap();
        let parts = segments(&issued.token);

        let mut claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(&parts[1]).unwrap()).unwrap();
        claims["authorities"] = serde_json::json!(["ROLE_ADMIN"]);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());

        let forged = format!("{}.{}.{}", parts[0], payload, parts[2]);
        assert_eq!(t.validate(&forged, t0()), Err(TokenError::BadSignature));
    }

    #[test]
    fn foreign_key_is_rejected() {
        let other = Hs256Tokens::new(&SigningKey::from_bytes(b"another-secret".to_vec()).unwrap());
        let issued = other.issue(&ana(), t0()).unwrap();
        assert_eq!(tokens().validate(&issued.token, t0()), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let t = tokens();
        assert_eq!(t.validate("", t0()), Err(TokenError::Malformed));
        assert_eq!(t.validate("not-a-token", t0()), Err(TokenError::Malformed));
        assert_eq!(t.validate("a.b.c", t0()), Err(TokenError::Malformed));
    }

    #[test]
    fn base64_keys_decode() {
        let key = SigningKey::from_base64("c2VjcmV0LWtleQ==").unwrap();
        assert_eq!(key.len(), "secret-key".len());
        assert_eq!(SigningKey::from_base64("").unwrap_err(), KeyError::Empty);
        assert!(matches!(SigningKey::from_base64("***"), Err(KeyError::Base64(_))));
    }

    #[test]
    fn key_debug_does_not_leak_bytes() {
        let key = SigningKey::from_bytes(b"super-secret".to_vec()).unwrap();
        assert!(!format!("{key:?}").contains("super"));
    }

    fn role_set() -> impl Strategy<Value = Vec<Role>> {
        prop::collection::vec("[A-Z]{1,12}", 0..5).prop_map(|names| {
            names
                .iter()
                .map(|n| Role::canonical(n).unwrap())
                .collect::<Vec<_>>()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn issue_then_validate_reconstructs_the_principal(
            user_id in any::<i64>(),
            username in "[a-zA-Z0-9_.]{1,20}",
            roles in role_set(),
            offset in 0i64..86_400,
        ) {
            let t = tokens();
            let principal = Principal::new(UserId::new(user_id), username, roles);
            let issued = t.issue(&principal, t0()).unwrap();

            let back = t.validate(&issued.token, t0() + Duration::seconds(offset)).unwrap();
            prop_assert_eq!(back.user_id, principal.user_id);
            prop_assert_eq!(&back.username, &principal.username);
            prop_assert_eq!(back.authority_names(), principal.authority_names());
        }
    }
}
