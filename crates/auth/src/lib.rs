//! `courseadmin-auth`: stateless authentication/authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage: stores and the
//! password hash are consumed through traits, tokens are plain strings.

pub mod authorize;
pub mod claims;
pub mod login;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{Access, AuthError, check_access, require_role};
pub use claims::{TOKEN_TTL_SECS, TokenClaims, TokenValidationError, validate_claims};
pub use login::{Authenticator, CredentialVerifier, LoginOutcome};
pub use password::{Argon2PasswordEncoder, PasswordEncoder};
pub use principal::Principal;
pub use roles::{Role, RoleRecord, RoleStore, resolve_roles, seed_default_roles};
pub use token::{
    Hs256Tokens, IssuedToken, KeyError, SigningKey, TokenError, TokenIssuer, TokenValidator,
};
pub use user::{AccountService, NewUser, RegisterUser, User, UserStore, UserView};
