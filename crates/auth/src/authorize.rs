use thiserror::Error;

use courseadmin_core::DomainError;

use crate::token::TokenError;
use crate::{Principal, Role};

/// Authentication and role-gate failures.
///
/// These short-circuit a request before any business operation runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown user, disabled account or wrong password. Deliberately one case.
    #[error("invalid credentials")]
    AuthenticationFailed,

    #[error("invalid token: {0}")]
    InvalidToken(TokenError),

    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    /// A token could not be produced after the credentials checked out.
    #[error("token issuance failed: {0}")]
    Issuance(TokenError),

    #[error(transparent)]
    Backend(#[from] DomainError),
}

impl From<TokenError> for AuthError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Signing(_) => Self::Issuance(value),
            other => Self::InvalidToken(other),
        }
    }
}

/// Declarative access requirement of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable without a token.
    Anonymous,
    /// Any valid principal.
    Authenticated,
    /// Principal must hold at least one of these roles (short or canonical names).
    AnyRole(&'static [&'static str]),
}

/// Require that `principal` holds one of `required`.
pub fn require_role(principal: &Principal, required: &[Role]) -> Result<(), AuthError> {
    if principal.has_any_role(required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Evaluate a route requirement against the (possibly absent) principal.
///
/// - `Anonymous` always passes.
/// - `Authenticated` without a principal is `Unauthenticated`.
/// - `AnyRole` without a principal is `Forbidden`, as is a principal outside the set.
pub fn check_access(access: &Access, principal: Option<&Principal>) -> Result<(), AuthError> {
    match access {
        Access::Anonymous => Ok(()),
        Access::Authenticated => principal.map(|_| ()).ok_or(AuthError::Unauthenticated),
        Access::AnyRole(names) => {
            let principal = principal.ok_or(AuthError::Forbidden)?;
            let required = canonical_roles(names);
            require_role(principal, &required)
        }
    }
}

fn canonical_roles(names: &[&str]) -> Vec<Role> {
    names
        .iter()
        .filter_map(|name| match Role::canonical(name) {
            Ok(role) => Some(role),
            Err(err) => {
                tracing::error!(role = %name, error = %err, "unusable role name in access policy");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseadmin_core::UserId;

    const STAFF: &[&str] = &["TEACHER", "ADMIN"];

    fn teacher() -> Principal {
        Principal::new(UserId::new(2), "gil", [Role::teacher()])
    }

    fn student() -> Principal {
        Principal::new(UserId::new(3), "ana", [Role::student()])
    }

    #[test]
    fn anonymous_routes_always_pass() {
        assert!(check_access(&Access::Anonymous, None).is_ok());
        assert!(check_access(&Access::Anonymous, Some(&student())).is_ok());
    }

    #[test]
    fn authenticated_routes_need_a_principal() {
        assert_eq!(
            check_access(&Access::Authenticated, None),
            Err(AuthError::Unauthenticated)
        );
        assert!(check_access(&Access::Authenticated, Some(&student())).is_ok());
    }

    #[test]
    fn role_gates_intersect_authorities() {
        assert!(check_access(&Access::AnyRole(STAFF), Some(&teacher())).is_ok());
        assert_eq!(
            check_access(&Access::AnyRole(STAFF), Some(&student())),
            Err(AuthError::Forbidden)
        );
        assert_eq!(check_access(&Access::AnyRole(STAFF), None), Err(AuthError::Forbidden));
    }

    #[test]
    fn gate_names_are_compared_canonically() {
        assert!(check_access(&Access::AnyRole(&["ROLE_TEACHER"]), Some(&teacher())).is_ok());
        assert!(check_access(&Access::AnyRole(&["teacher"]), Some(&teacher())).is_ok());
    }

    #[test]
    fn principal_without_roles_is_forbidden() {
        let p = Principal::new(UserId::new(9), "nobody", []);
        assert_eq!(require_role(&p, &[Role::student()]), Err(AuthError::Forbidden));
    }

    #[test]
    fn signing_failures_are_not_token_failures() {
        assert!(matches!(
            AuthError::from(TokenError::Signing("boom".into())),
            AuthError::Issuance(_)
        ));
        assert_eq!(
            AuthError::from(TokenError::Expired),
            AuthError::InvalidToken(TokenError::Expired)
        );
    }
}
