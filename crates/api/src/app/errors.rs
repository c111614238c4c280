use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use courseadmin_auth::AuthError;
use courseadmin_core::DomainError;

/// Error returned by handlers and the role gate.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Domain(DomainError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Backend(err) => Self::Domain(err),
            other => Self::Auth(other),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        Self::Domain(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Auth(err) => auth_error_to_response(err),
            Self::Domain(err) => domain_error_to_response(err),
        }
    }
}

fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::AuthenticationFailed => json_error(
            StatusCode::UNAUTHORIZED,
            "authentication_failed",
            "invalid credentials",
        ),
        AuthError::InvalidToken(_) => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_token", "invalid or expired token")
        }
        AuthError::Unauthenticated => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        ),
        AuthError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "no authorization"),
        AuthError::Issuance(cause) => {
            tracing::error!(error = %cause, "token issuance failed");
            internal_error()
        }
        AuthError::Backend(err) => domain_error_to_response(err),
    }
}

/// Business failures are 400 with a stable code; collaborator failures are a
/// generic 500 and only the log carries the cause.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let code = match &err {
        DomainError::Validation(_) => "validation_error",
        DomainError::UserNotFound => "user_not_found",
        DomainError::RoleNotFound(_) => "role_not_found",
        DomainError::UsernameTaken => "username_taken",
        DomainError::CourseNotFound => "course_not_found",
        DomainError::ModuleNotFound => "module_not_found",
        DomainError::TaskNotFound => "task_not_found",
        DomainError::AssignmentNotFound => "assignment_not_found",
        DomainError::EnrollmentNotFound => "enrollment_not_found",
        DomainError::InvalidScore => "invalid_score",
        DomainError::AssignmentAlreadyExists => "assignment_already_exists",
        DomainError::EnrollmentAlreadyActive => "enrollment_already_active",
        DomainError::Storage(cause) => {
            tracing::error!(error = %cause, "storage failure");
            return internal_error();
        }
    };

    json_error(StatusCode::BAD_REQUEST, code, err.to_string())
}

fn internal_error() -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
