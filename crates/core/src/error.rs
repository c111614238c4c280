//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// The `*NotFound` variants double as non-disclosure errors: ownership and
/// eligibility checks report a resource the caller may not touch exactly like
/// one that does not exist, so messages never mention the reason.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("user not found")]
    UserNotFound,

    #[error("role '{0}' does not exist")]
    RoleNotFound(String),

    #[error("username or email already in use")]
    UsernameTaken,

    #[error("course not found")]
    CourseNotFound,

    #[error("module not found")]
    ModuleNotFound,

    #[error("task not found")]
    TaskNotFound,

    #[error("assignment not found")]
    AssignmentNotFound,

    #[error("enrollment not found")]
    EnrollmentNotFound,

    /// Score is negative, not finite, or above the task's value.
    #[error("score is outside the range allowed by the task")]
    InvalidScore,

    #[error("an assignment already exists for this user and task")]
    AssignmentAlreadyExists,

    #[error("user already has an active enrollment in this course")]
    EnrollmentAlreadyActive,

    /// A collaborator store failed. Never shown to clients verbatim.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
