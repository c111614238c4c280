//! `courseadmin-core`: identifiers and the domain error taxonomy.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AssignmentId, CourseId, EnrollmentId, ModuleId, TaskId, UserId};
