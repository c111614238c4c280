//! Course-side records and the inputs that create or change them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courseadmin_core::{
    AssignmentId, CourseId, DomainError, DomainResult, EnrollmentId, ModuleId, TaskId, UserId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub active: bool,
    /// Owning teacher. Only this user may mutate the course or its modules.
    pub teacher_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub course_id: CourseId,
    pub module_name: String,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub module_id: ModuleId,
    pub title: String,
    /// Maximum score an assignment for this task can receive.
    pub value: f64,
    pub description: String,
    pub instructions: String,
    pub task_type: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub user_id: UserId,
    pub task_id: TaskId,
    pub status: AssignmentStatus,
    /// Never above the task's value once set.
    pub score: Option<f64>,
    pub submitted_at: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl CourseDraft {
    pub fn validate(&self) -> DomainResult<()> {
        require_text("title", &self.title)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDraft {
    pub course_id: CourseId,
    pub module_name: String,
    #[serde(default)]
    pub description: String,
}

impl ModuleDraft {
    pub fn validate(&self) -> DomainResult<()> {
        require_text("moduleName", &self.module_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub module_id: ModuleId,
    pub title: String,
    pub value: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub task_type: String,
}

impl TaskDraft {
    pub fn validate(&self) -> DomainResult<()> {
        require_text("title", &self.title)?;
        if !self.value.is_finite() || self.value <= 0.0 {
            return Err(DomainError::validation("value must be a positive number"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDraft {
    pub user_id: UserId,
    pub course_id: CourseId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraft {
    pub user_id: UserId,
    pub task_id: TaskId,
    #[serde(default)]
    pub status: Option<AssignmentStatus>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Student-side submission for a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub score: Option<f64>,
}

fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
