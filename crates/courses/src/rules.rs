//! Domain invariants evaluated inside the business operations.
//!
//! Ownership and eligibility failures report the resource as absent
//! (`CourseNotFound`, `ModuleNotFound`, `TaskNotFound`) so an outsider cannot
//! tell "not yours" from "does not exist".

use courseadmin_core::{DomainError, DomainResult, CourseId, ModuleId, TaskId, UserId};

use crate::model::{Course, Module, Task};
use crate::store::{AssignmentStore, CourseStore, EnrollmentStore, ModuleStore};

/// Require the three-way join `student -> active enrollment -> course owning
/// module -> course.teacher == teacher`. Fails with `TaskNotFound`.
pub fn check_eligibility(
    enrollments: &dyn EnrollmentStore,
    student: UserId,
    module: ModuleId,
    teacher: UserId,
) -> DomainResult<()> {
    if enrollments.is_eligible(student, module, teacher)? {
        Ok(())
    } else {
        tracing::debug!(%student, %module, %teacher, "eligibility check failed");
        Err(DomainError::TaskNotFound)
    }
}

/// Require `user` to hold an active enrollment covering `module`. Fails with `TaskNotFound`.
pub fn check_enrolled(
    enrollments: &dyn EnrollmentStore,
    user: UserId,
    module: ModuleId,
) -> DomainResult<()> {
    if enrollments.is_enrolled_for_module(user, module)? {
        Ok(())
    } else {
        Err(DomainError::TaskNotFound)
    }
}

/// Score bound: finite, not negative, and at most `task.value`.
pub fn ensure_score_within(score: f64, task: &Task) -> DomainResult<()> {
    if !score.is_finite() || score < 0.0 || score > task.value {
        return Err(DomainError::InvalidScore);
    }
    Ok(())
}

/// Load a course the caller teaches. Fails with `CourseNotFound` otherwise.
pub fn owned_course(
    courses: &dyn CourseStore,
    course: CourseId,
    caller: UserId,
) -> DomainResult<Course> {
    match courses.find_course(course)? {
        Some(c) if c.teacher_id == caller => Ok(c),
        _ => Err(DomainError::CourseNotFound),
    }
}

/// Load a module whose course the caller teaches. Fails with `ModuleNotFound` otherwise.
pub fn owned_module(
    courses: &dyn CourseStore,
    modules: &dyn ModuleStore,
    module: ModuleId,
    caller: UserId,
) -> DomainResult<Module> {
    let Some(m) = modules.find_module(module)? else {
        return Err(DomainError::ModuleNotFound);
    };
    match courses.find_course(m.course_id)? {
        Some(c) if c.teacher_id == caller => Ok(m),
        _ => Err(DomainError::ModuleNotFound),
    }
}

/// Uniqueness of `(user, task)`. Fails with `AssignmentAlreadyExists`.
pub fn ensure_assignment_absent(
    assignments: &dyn AssignmentStore,
    user: UserId,
    task: TaskId,
) -> DomainResult<()> {
    if assignments.exists_for(user, task)? {
        return Err(DomainError::AssignmentAlreadyExists);
    }
    Ok(())
}
