//! Assignment operations.
//!
//! Order of checks matters: eligibility always runs before uniqueness and the
//! score bound, so a caller who may not see a task learns nothing about which
//! `(user, task)` pairs already exist or what the task is worth.

use chrono::{DateTime, Utc};

use courseadmin_core::{AssignmentId, DomainError, DomainResult, TaskId, UserId};

use crate::model::{Assignment, AssignmentDraft, AssignmentStatus, Submission, Task};
use crate::rules::{
    check_eligibility, check_enrolled, ensure_assignment_absent, ensure_score_within, owned_module,
};
use crate::store::Stores;

/// Partial update of an assignment by its teacher.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentChange {
    #[serde(default)]
    pub status: Option<AssignmentStatus>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Clone)]
pub struct AssignmentService {
    stores: Stores,
}

impl AssignmentService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Teacher creates an assignment for one of their students.
    pub fn create(&self, caller: UserId, draft: AssignmentDraft, now: DateTime<Utc>) -> DomainResult<Assignment> {
        let task = self.active_task(draft.task_id)?;
        check_eligibility(self.stores.enrollments.as_ref(), draft.user_id, task.module_id, caller)?;
        ensure_assignment_absent(self.stores.assignments.as_ref(), draft.user_id, task.id)?;
        if let Some(score) = draft.score {
            ensure_score_within(score, &task)?;
        }

        let status = draft.status.unwrap_or_default();
        let assignment = Assignment {
            id: AssignmentId::new(),
            user_id: draft.user_id,
            task_id: task.id,
            status,
            score: draft.score,
            submitted_at: (status == AssignmentStatus::Completed).then_some(now),
        };
        self.stores.assignments.insert_assignment(&assignment)?;
        tracing::info!(assignment_id = %assignment.id, task_id = %task.id, student = %draft.user_id, "assignment created");
        Ok(assignment)
    }

    /// Student submits work for a task of a course they are enrolled in.
    pub fn submit(
        &self,
        caller: UserId,
        task_id: TaskId,
        submission: Submission,
        now: DateTime<Utc>,
    ) -> DomainResult<Assignment> {
        let task = self.active_task(task_id)?;
        check_enrolled(self.stores.enrollments.as_ref(), caller, task.module_id)?;
        ensure_assignment_absent(self.stores.assignments.as_ref(), caller, task.id)?;
        if let Some(score) = submission.score {
            ensure_score_within(score, &task)?;
        }

        let assignment = Assignment {
            id: AssignmentId::new(),
            user_id: caller,
            task_id: task.id,
            status: AssignmentStatus::Completed,
            score: submission.score,
            submitted_at: Some(now),
        };
        self.stores.assignments.insert_assignment(&assignment)?;
        tracing::info!(assignment_id = %assignment.id, task_id = %task.id, student = %caller, "assignment submitted");
        Ok(assignment)
    }

    /// Teacher changes status and/or score.
    pub fn update(
        &self,
        caller: UserId,
        id: AssignmentId,
        change: AssignmentChange,
        now: DateTime<Utc>,
    ) -> DomainResult<Assignment> {
        let mut assignment = self.find(id)?;
        let task = self.task(assignment.task_id)?;
        check_eligibility(self.stores.enrollments.as_ref(), assignment.user_id, task.module_id, caller)?;
        if let Some(score) = change.score {
            ensure_score_within(score, &task)?;
            assignment.score = Some(score);
        }

        if let Some(status) = change.status {
            assignment.status = status;
            if status == AssignmentStatus::Completed && assignment.submitted_at.is_none() {
                assignment.submitted_at = Some(now);
            }
        }

        self.stores.assignments.save_assignment(&assignment)?;
        Ok(assignment)
    }

    /// Teacher grades an assignment: sets the score and completes it.
    pub fn grade(&self, caller: UserId, id: AssignmentId, score: f64, now: DateTime<Utc>) -> DomainResult<Assignment> {
        let mut assignment = self.find(id)?;
        let task = self.task(assignment.task_id)?;
        check_eligibility(self.stores.enrollments.as_ref(), assignment.user_id, task.module_id, caller)?;
        ensure_score_within(score, &task)?;

        assignment.status = AssignmentStatus::Completed;
        assignment.score = Some(score);
        assignment.submitted_at = Some(now);
        self.stores.assignments.save_assignment(&assignment)?;
        tracing::info!(assignment_id = %id, graded_by = %caller, score, "assignment graded");
        Ok(assignment)
    }

    pub fn delete(&self, caller: UserId, id: AssignmentId) -> DomainResult<()> {
        let assignment = self.find(id)?;
        if !self.teacher_may_see(caller, &assignment)? {
            return Err(DomainError::AssignmentNotFound);
        }
        self.stores.assignments.delete_assignment(id)?;
        tracing::info!(assignment_id = %id, deleted_by = %caller, "assignment deleted");
        Ok(())
    }

    /// Visible to the student it belongs to and to an eligible teacher.
    pub fn get(&self, caller: UserId, id: AssignmentId) -> DomainResult<Assignment> {
        let assignment = self.find(id)?;
        if assignment.user_id == caller || self.teacher_may_see(caller, &assignment)? {
            Ok(assignment)
        } else {
            Err(DomainError::AssignmentNotFound)
        }
    }

    pub fn mine(&self, caller: UserId) -> DomainResult<Vec<Assignment>> {
        self.stores.assignments.assignments_of_user(caller)
    }

    /// All assignments of a task whose course the caller teaches.
    pub fn of_task(&self, caller: UserId, task_id: TaskId) -> DomainResult<Vec<Assignment>> {
        let task = self.task(task_id)?;
        match owned_module(
            self.stores.courses.as_ref(),
            self.stores.modules.as_ref(),
            task.module_id,
            caller,
        ) {
            Ok(_) => {}
            Err(DomainError::ModuleNotFound) => return Err(DomainError::TaskNotFound),
            Err(other) => return Err(other),
        }
        self.stores.assignments.assignments_of_task(task_id)
    }

    fn find(&self, id: AssignmentId) -> DomainResult<Assignment> {
        self.stores
            .assignments
            .find_assignment(id)?
            .ok_or(DomainError::AssignmentNotFound)
    }

    fn task(&self, id: TaskId) -> DomainResult<Task> {
        self.stores.tasks.find_task(id)?.ok_or(DomainError::TaskNotFound)
    }

    fn active_task(&self, id: TaskId) -> DomainResult<Task> {
        match self.stores.tasks.find_task(id)? {
            Some(task) if task.active => Ok(task),
            _ => Err(DomainError::TaskNotFound),
        }
    }

    fn teacher_may_see(&self, caller: UserId, assignment: &Assignment) -> DomainResult<bool> {
        let Some(task) = self.stores.tasks.find_task(assignment.task_id)? else {
            return Ok(false);
        };
        self.stores
            .enrollments
            .is_eligible(assignment.user_id, task.module_id, caller)
    }
}
