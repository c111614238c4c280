//! Collaborator store contracts consumed by the course-side operations.
//!
//! Every method is a plain lookup or save; the rules in [`crate::rules`] and the
//! services decide what a caller may do with the results.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use courseadmin_auth::UserStore;
use courseadmin_core::{
    AssignmentId, CourseId, DomainResult, EnrollmentId, ModuleId, TaskId, UserId,
};

use crate::model::{Assignment, Course, Enrollment, Module, Task};

/// Course about to be inserted. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub teacher_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewModule {
    pub course_id: CourseId,
    pub module_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub created_at: DateTime<Utc>,
}

pub trait CourseStore: Send + Sync {
    fn find_course(&self, id: CourseId) -> DomainResult<Option<Course>>;
    fn insert_course(&self, course: NewCourse) -> DomainResult<Course>;
    fn save_course(&self, course: &Course) -> DomainResult<()>;
    /// Remove the course together with its modules and enrollments.
    fn delete_course(&self, id: CourseId) -> DomainResult<()>;
    /// All courses, ordered by title.
    fn list_courses(&self) -> DomainResult<Vec<Course>>;
    fn courses_taught_by(&self, teacher: UserId) -> DomainResult<Vec<Course>>;
    /// Active courses in which `user` holds an active enrollment.
    fn courses_learned_by(&self, user: UserId) -> DomainResult<Vec<Course>>;
}

pub trait ModuleStore: Send + Sync {
    fn find_module(&self, id: ModuleId) -> DomainResult<Option<Module>>;
    fn insert_module(&self, module: NewModule) -> DomainResult<Module>;
    fn save_module(&self, module: &Module) -> DomainResult<()>;
    /// Active modules of a course, ordered by name.
    fn active_modules_of(&self, course: CourseId) -> DomainResult<Vec<Module>>;
    fn list_modules(&self) -> DomainResult<Vec<Module>>;
}

pub trait EnrollmentStore: Send + Sync {
    fn find_enrollment(&self, id: EnrollmentId) -> DomainResult<Option<Enrollment>>;
    /// Active enrollment of `user` in `course`, provided the course is active too.
    fn find_active(&self, user: UserId, course: CourseId) -> DomainResult<Option<Enrollment>>;
    fn insert_enrollment(&self, enrollment: NewEnrollment) -> DomainResult<Enrollment>;
    fn save_enrollment(&self, enrollment: &Enrollment) -> DomainResult<()>;
    fn enrollments_of_user(&self, user: UserId) -> DomainResult<Vec<Enrollment>>;
    fn enrollments_of_course(&self, course: CourseId) -> DomainResult<Vec<Enrollment>>;
    fn list_enrollments(&self) -> DomainResult<Vec<Enrollment>>;

    /// Three-way eligibility join.
    ///
    /// True iff `student` holds an active enrollment in an active course that
    /// owns `module`, and that course is taught by `teacher`.
    fn is_eligible(&self, student: UserId, module: ModuleId, teacher: UserId) -> DomainResult<bool>;

    /// True iff `user` holds an active enrollment in the active course owning `module`.
    fn is_enrolled_for_module(&self, user: UserId, module: ModuleId) -> DomainResult<bool>;
}

pub trait TaskStore: Send + Sync {
    fn find_task(&self, id: TaskId) -> DomainResult<Option<Task>>;
    /// Insert or replace.
    fn save_task(&self, task: &Task) -> DomainResult<()>;
    /// Active tasks of a module, newest first.
    fn active_tasks_of(&self, module: ModuleId) -> DomainResult<Vec<Task>>;
    fn find_tasks(&self, ids: &[TaskId]) -> DomainResult<Vec<Task>>;
}

pub trait AssignmentStore: Send + Sync {
    fn find_assignment(&self, id: AssignmentId) -> DomainResult<Option<Assignment>>;
    fn exists_for(&self, user: UserId, task: TaskId) -> DomainResult<bool>;
    /// Insert a new assignment. Fails with `AssignmentAlreadyExists` when the
    /// `(user, task)` pair is already taken, checked atomically with the write.
    fn insert_assignment(&self, assignment: &Assignment) -> DomainResult<()>;
    fn save_assignment(&self, assignment: &Assignment) -> DomainResult<()>;
    fn delete_assignment(&self, id: AssignmentId) -> DomainResult<()>;
    /// Newest submission first.
    fn assignments_of_user(&self, user: UserId) -> DomainResult<Vec<Assignment>>;
    fn assignments_of_task(&self, task: TaskId) -> DomainResult<Vec<Assignment>>;
}

/// Every collaborator the course-side operations need.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub courses: Arc<dyn CourseStore>,
    pub modules: Arc<dyn ModuleStore>,
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub assignments: Arc<dyn AssignmentStore>,
}
