//! Course-side domain: courses, modules, tasks, enrollments and assignments.
//!
//! Pure business rules over collaborator store contracts (no IO, no HTTP).
//! Every operation takes the caller's id explicitly.

pub mod assignment;
pub mod course;
pub mod enrollment;
pub mod model;
pub mod module;
pub mod rules;
pub mod store;
pub mod task;

pub use assignment::{AssignmentChange, AssignmentService};
pub use course::CourseService;
pub use enrollment::EnrollmentService;
pub use model::{
    Assignment, AssignmentDraft, AssignmentStatus, Course, CourseDraft, Enrollment,
    EnrollmentDraft, Module, ModuleDraft, Submission, Task, TaskDraft,
};
pub use module::ModuleService;
pub use rules::{
    check_eligibility, check_enrolled, ensure_assignment_absent, ensure_score_within,
    owned_course, owned_module,
};
pub use store::{
    AssignmentStore, CourseStore, EnrollmentStore, ModuleStore, NewCourse, NewEnrollment,
    NewModule, Stores, TaskStore,
};
pub use task::TaskService;
