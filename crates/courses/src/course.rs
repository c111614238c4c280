use chrono::{DateTime, Utc};

use courseadmin_core::{CourseId, DomainError, DomainResult, UserId};

use crate::model::{Course, CourseDraft};
use crate::rules::owned_course;
use crate::store::{NewCourse, Stores};

#[derive(Clone)]
pub struct CourseService {
    stores: Stores,
}

impl CourseService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Create a course taught by `caller`.
    pub fn create(&self, caller: UserId, draft: CourseDraft, now: DateTime<Utc>) -> DomainResult<Course> {
        draft.validate()?;
        if self.stores.users.find_by_id(caller)?.is_none() {
            return Err(DomainError::UserNotFound);
        }

        let course = self.stores.courses.insert_course(NewCourse {
            title: draft.title.trim().to_string(),
            description: draft.description,
            teacher_id: caller,
            created_at: now,
        })?;
        tracing::info!(course_id = %course.id, teacher_id = %caller, "course created");
        Ok(course)
    }

    pub fn update(&self, caller: UserId, id: CourseId, draft: CourseDraft) -> DomainResult<Course> {
        draft.validate()?;
        let mut course = owned_course(self.stores.courses.as_ref(), id, caller)?;

        course.title = draft.title.trim().to_string();
        course.description = draft.description;
        self.stores.courses.save_course(&course)?;
        Ok(course)
    }

    pub fn delete(&self, caller: UserId, id: CourseId) -> DomainResult<Course> {
        let course = owned_course(self.stores.courses.as_ref(), id, caller)?;
        self.stores.courses.delete_course(id)?;
        tracing::info!(course_id = %id, teacher_id = %caller, "course deleted");
        Ok(course)
    }

    pub fn get(&self, id: CourseId) -> DomainResult<Course> {
        self.stores.courses.find_course(id)?.ok_or(DomainError::CourseNotFound)
    }

    pub fn list(&self) -> DomainResult<Vec<Course>> {
        self.stores.courses.list_courses()
    }

    /// Courses the caller is actively enrolled in.
    pub fn learning(&self, caller: UserId) -> DomainResult<Vec<Course>> {
        self.stores.courses.courses_learned_by(caller)
    }

    pub fn teaching(&self, caller: UserId) -> DomainResult<Vec<Course>> {
        self.stores.courses.courses_taught_by(caller)
    }
}
