use chrono::{DateTime, Utc};

use courseadmin_core::{CourseId, DomainError, DomainResult, EnrollmentId, UserId};

use crate::model::{Course, Enrollment, EnrollmentDraft};
use crate::rules::owned_course;
use crate::store::{NewEnrollment, Stores};

#[derive(Clone)]
pub struct EnrollmentService {
    stores: Stores,
}

impl EnrollmentService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Enroll `draft.user_id` in `draft.course_id` (staff operation).
    pub fn enroll(&self, draft: EnrollmentDraft, now: DateTime<Utc>) -> DomainResult<Enrollment> {
        if self.stores.users.find_by_id(draft.user_id)?.is_none() {
            return Err(DomainError::UserNotFound);
        }
        self.active_course(draft.course_id)?;
        if self.stores.enrollments.find_active(draft.user_id, draft.course_id)?.is_some() {
            return Err(DomainError::EnrollmentAlreadyActive);
        }

        let enrollment = self.stores.enrollments.insert_enrollment(NewEnrollment {
            user_id: draft.user_id,
            course_id: draft.course_id,
            created_at: now,
        })?;
        tracing::info!(
            enrollment_id = %enrollment.id,
            user_id = %enrollment.user_id,
            course_id = %enrollment.course_id,
            "enrollment created"
        );
        Ok(enrollment)
    }

    /// The caller enrolls themselves.
    pub fn self_enroll(&self, caller: UserId, course: CourseId, now: DateTime<Utc>) -> DomainResult<Enrollment> {
        self.enroll(EnrollmentDraft { user_id: caller, course_id: course }, now)
    }

    /// Deactivate an enrollment. Only the enrolled user or the course's teacher may.
    pub fn cancel(&self, caller: UserId, id: EnrollmentId) -> DomainResult<Enrollment> {
        let mut enrollment = self.visible(caller, id)?;
        enrollment.active = false;
        self.stores.enrollments.save_enrollment(&enrollment)?;
        tracing::info!(enrollment_id = %id, cancelled_by = %caller, "enrollment cancelled");
        Ok(enrollment)
    }

    /// Move an enrollment to another user and/or course. The caller must teach
    /// both the current and the target course.
    pub fn update(&self, caller: UserId, id: EnrollmentId, draft: EnrollmentDraft) -> DomainResult<Enrollment> {
        let mut enrollment = self
            .stores
            .enrollments
            .find_enrollment(id)?
            .ok_or(DomainError::EnrollmentNotFound)?;
        match self.stores.courses.find_course(enrollment.course_id)? {
            Some(course) if course.teacher_id == caller => {}
            _ => return Err(DomainError::EnrollmentNotFound),
        }

        if draft.user_id != enrollment.user_id && self.stores.users.find_by_id(draft.user_id)?.is_none() {
            return Err(DomainError::UserNotFound);
        }
        if draft.course_id != enrollment.course_id {
            owned_course(self.stores.courses.as_ref(), draft.course_id, caller)?;
        }

        if let Some(existing) = self.stores.enrollments.find_active(draft.user_id, draft.course_id)? {
            if existing.id != enrollment.id {
                return Err(DomainError::EnrollmentAlreadyActive);
            }
        }

        enrollment.user_id = draft.user_id;
        enrollment.course_id = draft.course_id;
        self.stores.enrollments.save_enrollment(&enrollment)?;
        Ok(enrollment)
    }

    /// Fetch an enrollment visible to the caller (enrolled user or course teacher).
    pub fn get(&self, caller: UserId, id: EnrollmentId) -> DomainResult<Enrollment> {
        self.visible(caller, id)
    }

    pub fn mine(&self, caller: UserId) -> DomainResult<Vec<Enrollment>> {
        self.stores.enrollments.enrollments_of_user(caller)
    }

    pub fn of_course(&self, course: CourseId) -> DomainResult<Vec<Enrollment>> {
        self.stores.enrollments.enrollments_of_course(course)
    }

    pub fn list(&self) -> DomainResult<Vec<Enrollment>> {
        self.stores.enrollments.list_enrollments()
    }

    fn active_course(&self, id: CourseId) -> DomainResult<Course> {
        match self.stores.courses.find_course(id)? {
            Some(course) if course.active => Ok(course),
            _ => Err(DomainError::CourseNotFound),
        }
    }

    fn visible(&self, caller: UserId, id: EnrollmentId) -> DomainResult<Enrollment> {
        let enrollment = self
            .stores
            .enrollments
            .find_enrollment(id)?
            .ok_or(DomainError::EnrollmentNotFound)?;
        if enrollment.user_id == caller {
            return Ok(enrollment);
        }

        match self.stores.courses.find_course(enrollment.course_id)? {
            Some(course) if course.teacher_id == caller => Ok(enrollment),
            _ => Err(DomainError::EnrollmentNotFound),
        }
    }
}
