use std::collections::BTreeMap;
use std::sync::RwLock;

use courseadmin_core::{CourseId, DomainError, DomainResult, EnrollmentId, ModuleId, UserId};
use courseadmin_courses::{
    Course, CourseStore, Enrollment, EnrollmentStore, Module, ModuleStore, NewCourse,
    NewEnrollment, NewModule,
};

use super::{read, write};

#[derive(Debug, Default)]
struct Tables {
    courses: BTreeMap<CourseId, Course>,
    modules: BTreeMap<ModuleId, Module>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    next_course: i64,
    next_module: i64,
    next_enrollment: i64,
}

impl Tables {
    fn active_course(&self, id: CourseId) -> Option<&Course> {
        self.courses.get(&id).filter(|c| c.active)
    }

    /// Active enrollments of `user` whose course is active and owns `module`.
    /// A deactivated module is covered by nothing.
    fn enrollments_covering(&self, user: UserId, module: ModuleId) -> impl Iterator<Item = (&Enrollment, &Course)> {
        let module_course = self.modules.get(&module).filter(|m| m.active).map(|m| m.course_id);
        self.enrollments
            .values()
            .filter(move |e| e.user_id == user && e.active && Some(e.course_id) == module_course)
            .filter_map(move |e| self.active_course(e.course_id).map(|c| (e, c)))
    }
}

/// Courses, modules and enrollments (the relational side).
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<Tables>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CourseStore for InMemoryCatalog {
    fn find_course(&self, id: CourseId) -> DomainResult<Option<Course>> {
        Ok(read(&self.inner)?.courses.get(&id).cloned())
    }

    fn insert_course(&self, course: NewCourse) -> DomainResult<Course> {
        let mut tables = write(&self.inner)?;
        tables.next_course += 1;
        let stored = Course {
            id: CourseId::new(tables.next_course),
            title: course.title,
            description: course.description,
            active: true,
            teacher_id: course.teacher_id,
            created_at: course.created_at,
        };
        tables.courses.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn save_course(&self, course: &Course) -> DomainResult<()> {
        let mut tables = write(&self.inner)?;
        match tables.courses.get_mut(&course.id) {
            Some(slot) => {
                *slot = course.clone();
                Ok(())
            }
            None => Err(DomainError::CourseNotFound),
        }
    }

    fn delete_course(&self, id: CourseId) -> DomainResult<()> {
        let mut tables = write(&self.inner)?;
        if tables.courses.remove(&id).is_none() {
            return Err(DomainError::CourseNotFound);
        }
        tables.modules.retain(|_, m| m.course_id != id);
        tables.enrollments.retain(|_, e| e.course_id != id);
        Ok(())
    }

    fn list_courses(&self) -> DomainResult<Vec<Course>> {
        let mut courses: Vec<Course> = read(&self.inner)?.courses.values().cloned().collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(courses)
    }

    fn courses_taught_by(&self, teacher: UserId) -> DomainResult<Vec<Course>> {
        let mut courses: Vec<Course> = read(&self.inner)?
            .courses
            .values()
            .filter(|c| c.teacher_id == teacher)
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(courses)
    }

    fn courses_learned_by(&self, user: UserId) -> DomainResult<Vec<Course>> {
        let tables = read(&self.inner)?;
        let mut courses: Vec<Course> = tables
            .enrollments
            .values()
            .filter(|e| e.user_id == user && e.active)
            .filter_map(|e| tables.active_course(e.course_id).cloned())
            .collect();
        courses.sort_by(|a, b| a.title.cmp(&b.title));
        courses.dedup_by_key(|c| c.id);
        Ok(courses)
    }
}

impl ModuleStore for InMemoryCatalog {
    fn find_module(&self, id: ModuleId) -> DomainResult<Option<Module>> {
        Ok(read(&self.inner)?.modules.get(&id).cloned())
    }

    fn insert_module(&self, module: NewModule) -> DomainResult<Module> {
        let mut tables = write(&self.inner)?;
        if !tables.courses.contains_key(&module.course_id) {
            return Err(DomainError::CourseNotFound);
        }
        tables.next_module += 1;
        let stored = Module {
            id: ModuleId::new(tables.next_module),
            course_id: module.course_id,
            module_name: module.module_name,
            description: module.description,
            active: true,
            created_at: module.created_at,
        };
        tables.modules.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn save_module(&self, module: &Module) -> DomainResult<()> {
        let mut tables = write(&self.inner)?;
        if !tables.courses.contains_key(&module.course_id) {
            return Err(DomainError::CourseNotFound);
        }
        match tables.modules.get_mut(&module.id) {
            Some(slot) => {
                *slot = module.clone();
                Ok(())
            }
            None => Err(DomainError::ModuleNotFound),
        }
    }

    fn active_modules_of(&self, course: CourseId) -> DomainResult<Vec<Module>> {
        let mut modules: Vec<Module> = read(&self.inner)?
            .modules
            .values()
            .filter(|m| m.course_id == course && m.active)
            .cloned()
            .collect();
        modules.sort_by(|a, b| a.module_name.cmp(&b.module_name));
        Ok(modules)
    }

    fn list_modules(&self) -> DomainResult<Vec<Module>> {
        let mut modules: Vec<Module> = read(&self.inner)?.modules.values().cloned().collect();
        modules.sort_by(|a, b| a.module_name.cmp(&b.module_name));
        Ok(modules)
    }
}

impl EnrollmentStore for InMemoryCatalog {
    fn find_enrollment(&self, id: EnrollmentId) -> DomainResult<Option<Enrollment>> {
        Ok(read(&self.inner)?.enrollments.get(&id).cloned())
    }

    fn find_active(&self, user: UserId, course: CourseId) -> DomainResult<Option<Enrollment>> {
        let tables = read(&self.inner)?;
        if tables.active_course(course).is_none() {
            return Ok(None);
        }
        Ok(tables
            .enrollments
            .values()
            .find(|e| e.user_id == user && e.course_id == course && e.active)
            .cloned())
    }

    fn insert_enrollment(&self, enrollment: NewEnrollment) -> DomainResult<Enrollment> {
        let mut tables = write(&self.inner)?;
        if tables.active_course(enrollment.course_id).is_none() {
            return Err(DomainError::CourseNotFound);
        }
        let duplicate = tables
            .enrollments
            .values()
            .any(|e| e.user_id == enrollment.user_id && e.course_id == enrollment.course_id && e.active);
        if duplicate {
            return Err(DomainError::EnrollmentAlreadyActive);
        }

        tables.next_enrollment += 1;
        let stored = Enrollment {
            id: EnrollmentId::new(tables.next_enrollment),
            user_id: enrollment.user_id,
            course_id: enrollment.course_id,
            active: true,
            created_at: enrollment.created_at,
        };
        tables.enrollments.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn save_enrollment(&self, enrollment: &Enrollment) -> DomainResult<()> {
        let mut tables = write(&self.inner)?;
        match tables.enrollments.get_mut(&enrollment.id) {
            Some(slot) => {
                *slot = enrollment.clone();
                Ok(())
            }
            None => Err(DomainError::EnrollmentNotFound),
        }
    }

    fn enrollments_of_user(&self, user: UserId) -> DomainResult<Vec<Enrollment>> {
        let mut rows: Vec<Enrollment> = read(&self.inner)?
            .enrollments
            .values()
            .filter(|e| e.user_id == user)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.created_at);
        Ok(rows)
    }

    fn enrollments_of_course(&self, course: CourseId) -> DomainResult<Vec<Enrollment>> {
        let mut rows: Vec<Enrollment> = read(&self.inner)?
            .enrollments
            .values()
            .filter(|e| e.course_id == course)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.created_at);
        Ok(rows)
    }

    fn list_enrollments(&self) -> DomainResult<Vec<Enrollment>> {
        let mut rows: Vec<Enrollment> = read(&self.inner)?.enrollments.values().cloned().collect();
        rows.sort_by_key(|e| e.created_at);
        Ok(rows)
    }

    fn is_eligible(&self, student: UserId, module: ModuleId, teacher: UserId) -> DomainResult<bool> {
        let tables = read(&self.inner)?;
        let eligible = tables
            .enrollments_covering(student, module)
            .any(|(_, course)| course.teacher_id == teacher);
        Ok(eligible)
    }

    fn is_enrolled_for_module(&self, user: UserId, module: ModuleId) -> DomainResult<bool> {
        let tables = read(&self.inner)?;
        let enrolled = tables.enrollments_covering(user, module).next().is_some();
        Ok(enrolled)
    }
}
