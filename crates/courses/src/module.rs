use chrono::{DateTime, Utc};

use courseadmin_core::{CourseId, DomainError, DomainResult, ModuleId, UserId};

use crate::model::{Module, ModuleDraft};
use crate::rules::{owned_course, owned_module};
use crate::store::{NewModule, Stores};

#[derive(Clone)]
pub struct ModuleService {
    stores: Stores,
}

impl ModuleService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Create a module inside a course the caller teaches.
    pub fn create(&self, caller: UserId, draft: ModuleDraft, now: DateTime<Utc>) -> DomainResult<Module> {
        draft.validate()?;
        owned_course(self.stores.courses.as_ref(), draft.course_id, caller)?;

        let module = self.stores.modules.insert_module(NewModule {
            course_id: draft.course_id,
            module_name: draft.module_name.trim().to_string(),
            description: draft.description,
            created_at: now,
        })?;
        tracing::info!(module_id = %module.id, course_id = %module.course_id, "module created");
        Ok(module)
    }

    /// Rename a module or move it to another course; both ends must be owned.
    pub fn update(&self, caller: UserId, id: ModuleId, draft: ModuleDraft) -> DomainResult<Module> {
        draft.validate()?;
        let mut module = owned_module(
            self.stores.courses.as_ref(),
            self.stores.modules.as_ref(),
            id,
            caller,
        )?;

        if draft.course_id != module.course_id {
            owned_course(self.stores.courses.as_ref(), draft.course_id, caller)?;
            module.course_id = draft.course_id;
        }
        module.module_name = draft.module_name.trim().to_string();
        module.description = draft.description;

        self.stores.modules.save_module(&module)?;
        Ok(module)
    }

    /// Soft delete.
    pub fn delete(&self, caller: UserId, id: ModuleId) -> DomainResult<()> {
        let mut module = owned_module(
            self.stores.courses.as_ref(),
            self.stores.modules.as_ref(),
            id,
            caller,
        )?;
        module.active = false;
        self.stores.modules.save_module(&module)?;
        tracing::info!(module_id = %id, "module deactivated");
        Ok(())
    }

    pub fn get(&self, id: ModuleId) -> DomainResult<Module> {
        self.stores.modules.find_module(id)?.ok_or(DomainError::ModuleNotFound)
    }

    pub fn of_course(&self, course: CourseId) -> DomainResult<Vec<Module>> {
        self.stores.modules.active_modules_of(course)
    }

    pub fn list(&self) -> DomainResult<Vec<Module>> {
        self.stores.modules.list_modules()
    }
}
