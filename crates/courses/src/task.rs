use chrono::{DateTime, Utc};

use courseadmin_core::{DomainError, DomainResult, ModuleId, TaskId, UserId};

use crate::model::{Task, TaskDraft};
use crate::rules::owned_module;
use crate::store::Stores;

#[derive(Clone)]
pub struct TaskService {
    stores: Stores,
}

impl TaskService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Create a task in a module whose course the caller teaches.
    pub fn create(&self, caller: UserId, draft: TaskDraft, now: DateTime<Utc>) -> DomainResult<Task> {
        draft.validate()?;
        let module = self.owned_module(draft.module_id, caller)?;

        let task = Task {
            id: TaskId::new(),
            module_id: module.id,
            title: draft.title.trim().to_string(),
            value: draft.value,
            description: draft.description,
            instructions: draft.instructions,
            task_type: draft.task_type,
            active: true,
            created_at: now,
        };
        self.stores.tasks.save_task(&task)?;
        tracing::info!(task_id = %task.id, module_id = %task.module_id, "task created");
        Ok(task)
    }

    /// Update a task. The target module and the task's current module must both be owned.
    ///
    /// Lowering the value below a score already recorded for the task fails with
    /// `InvalidScore`.
    pub fn update(&self, caller: UserId, id: TaskId, draft: TaskDraft) -> DomainResult<Task> {
        draft.validate()?;
        self.owned_module(draft.module_id, caller)?;
        let mut task = self.owned_task(id, caller)?;

        // Recorded scores must stay within the task's value.
        let graded_above = self
            .stores
            .assignments
            .assignments_of_task(id)?
            .iter()
            .any(|a| a.score.is_some_and(|score| score > draft.value));
        if graded_above {
            return Err(DomainError::InvalidScore);
        }

        task.module_id = draft.module_id;
        task.title = draft.title.trim().to_string();
        task.value = draft.value;
        task.description = draft.description;
        task.instructions = draft.instructions;
        task.task_type = draft.task_type;

        self.stores.tasks.save_task(&task)?;
        Ok(task)
    }

    /// Soft delete.
    pub fn delete(&self, caller: UserId, id: TaskId) -> DomainResult<()> {
        let mut task = self.owned_task(id, caller)?;
        task.active = false;
        self.stores.tasks.save_task(&task)?;
        tracing::info!(task_id = %id, "task deactivated");
        Ok(())
    }

    pub fn get(&self, id: TaskId) -> DomainResult<Task> {
        self.stores.tasks.find_task(id)?.ok_or(DomainError::TaskNotFound)
    }

    pub fn of_module(&self, module: ModuleId) -> DomainResult<Vec<Task>> {
        self.stores.tasks.active_tasks_of(module)
    }

    /// Tasks the caller holds an assignment for.
    pub fn for_student(&self, caller: UserId) -> DomainResult<Vec<Task>> {
        let ids: Vec<TaskId> = self
            .stores
            .assignments
            .assignments_of_user(caller)?
            .into_iter()
            .map(|a| a.task_id)
            .collect();
        self.stores.tasks.find_tasks(&ids)
    }

    fn owned_module(&self, module: ModuleId, caller: UserId) -> DomainResult<crate::Module> {
        owned_module(
            self.stores.courses.as_ref(),
            self.stores.modules.as_ref(),
            module,
            caller,
        )
    }

    fn owned_task(&self, id: TaskId, caller: UserId) -> DomainResult<Task> {
        let task = self.get(id)?;
        match self.owned_module(task.module_id, caller) {
            Ok(_) => Ok(task),
            Err(DomainError::ModuleNotFound) => Err(DomainError::TaskNotFound),
            Err(other) => Err(other),
        }
    }
}
