use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::RwLock;

use courseadmin_core::{AssignmentId, DomainError, DomainResult, ModuleId, TaskId, UserId};
use courseadmin_courses::{Assignment, AssignmentStore, Task, TaskStore};

use super::{read, write};

#[derive(Debug, Default)]
struct Tables {
    tasks: HashMap<TaskId, Task>,
    assignments: HashMap<AssignmentId, Assignment>,
}

/// Tasks and assignments (the document side).
#[derive(Debug, Default)]
pub struct InMemoryWorkStore {
    inner: RwLock<Tables>,
}

impl InMemoryWorkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for InMemoryWorkStore {
    fn find_task(&self, id: TaskId) -> DomainResult<Option<Task>> {
        Ok(read(&self.inner)?.tasks.get(&id).cloned())
    }

    fn save_task(&self, task: &Task) -> DomainResult<()> {
        write(&self.inner)?.tasks.insert(task.id, task.clone());
        Ok(())
    }

    fn active_tasks_of(&self, module: ModuleId) -> DomainResult<Vec<Task>> {
        let mut tasks: Vec<Task> = read(&self.inner)?
            .tasks
            .values()
            .filter(|t| t.module_id == module && t.active)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| Reverse(t.created_at));
        Ok(tasks)
    }

    fn find_tasks(&self, ids: &[TaskId]) -> DomainResult<Vec<Task>> {
        let tables = read(&self.inner)?;
        Ok(ids.iter().filter_map(|id| tables.tasks.get(id).cloned()).collect())
    }
}

impl AssignmentStore for InMemoryWorkStore {
    fn find_assignment(&self, id: AssignmentId) -> DomainResult<Option<Assignment>> {
        Ok(read(&self.inner)?.assignments.get(&id).cloned())
    }

    fn exists_for(&self, user: UserId, task: TaskId) -> DomainResult<bool> {
        let tables = read(&self.inner)?;
        Ok(tables
            .assignments
            .values()
            .any(|a| a.user_id == user && a.task_id == task))
    }

    fn insert_assignment(&self, assignment: &Assignment) -> DomainResult<()> {
        let mut tables = write(&self.inner)?;
        let taken = tables
            .assignments
            .values()
            .any(|a| a.user_id == assignment.user_id && a.task_id == assignment.task_id);
        if taken {
            return Err(DomainError::AssignmentAlreadyExists);
        }
        tables.assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    fn save_assignment(&self, assignment: &Assignment) -> DomainResult<()> {
        let mut tables = write(&self.inner)?;
        match tables.assignments.get_mut(&assignment.id) {
            Some(slot) => {
                *slot = assignment.clone();
                Ok(())
            }
            None => Err(DomainError::AssignmentNotFound),
        }
    }

    fn delete_assignment(&self, id: AssignmentId) -> DomainResult<()> {
        match write(&self.inner)?.assignments.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DomainError::AssignmentNotFound),
        }
    }

    fn assignments_of_user(&self, user: UserId) -> DomainResult<Vec<Assignment>> {
        let mut rows: Vec<Assignment> = read(&self.inner)?
            .assignments
            .values()
            .filter(|a| a.user_id == user)
            .cloned()
            .collect();
        rows.sort_by_key(|a| Reverse(a.submitted_at));
        Ok(rows)
    }

    fn assignments_of_task(&self, task: TaskId) -> DomainResult<Vec<Assignment>> {
        let mut rows: Vec<Assignment> = read(&self.inner)?
            .assignments
            .values()
            .filter(|a| a.task_id == task)
            .cloned()
            .collect();
        rows.sort_by_key(|a| Reverse(a.submitted_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use courseadmin_courses::AssignmentStatus;

    fn task(module: i64) -> Task {
        Task {
            id: TaskId::new(),
            module_id: ModuleId::new(module),
            title: "Lab".into(),
            value: 20.0,
            description: String::new(),
            instructions: String::new(),
            task_type: "LAB".into(),
            active: true,
            created_at: Utc::now(),
        }
    }

    fn assignment(user: i64, task: TaskId) -> Assignment {
        Assignment {
            id: AssignmentId::new(),
            user_id: UserId::new(user),
            task_id: task,
            status: AssignmentStatus::Pending,
            score: None,
            submitted_at: None,
        }
    }

    #[test]
    fn user_task_pair_is_unique() {
        let store = InMemoryWorkStore::new();
        let t = task(1);
        store.save_task(&t).unwrap();

        store.insert_assignment(&assignment(5, t.id)).unwrap();
        assert!(store.exists_for(UserId::new(5), t.id).unwrap());
        assert_eq!(
            store.insert_assignment(&assignment(5, t.id)).unwrap_err(),
            DomainError::AssignmentAlreadyExists
        );
        store.insert_assignment(&assignment(6, t.id)).unwrap();
    }

    #[test]
    fn inactive_tasks_are_not_listed() {
        let store = InMemoryWorkStore::new();
        let live = task(1);
        let mut gone = task(1);
        gone.active = false;
        store.save_task(&live).unwrap();
        store.save_task(&gone).unwrap();

        let listed = store.active_tasks_of(ModuleId::new(1)).unwrap();
        assert_eq!(listed, vec![live]);
    }

    #[test]
    fn newest_submission_comes_first() {
        let store = InMemoryWorkStore::new();
        let (a, b) = (task(1), task(1));
        let mut older = assignment(5, a.id);
        older.submitted_at = Some(Utc::now() - Duration::hours(1));
        let mut newer = assignment(5, b.id);
        newer.submitted_at = Some(Utc::now());
        store.insert_assignment(&older).unwrap();
        store.insert_assignment(&newer).unwrap();

        let rows = store.assignments_of_user(UserId::new(5)).unwrap();
        assert_eq!(rows[0].id, newer.id);
    }
}
