use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use courseadmin_auth::{NewUser, Role, RoleRecord, RoleStore, User, UserStore};
use courseadmin_core::{DomainError, DomainResult, UserId};

use super::{read, write};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    roles: BTreeMap<Role, RoleRecord>,
    next_user: i64,
}

/// Users and roles.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<Tables>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryIdentityStore {
    fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        Ok(read(&self.inner)?.users.get(&id).cloned())
    }

    fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let tables = read(&self.inner)?;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    fn exists_by_username_or_email(&self, username: &str, email: &str) -> DomainResult<bool> {
        let tables = read(&self.inner)?;
        Ok(tables.users.values().any(|u| clashes(u, username, email)))
    }

    fn insert(&self, user: NewUser) -> DomainResult<User> {
        let mut tables = write(&self.inner)?;
        if tables.users.values().any(|u| clashes(u, &user.username, &user.email)) {
            return Err(DomainError::UsernameTaken);
        }

        tables.next_user += 1;
        let stored = User {
            id: UserId::new(tables.next_user),
            username: user.username,
            email: user.email,
            name: user.name,
            lastname: user.lastname,
            password_hash: user.password_hash,
            enabled: true,
            roles: user.roles,
            last_login: None,
            created_at: user.created_at,
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_roles(&self, id: UserId, roles: Vec<Role>) -> DomainResult<User> {
        let mut tables = write(&self.inner)?;
        let user = tables.users.get_mut(&id).ok_or(DomainError::UserNotFound)?;
        user.roles = roles;
        Ok(user.clone())
    }

    fn touch_last_login(&self, username: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let mut tables = write(&self.inner)?;
        let user = tables
            .users
            .values_mut()
            .find(|u| u.username == username)
            .ok_or(DomainError::UserNotFound)?;
        user.last_login = Some(at);
        Ok(())
    }

    fn list(&self) -> DomainResult<Vec<User>> {
        Ok(read(&self.inner)?.users.values().cloned().collect())
    }
}

impl RoleStore for InMemoryIdentityStore {
    fn find_by_name(&self, name: &str) -> DomainResult<Option<RoleRecord>> {
        let Ok(role) = Role::canonical(name) else {
            return Ok(None);
        };
        Ok(read(&self.inner)?.roles.get(&role).cloned())
    }

    fn list(&self) -> DomainResult<Vec<RoleRecord>> {
        Ok(read(&self.inner)?.roles.values().cloned().collect())
    }

    fn create(&self, name: &str, description: &str) -> DomainResult<RoleRecord> {
        let role = Role::canonical(name)?;
        let mut tables = write(&self.inner)?;
        let record = tables.roles.entry(role.clone()).or_insert_with(|| RoleRecord {
            name: role,
            description: description.to_string(),
        });
        Ok(record.clone())
    }
}

fn clashes(user: &User, username: &str, email: &str) -> bool {
    user.username == username || user.email.eq_ignore_ascii_case(email)
}
