//! User accounts: registration, role replacement and the identity store contract.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courseadmin_core::{DomainError, DomainResult, UserId};

use crate::password::PasswordEncoder;
use crate::roles::{Role, RoleStore, resolve_roles};
use crate::Principal;

const PASSWORD_SYMBOLS: &str = "@#$%^&+=!";

/// Stored user account. `password_hash` never leaves the auth boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub name: String,
    pub lastname: Option<String>,
    pub password_hash: String,
    pub enabled: bool,
    pub roles: Vec<Role>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.username.clone(), self.roles.iter().cloned())
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            lastname: self.lastname.clone(),
            enabled: self.enabled,
            roles: self.roles.clone(),
            last_login: self.last_login,
            created_at: self.created_at,
        }
    }
}

/// Public projection of a [`User`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub name: String,
    pub lastname: Option<String>,
    pub enabled: bool,
    pub roles: Vec<Role>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub lastname: Option<String>,
}

impl RegisterUser {
    pub fn validate(&self) -> DomainResult<()> {
        validate_length("username", self.username.trim(), 3, 20)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_length("name", self.name.trim(), 3, 20)?;
        Ok(())
    }
}

/// Account about to be inserted. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub name: String,
    pub lastname: Option<String>,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

/// Identity store contract.
pub trait UserStore: Send + Sync {
    fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>>;
    fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    fn exists_by_username_or_email(&self, username: &str, email: &str) -> DomainResult<bool>;
    /// Insert a new, enabled account. Fails with `UsernameTaken` when the
    /// username or email is already present.
    fn insert(&self, user: NewUser) -> DomainResult<User>;
    fn update_roles(&self, id: UserId, roles: Vec<Role>) -> DomainResult<User>;
    fn touch_last_login(&self, username: &str, at: DateTime<Utc>) -> DomainResult<()>;
    fn list(&self) -> DomainResult<Vec<User>>;
}

fn validate_length(field: &str, value: &str, min: usize, max: usize) -> DomainResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(DomainError::validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> DomainResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("email is not a valid address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> DomainResult<()> {
    validate_length("password", password, 5, 50)?;

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    if !(has_digit && has_upper && has_symbol) {
        return Err(DomainError::validation(
            "password needs at least one digit, one uppercase letter and one of @#$%^&+=!",
        ));
    }
    Ok(())
}

/// Account management operations.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    passwords: Arc<dyn PasswordEncoder>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        passwords: Arc<dyn PasswordEncoder>,
    ) -> Self {
        Self { users, roles, passwords }
    }

    /// Register a new account. Every new account is an enabled student.
    pub fn register(&self, cmd: RegisterUser, now: DateTime<Utc>) -> DomainResult<User> {
        cmd.validate()?;

        let username = cmd.username.trim().to_string();
        let email = cmd.email.trim().to_string();
        if self.users.exists_by_username_or_email(&username, &email)? {
            return Err(DomainError::UsernameTaken);
        }

        let roles = resolve_roles(self.roles.as_ref(), [Role::STUDENT])?;
        let password_hash = self.passwords.hash(&cmd.password)?;

        let user = self.users.insert(NewUser {
            username,
            email,
            name: cmd.name.trim().to_string(),
            lastname: cmd.lastname.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
            password_hash,
            roles,
            created_at: now,
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Replace the role set of `id`. Every name is canonicalized and must exist.
    pub fn update_roles<S: AsRef<str>>(&self, id: UserId, names: &[S]) -> DomainResult<User> {
        let roles = resolve_roles(self.roles.as_ref(), names.iter().map(AsRef::as_ref))?;
        if self.users.find_by_id(id)?.is_none() {
            return Err(DomainError::UserNotFound);
        }

        let user = self.users.update_roles(id, roles)?;
        tracing::info!(user_id = %user.id, roles = ?user.roles, "user roles replaced");
        Ok(user)
    }

    pub fn list(&self) -> DomainResult<Vec<User>> {
        self.users.list()
    }

    /// Create an administrator account unless the username already exists.
    ///
    /// Bootstrap credentials bypass the registration password policy.
    pub fn ensure_admin(
        &self,
        username: &str,
        password: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<User> {
        if let Some(existing) = self.users.find_by_username(username)? {
            return Ok(existing);
        }

        validate_length("username", username, 3, 20)?;
        validate_email(email)?;
        if password.is_empty() {
            return Err(DomainError::validation("bootstrap password cannot be empty"));
        }

        let roles = resolve_roles(self.roles.as_ref(), [Role::ADMIN])?;
        let user = self.users.insert(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            name: username.to_string(),
            lastname: None,
            password_hash: self.passwords.hash(password)?,
            roles,
            created_at: now,
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "bootstrap admin created");
        Ok(user)
    }
}
