use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use courseadmin_core::{DomainError, DomainResult};

const PREFIX: &str = "ROLE_";

/// Role identifier used for RBAC, always in canonical `ROLE_UPPERCASE` form.
///
/// The only way to build a `Role` is through [`Role::canonical`], so every role
/// stored, compared or put into a token is already normalized. Tokens carry the
/// bare string; richer role records stay behind the [`RoleStore`] boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub const STUDENT: &'static str = "ROLE_STUDENT";
    pub const TEACHER: &'static str = "ROLE_TEACHER";
    pub const ADMIN: &'static str = "ROLE_ADMIN";

    /// Normalize `name` into canonical form: trimmed, uppercase, `ROLE_`-prefixed.
    ///
    /// `"teacher"`, `"TEACHER"` and `"role_teacher"` all yield `ROLE_TEACHER`.
    pub fn canonical(name: &str) -> DomainResult<Self> {
        let upper = name.trim().to_uppercase();
        let canonical = if upper.starts_with(PREFIX) {
            upper
        } else {
            format!("{PREFIX}{upper}")
        };

        if canonical.len() == PREFIX.len() {
            return Err(DomainError::validation("role name cannot be empty"));
        }
        if canonical.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("role name cannot contain whitespace"));
        }

        Ok(Self(canonical))
    }

    pub fn student() -> Self {
        Self(Self::STUDENT.to_string())
    }

    pub fn teacher() -> Self {
        Self(Self::TEACHER.to_string())
    }

    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::canonical(s)
    }
}

// Deserialization goes through canonicalization too, so a hand-edited payload
// cannot smuggle a non-canonical role in.
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Role::canonical(&raw).map_err(serde::de::Error::custom)
    }
}

/// Stored role record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub name: Role,
    pub description: String,
}

/// Authoritative list of role names.
///
/// Implementations must canonicalize every name they receive before querying.
pub trait RoleStore: Send + Sync {
    fn find_by_name(&self, name: &str) -> DomainResult<Option<RoleRecord>>;
    fn list(&self) -> DomainResult<Vec<RoleRecord>>;
    /// Insert a role; existing roles are left untouched and returned as-is.
    fn create(&self, name: &str, description: &str) -> DomainResult<RoleRecord>;
}

/// Seed the built-in roles (idempotent).
pub fn seed_default_roles(store: &dyn RoleStore) -> DomainResult<()> {
    store.create(Role::STUDENT, "Enrolls in courses and submits work")?;
    store.create(Role::TEACHER, "Owns courses, modules and tasks; grades assignments")?;
    store.create(Role::ADMIN, "Manages user accounts and roles")?;
    Ok(())
}

/// Resolve a list of role names against the store, canonicalizing each one.
///
/// Fails with `RoleNotFound` on the first unknown name, or when the list is empty.
pub fn resolve_roles<I, S>(store: &dyn RoleStore, names: I) -> DomainResult<Vec<Role>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut roles: Vec<Role> = Vec::new();
    for name in names {
        let name = name.as_ref();
        let record = store
            .find_by_name(name)?
            .ok_or_else(|| DomainError::RoleNotFound(name.to_string()))?;
        if !roles.contains(&record.name) {
            roles.push(record.name);
        }
    }

    if roles.is_empty() {
        return Err(DomainError::RoleNotFound("no role specified".to_string()));
    }
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_every_spelling() {
        for raw in ["teacher", "TEACHER", "role_teacher", "Role_Teacher", "  teacher "] {
            assert_eq!(Role::canonical(raw).unwrap().as_str(), "ROLE_TEACHER", "{raw}");
        }
    }

    #[test]
    fn rejects_empty_names() {
        assert!(Role::canonical("").is_err());
        assert!(Role::canonical("ROLE_").is_err());
        assert!(Role::canonical("role teacher").is_err());
    }

    #[test]
    fn deserialization_canonicalizes() {
        let role: Role = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, Role::student());
    }
}
