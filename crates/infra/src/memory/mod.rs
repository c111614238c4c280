//! In-memory implementations of every store contract (dev and tests).
//!
//! Each store guards its tables with one `RwLock`, so joins such as the
//! eligibility check read a consistent snapshot. A poisoned lock surfaces as
//! `DomainError::Storage`.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use courseadmin_auth::seed_default_roles;
use courseadmin_core::{DomainError, DomainResult};
use courseadmin_courses::Stores;

pub mod catalog;
pub mod identity;
pub mod work;

pub use catalog::InMemoryCatalog;
pub use identity::InMemoryIdentityStore;
pub use work::InMemoryWorkStore;

pub(crate) fn read<T>(lock: &RwLock<T>) -> DomainResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| DomainError::storage("store lock poisoned"))
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> DomainResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| DomainError::storage("store lock poisoned"))
}

/// Handles to one set of in-memory stores.
#[derive(Clone)]
pub struct InMemoryBackend {
    pub identity: Arc<InMemoryIdentityStore>,
    pub catalog: Arc<InMemoryCatalog>,
    pub work: Arc<InMemoryWorkStore>,
}

impl InMemoryBackend {
    /// Fresh stores with the built-in roles seeded.
    pub fn new() -> DomainResult<Self> {
        let identity = Arc::new(InMemoryIdentityStore::new());
        seed_default_roles(identity.as_ref())?;
        tracing::debug!("in-memory stores initialised");
        Ok(Self {
            identity,
            catalog: Arc::new(InMemoryCatalog::new()),
            work: Arc::new(InMemoryWorkStore::new()),
        })
    }

    pub fn stores(&self) -> Stores {
        Stores {
            users: self.identity.clone(),
            courses: self.catalog.clone(),
            modules: self.catalog.clone(),
            enrollments: self.catalog.clone(),
            tasks: self.work.clone(),
            assignments: self.work.clone(),
        }
    }
}
