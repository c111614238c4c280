//! Infrastructure layer: store implementations behind the domain contracts.

pub mod memory;


pub use memory::{InMemoryBackend, InMemoryCatalog, InMemoryIdentityStore, InMemoryWorkStore};
