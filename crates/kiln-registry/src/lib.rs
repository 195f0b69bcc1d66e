//! Kiln Registry - partitioned store of live lifecycle objects
//!
//! The registry holds the fleet's nodes and active model instances in typed,
//! scope-partitioned collections (`active` vs `retired`), wrapping a
//! persistence backend that supplies the actual per-entity delete primitive.
//! Readers see a full entity or not-found, never a partial view; deletions
//! are visible to the next `get` from any caller, including the
//! reconciliation engine's next tick.

#![deny(unsafe_code)]

pub mod backend;
pub mod entity;
pub mod error;
pub mod registry;
pub mod slice;

pub use backend::{BackendError, InMemoryBackend, PersistBackend};
pub use entity::{Entity, EntityKind, Scope};
pub use error::{RegistryError, Result};
pub use registry::Registry;
pub use slice::Slice;
