//! Persistence backend seam
//!
//! The registry wraps a backend that supplies the actual per-entity delete
//! primitive. The backend is treated as already providing per-entity
//! atomicity; a networked implementation can replace [`InMemoryBackend`]
//! without touching registry callers.

use crate::entity::EntityKind;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Backend faults
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Delete primitive supplied by the storage layer.
///
/// `remove` returns `Ok(true)` when the backend dropped the entity,
/// `Ok(false)` when it reported failure for a resolved entity, and an error
/// only for transient faults.
#[async_trait]
pub trait PersistBackend: Send + Sync {
    async fn remove(&self, kind: EntityKind, id: Uuid) -> Result<bool, BackendError>;
}

/// Backend for development and testing; every delete succeeds
#[derive(Debug, Default)]
pub struct InMemoryBackend;

impl InMemoryBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PersistBackend for InMemoryBackend {
    async fn remove(&self, _kind: EntityKind, _id: Uuid) -> Result<bool, BackendError> {
        Ok(true)
    }
}
