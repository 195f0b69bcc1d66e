//! Registry error types

use crate::backend::BackendError;
use crate::entity::EntityKind;
use thiserror::Error;
use uuid::Uuid;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Unknown UUID; distinct from an empty collection and never conflated
    /// with a failed removal
    #[error("cannot find {kind} with uuid [{id}]")]
    NotFound { kind: EntityKind, id: Uuid },

    /// The backend reported failure deleting a resolved entity; the entity
    /// stays retrievable
    #[error("could not remove {kind} [{id}]")]
    RemovalFailed { kind: EntityKind, id: Uuid },

    /// Transient storage fault
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
