//! Entity and partition vocabulary

use kiln_types::{ActiveModelInstance, Node};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scope tag of a registry partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Live objects; membership here is mutually exclusive with `Retired`
    Active,
    /// Historical lookups of removed objects
    Retired,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::Active, Scope::Retired];
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Active => write!(f, "active"),
            Scope::Retired => write!(f, "retired"),
        }
    }
}

/// Type tag identifying which collection an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    ActiveModelInstance,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Node => write!(f, "node"),
            EntityKind::ActiveModelInstance => write!(f, "active model instance"),
        }
    }
}

/// Anything the registry can store. UUIDs are unique per (kind, scope).
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn uuid(&self) -> Uuid;
}

impl Entity for Node {
    const KIND: EntityKind = EntityKind::Node;

    fn uuid(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Entity for ActiveModelInstance {
    const KIND: EntityKind = EntityKind::ActiveModelInstance;

    fn uuid(&self) -> Uuid {
        self.id.as_uuid()
    }
}
