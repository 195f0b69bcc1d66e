//! Compute nodes
//!
//! A node comes into existence on its first check-in and refreshes its
//! timestamp on every subsequent one. A node bound to an active model
//! instance is never eligible for expiry, regardless of how stale its
//! check-in is.

use crate::ids::{InstanceId, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A provisionable compute node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,

    /// Last time the node checked in
    pub last_checkin: DateTime<Utc>,

    /// Active model instance this node is bound to, if any
    pub bound_instance: Option<InstanceId>,
}

impl Node {
    /// Create a node on its first check-in
    pub fn register(id: NodeId) -> Self {
        Self {
            id,
            last_checkin: Utc::now(),
            bound_instance: None,
        }
    }

    /// Refresh the check-in timestamp
    pub fn checkin(&mut self) {
        self.last_checkin = Utc::now();
    }

    pub fn is_bound(&self) -> bool {
        self.bound_instance.is_some()
    }

    pub fn bind(&mut self, instance: InstanceId) {
        self.bound_instance = Some(instance);
    }

    pub fn unbind(&mut self) {
        self.bound_instance = None;
    }

    /// Seconds since the last check-in, as seen at `now`
    pub fn checkin_age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_checkin).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_checkin() {
        let mut node = Node::register(NodeId::generate());
        assert!(!node.is_bound());
        let first = node.last_checkin;

        node.checkin();
        assert!(node.last_checkin >= first);
    }

    #[test]
    fn test_bind_unbind() {
        let mut node = Node::register(NodeId::generate());
        let instance = InstanceId::generate();

        node.bind(instance);
        assert!(node.is_bound());
        assert_eq!(node.bound_instance, Some(instance));

        node.unbind();
        assert!(!node.is_bound());
    }
}
