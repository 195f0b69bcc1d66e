//! Reconciliation engine
//!
//! One sweep per tick: fetch every node, skip any node bound to an active
//! model instance, and delete the unbound ones whose last check-in is older
//! than the expiry timeout. A registry fault aborts the sweep; the
//! supervisor logs it and the next tick retries from scratch, which is
//! idempotent by construction.

use chrono::{Duration, Utc};
use kiln_registry::{Registry, RegistryError};
use kiln_types::NodeId;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one expiry sweep
#[derive(Debug)]
pub struct ExpirySweep {
    pub removed: Vec<NodeId>,
}

/// Expires stale, unbound nodes on every tick
pub struct ReconcileEngine {
    registry: Arc<Registry>,
    timeout: Duration,
}

impl ReconcileEngine {
    pub fn new(registry: Arc<Registry>, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::seconds(timeout_secs as i64),
        }
    }

    /// Run one sweep over the node set
    pub async fn remove_expired_nodes(&self) -> Result<ExpirySweep, RegistryError> {
        let nodes = self.registry.list_nodes().await;
        let now = Utc::now();
        let mut removed = Vec::new();

        for node in nodes {
            // A bound node never expires, however stale its check-in
            if node.is_bound() {
                continue;
            }
            if now - node.last_checkin > self.timeout {
                if self.registry.delete_node(&node.id).await? {
                    removed.push(node.id);
                }
            }
        }

        if removed.is_empty() {
            debug!("Expiry sweep removed no nodes");
        } else {
            let uuids: Vec<String> = removed.iter().map(ToString::to_string).collect();
            info!(count = removed.len(), nodes = ?uuids, "Removed expired nodes");
        }

        Ok(ExpirySweep { removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_registry::Scope;
    use kiln_types::{ActiveModelInstance, ModelTemplate, Node, TemplateKind};

    fn stale_node() -> Node {
        let mut node = Node::register(NodeId::generate());
        node.last_checkin = Utc::now() - Duration::minutes(10);
        node
    }

    #[tokio::test]
    async fn test_stale_unbound_node_is_removed() {
        let registry = Arc::new(Registry::in_memory());
        let n1 = stale_node();
        let n1_id = n1.id;
        registry.upsert_node(n1).await;

        let engine = ReconcileEngine::new(registry.clone(), 300);
        let sweep = engine.remove_expired_nodes().await.unwrap();

        assert_eq!(sweep.removed, vec![n1_id]);
        assert!(registry.get_node(&n1_id).await.is_err());
    }

    #[tokio::test]
    async fn test_bound_node_survives_regardless_of_age() {
        let registry = Arc::new(Registry::in_memory());
        let n2 = stale_node();
        let n2_id = n2.id;
        registry.upsert_node(n2).await;

        let instance = ActiveModelInstance::new(
            n2_id,
            ModelTemplate::new(TemplateKind::XenServerBoston),
        );
        registry.insert_instance(instance).await.unwrap();

        let engine = ReconcileEngine::new(registry.clone(), 300);
        let sweep = engine.remove_expired_nodes().await.unwrap();

        assert!(sweep.removed.is_empty());
        assert!(registry.get_node(&n2_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_node_checking_in_after_insert_is_bound_and_survives() {
        let registry = Arc::new(Registry::in_memory());
        let node_id = NodeId::generate();

        // Instance inserted before the node's first check-in
        let instance = ActiveModelInstance::new(
            node_id,
            ModelTemplate::new(TemplateKind::XenServerBoston),
        );
        registry.insert_instance(instance).await.unwrap();

        let mut node = registry.checkin_node(node_id).await;
        assert!(node.is_bound());
        node.last_checkin = Utc::now() - Duration::minutes(10);
        registry.upsert_node(node).await;

        let engine = ReconcileEngine::new(registry.clone(), 300);
        let sweep = engine.remove_expired_nodes().await.unwrap();

        assert!(sweep.removed.is_empty());
        assert!(registry.get_node(&node_id).await.is_ok());
        assert_eq!(registry.list_instances(Scope::Active).await.len(), 1);
    }

    #[tokio::test]
    async fn test_fresh_node_survives() {
        let registry = Arc::new(Registry::in_memory());
        let node = registry.checkin_node(NodeId::generate()).await;

        let engine = ReconcileEngine::new(registry.clone(), 300);
        let sweep = engine.remove_expired_nodes().await.unwrap();

        assert!(sweep.removed.is_empty());
        assert!(registry.get_node(&node.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_deletion_visible_to_reads_and_next_tick() {
        let registry = Arc::new(Registry::in_memory());
        registry.upsert_node(stale_node()).await;

        let engine = ReconcileEngine::new(registry.clone(), 300);
        engine.remove_expired_nodes().await.unwrap();
        assert!(registry.list_nodes().await.is_empty());

        // Second tick sees the already-clean state
        let sweep = engine.remove_expired_nodes().await.unwrap();
        assert!(sweep.removed.is_empty());
        let _ = registry.list_instances(Scope::Active).await;
    }
}
