//! The object registry
//!
//! Owns one [`Slice`] per entity kind and the persistence backend. All
//! mutation goes through per-entity atomic operations; deleting an active
//! model instance also clears the bound node's back-reference, and nothing
//! else cascades.

use crate::backend::{InMemoryBackend, PersistBackend};
use crate::entity::{EntityKind, Scope};
use crate::error::{RegistryError, Result};
use crate::slice::Slice;
use kiln_types::{ActiveModelInstance, InstanceId, Node, NodeId};
use std::sync::Arc;
use tracing::{debug, info};

/// Typed, partitioned registry of nodes and active model instances
pub struct Registry {
    nodes: Slice<Node>,
    instances: Slice<ActiveModelInstance>,
    backend: Arc<dyn PersistBackend>,
}

impl Registry {
    pub fn new(backend: Arc<dyn PersistBackend>) -> Self {
        Self {
            nodes: Slice::new(),
            instances: Slice::new(),
            backend,
        }
    }

    /// Registry backed by the in-memory delete primitive
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBackend::new()))
    }

    // ----- nodes -----

    /// Create the node on its first check-in, refresh its timestamp on
    /// every later one. A node whose instance was inserted before it ever
    /// checked in picks up the binding here.
    pub async fn checkin_node(&self, id: NodeId) -> Node {
        if let Ok(node) = self
            .nodes
            .update(Scope::Active, id.as_uuid(), Node::checkin)
            .await
        {
            return node;
        }
        let mut node = Node::register(id);
        if let Some(instance) = self.find_instance_for_node(&id).await {
            node.bind(instance.id);
            debug!(node_id = %id, instance_id = %instance.id, "Bound node to pre-existing instance");
        }
        info!(node_id = %id, "Registered node on first check-in");
        self.nodes.insert(Scope::Active, node.clone()).await;
        node
    }

    /// Store a node as-is; used when restoring state from a backend
    pub async fn upsert_node(&self, node: Node) {
        self.nodes.insert(Scope::Active, node).await;
    }

    pub async fn get_node(&self, id: &NodeId) -> Result<Node> {
        self.nodes.get(Scope::Active, id.as_uuid()).await
    }

    pub async fn list_nodes(&self) -> Vec<Node> {
        self.nodes.list(Scope::Active).await
    }

    /// Point a node at the instance being deployed onto it
    pub async fn bind_node(&self, id: &NodeId, instance: InstanceId) -> Result<Node> {
        self.nodes
            .update(Scope::Active, id.as_uuid(), |n| n.bind(instance))
            .await
    }

    /// Drop a node's instance reference
    pub async fn clear_binding(&self, id: &NodeId) -> Result<Node> {
        self.nodes
            .update(Scope::Active, id.as_uuid(), Node::unbind)
            .await
    }

    /// Delete a node outright (the reconciliation engine's expiry path).
    /// Returns `false` when the node is already gone.
    pub async fn delete_node(&self, id: &NodeId) -> Result<bool> {
        if !self.nodes.contains(Scope::Active, id.as_uuid()).await {
            return Ok(false);
        }
        if !self.backend.remove(EntityKind::Node, id.as_uuid()).await? {
            return Err(RegistryError::RemovalFailed {
                kind: EntityKind::Node,
                id: id.as_uuid(),
            });
        }
        Ok(self.nodes.evict(id.as_uuid()).await)
    }

    // ----- active model instances -----

    /// Store a new instance in the `active` partition and bind its node
    pub async fn insert_instance(&self, instance: ActiveModelInstance) -> Result<()> {
        let instance_id = instance.id;
        let node_id = instance.node_uuid;
        self.instances.insert(Scope::Active, instance).await;

        // A node that has not checked in yet picks up the binding in
        // checkin_node on arrival.
        if let Ok(node) = self.bind_node(&node_id, instance_id).await {
            debug!(node_id = %node.id, instance_id = %instance_id, "Bound node to instance");
        }
        Ok(())
    }

    /// Active instance deployed onto the given node, if any
    async fn find_instance_for_node(&self, node_id: &NodeId) -> Option<ActiveModelInstance> {
        self.instances
            .list(Scope::Active)
            .await
            .into_iter()
            .find(|instance| instance.node_uuid == *node_id)
    }

    pub async fn get_instance(&self, scope: Scope, id: &InstanceId) -> Result<ActiveModelInstance> {
        self.instances.get(scope, id.as_uuid()).await
    }

    pub async fn list_instances(&self, scope: Scope) -> Vec<ActiveModelInstance> {
        self.instances.list(scope).await
    }

    /// Apply a state transition to a stored instance as one atomic
    /// per-entity mutation
    pub async fn transition_instance(
        &self,
        id: &InstanceId,
        action: &str,
        result: &str,
        new_state: &str,
    ) -> Result<ActiveModelInstance> {
        self.instances
            .update(Scope::Active, id.as_uuid(), |instance| {
                instance.transition(action, result, new_state)
            })
            .await
    }

    /// Remove an instance from the `active` partition.
    ///
    /// An unknown UUID is `NotFound`, never `RemovalFailed`. When the
    /// backend reports failure for a resolved instance, `RemovalFailed` is
    /// returned and the instance stays retrievable. On success the instance
    /// moves to the `retired` scope and the bound node's reference clears.
    pub async fn delete_instance(&self, id: &InstanceId) -> Result<ActiveModelInstance> {
        let instance = self.instances.get(Scope::Active, id.as_uuid()).await?;

        if !self
            .backend
            .remove(EntityKind::ActiveModelInstance, id.as_uuid())
            .await?
        {
            return Err(RegistryError::RemovalFailed {
                kind: EntityKind::ActiveModelInstance,
                id: id.as_uuid(),
            });
        }

        let retired = self.instances.retire(id.as_uuid()).await?;

        if self.clear_binding(&instance.node_uuid).await.is_ok() {
            debug!(node_id = %instance.node_uuid, instance_id = %id, "Cleared node binding");
        }

        info!(instance_id = %id, "Removed active model instance");
        Ok(retired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use async_trait::async_trait;
    use kiln_types::{ModelTemplate, TemplateKind};
    use uuid::Uuid;

    /// Backend whose deletes always report failure
    struct FailingBackend;

    #[async_trait]
    impl PersistBackend for FailingBackend {
        async fn remove(&self, _kind: EntityKind, _id: Uuid) -> std::result::Result<bool, BackendError> {
            Ok(false)
        }
    }

    fn template() -> ModelTemplate {
        ModelTemplate::new(TemplateKind::XenServerBoston)
    }

    #[tokio::test]
    async fn test_checkin_creates_then_refreshes() {
        let registry = Registry::in_memory();
        let id = NodeId::generate();

        let first = registry.checkin_node(id).await;
        assert_eq!(registry.list_nodes().await.len(), 1);

        let second = registry.checkin_node(id).await;
        assert_eq!(registry.list_nodes().await.len(), 1);
        assert!(second.last_checkin >= first.last_checkin);
    }

    #[tokio::test]
    async fn test_insert_instance_binds_node() {
        let registry = Registry::in_memory();
        let node = registry.checkin_node(NodeId::generate()).await;

        let instance = ActiveModelInstance::new(node.id, template());
        let instance_id = instance.id;
        registry.insert_instance(instance).await.unwrap();

        let node = registry.get_node(&node.id).await.unwrap();
        assert_eq!(node.bound_instance, Some(instance_id));
    }

    #[tokio::test]
    async fn test_checkin_after_insert_picks_up_binding() {
        let registry = Registry::in_memory();
        let node_id = NodeId::generate();

        // Instance arrives before the node's first check-in
        let instance = ActiveModelInstance::new(node_id, template());
        let instance_id = instance.id;
        registry.insert_instance(instance).await.unwrap();

        let node = registry.checkin_node(node_id).await;
        assert_eq!(node.bound_instance, Some(instance_id));

        let stored = registry.get_node(&node_id).await.unwrap();
        assert!(stored.is_bound());
    }

    #[tokio::test]
    async fn test_bind_and_clear_binding() {
        let registry = Registry::in_memory();
        let node = registry.checkin_node(NodeId::generate()).await;
        let instance_id = InstanceId::generate();

        let bound = registry.bind_node(&node.id, instance_id).await.unwrap();
        assert_eq!(bound.bound_instance, Some(instance_id));

        let cleared = registry.clear_binding(&node.id).await.unwrap();
        assert!(!cleared.is_bound());

        let unknown = registry.bind_node(&NodeId::generate(), instance_id).await;
        assert!(matches!(unknown, Err(RegistryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_instance_clears_binding_and_retires() {
        let registry = Registry::in_memory();
        let node = registry.checkin_node(NodeId::generate()).await;

        let instance = ActiveModelInstance::new(node.id, template());
        let instance_id = instance.id;
        registry.insert_instance(instance).await.unwrap();

        registry.delete_instance(&instance_id).await.unwrap();

        // Gone from active, present for historical lookup
        let missing = registry.get_instance(Scope::Active, &instance_id).await;
        assert!(matches!(missing, Err(RegistryError::NotFound { .. })));
        assert!(registry.get_instance(Scope::Retired, &instance_id).await.is_ok());

        // Binding cleared
        let node = registry.get_node(&node.id).await.unwrap();
        assert!(!node.is_bound());
    }

    #[tokio::test]
    async fn test_delete_unknown_uuid_is_not_found() {
        let registry = Registry::in_memory();
        let err = registry.delete_instance(&InstanceId::generate()).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_backend_failure_is_removal_failed_and_instance_survives() {
        let registry = Registry::new(Arc::new(FailingBackend));
        let node = registry.checkin_node(NodeId::generate()).await;

        let instance = ActiveModelInstance::new(node.id, template());
        let instance_id = instance.id;
        registry.insert_instance(instance).await.unwrap();

        let err = registry.delete_instance(&instance_id).await.unwrap_err();
        assert!(matches!(err, RegistryError::RemovalFailed { .. }));

        // Still retrievable after the failed delete
        assert!(registry.get_instance(Scope::Active, &instance_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_transition_instance_appends_to_stored_copy() {
        let registry = Registry::in_memory();
        let node = registry.checkin_node(NodeId::generate()).await;

        let instance = ActiveModelInstance::new(node.id, template());
        let instance_id = instance.id;
        registry.insert_instance(instance).await.unwrap();

        registry
            .transition_instance(&instance_id, "boot", "ok", "booting")
            .await
            .unwrap();
        let stored = registry
            .get_instance(Scope::Active, &instance_id)
            .await
            .unwrap();
        assert_eq!(stored.template.current_state(), "booting");
        assert_eq!(stored.log.len(), 1);
    }
}
