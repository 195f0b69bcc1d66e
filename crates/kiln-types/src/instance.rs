//! Active model instances
//!
//! An ActiveModelInstance is the live binding between a node and the model
//! template being deployed onto it, plus the audit log of every state
//! transition the deployment has gone through. The `node_uuid` is a lookup
//! key back into the node registry, not ownership.

use crate::ids::{InstanceId, NodeId};
use crate::log::{AuditLog, LogEntry};
use crate::template::ModelTemplate;
use serde::{Deserialize, Serialize};

/// A live deployment of a model template onto a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveModelInstance {
    pub id: InstanceId,

    /// Back-reference to the node being provisioned
    pub node_uuid: NodeId,

    /// What is being deployed
    pub template: ModelTemplate,

    /// Transition history
    pub log: AuditLog,
}

impl ActiveModelInstance {
    pub fn new(node_uuid: NodeId, template: ModelTemplate) -> Self {
        Self {
            id: InstanceId::generate(),
            node_uuid,
            template,
            log: AuditLog::new(),
        }
    }

    /// Record a state transition: the template's current state becomes the
    /// entry's `old_state`, the template advances to `new_state`, and one
    /// entry lands in the log.
    pub fn transition(&mut self, action: &str, result: &str, new_state: &str) {
        self.log.append(&mut self.template, action, result, new_state);
    }

    /// Pair every log entry with this instance for rendering
    pub fn log_pairs(&self) -> Vec<(&ActiveModelInstance, &LogEntry)> {
        self.log.entries().iter().map(|e| (self, e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateKind;

    #[test]
    fn test_transition_appends_exactly_one_entry() {
        let mut inst =
            ActiveModelInstance::new(NodeId::generate(), ModelTemplate::new(TemplateKind::DebianWheezy));

        inst.transition("boot", "ok", "booting");
        assert_eq!(inst.log.len(), 1);
        assert_eq!(inst.template.current_state(), "booting");

        let entry = &inst.log.entries()[0];
        assert_eq!(entry.old_state, "init");
        assert_eq!(entry.new_state, "booting");
        assert_eq!(entry.action, "boot");
        assert_eq!(entry.result, "ok");
    }
}
