//! Audit log
//!
//! Every active model instance accumulates an append-only sequence of
//! transition records. Entries are never mutated or removed once appended,
//! and timestamps are non-decreasing within one instance's log.
//!
//! Rendering computes two elapsed-time columns per entry: `last` (since the
//! previous entry) and `total` (since the first entry). Both are relative to
//! the sequence passed into the render call, not to any single instance's
//! log. Rendering a merged, time-sorted sequence across the whole fleet
//! therefore yields deltas over the merged ordering, which is exactly what
//! the fleet-wide log view wants.

use crate::ids::NodeId;
use crate::instance::ActiveModelInstance;
use crate::template::ModelTemplate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One state transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub old_state: String,
    pub new_state: String,
    pub action: String,
    pub result: String,
}

/// Append-only transition history owned by one instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<LogEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition. Reads the template's current state as
    /// `old_state`, advances it to `new_state`, and appends the entry. This
    /// is the only path that mutates a template's state.
    pub fn append(
        &mut self,
        template: &mut ModelTemplate,
        action: &str,
        result: &str,
        new_state: &str,
    ) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            old_state: template.current_state().to_string(),
            new_state: new_state.to_string(),
            action: action.to_string(),
            result: result.to_string(),
        };
        template.set_state(new_state);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rendered view of one log entry
#[derive(Debug, Clone, Serialize)]
pub struct LogEntryView {
    /// Formatted state transition, e.g. "pending => booting"
    pub state: String,
    pub action: String,
    pub result: String,
    /// Wall-clock time of the entry
    pub time: String,
    /// Elapsed since the previous entry of the rendered sequence
    pub last: String,
    /// Elapsed since the first entry of the rendered sequence
    pub total: String,
    /// Owning node, present only for merged fleet-wide views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_uuid: Option<NodeId>,
}

/// Render a sequence of (owning instance, entry) pairs in input order.
///
/// The `last`/`total` deltas are computed against the previous/first entry
/// of `pairs` itself; callers rendering a merged view must sort before
/// rendering. `include_node_id` tags each view with the owning instance's
/// node UUID.
pub fn render_entries(
    pairs: &[(&ActiveModelInstance, &LogEntry)],
    include_node_id: bool,
) -> Vec<LogEntryView> {
    let mut views = Vec::with_capacity(pairs.len());
    let first_time = match pairs.first() {
        Some((_, entry)) => entry.timestamp,
        None => return views,
    };
    let mut last_time = first_time;

    for (instance, entry) in pairs {
        let total_secs = (entry.timestamp - first_time).num_seconds();
        let last_secs = (entry.timestamp - last_time).num_seconds();

        views.push(LogEntryView {
            state: instance
                .template
                .format_state_transition(&entry.old_state, &entry.new_state),
            action: entry.action.clone(),
            result: entry.result.clone(),
            time: entry.timestamp.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
            last: instance.template.format_duration(last_secs),
            total: instance.template.format_duration(total_secs),
            node_uuid: include_node_id.then_some(instance.node_uuid),
        });
        last_time = entry.timestamp;
    }

    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NodeId;
    use crate::template::TemplateKind;
    use chrono::Duration;

    fn instance(kind: TemplateKind) -> ActiveModelInstance {
        ActiveModelInstance::new(NodeId::generate(), ModelTemplate::new(kind))
    }

    #[test]
    fn test_append_advances_state_and_records_old() {
        let mut inst = instance(TemplateKind::XenServerBoston);
        assert_eq!(inst.template.current_state(), "init");

        inst.transition("boot", "ok", "booting");
        inst.transition("health-check", "ok", "ready");

        let entries = inst.log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].old_state, "init");
        assert_eq!(entries[0].new_state, "booting");
        assert_eq!(entries[1].old_state, "booting");
        assert_eq!(entries[1].new_state, "ready");
        assert_eq!(inst.template.current_state(), "ready");
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }

    #[test]
    fn test_render_single_instance_deltas() {
        let mut inst = instance(TemplateKind::XenServerBoston);
        inst.transition("boot", "ok", "booting");
        inst.transition("health-check", "ok", "ready");

        // Widen the gap deterministically
        inst.log.entries[1].timestamp = inst.log.entries[0].timestamp + Duration::seconds(90);

        let pairs = inst.log_pairs();
        let views = render_entries(&pairs, false);

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].last, "0s");
        assert_eq!(views[0].total, "0s");
        assert_eq!(views[0].state, "init => booting");
        // With only two entries, last and total agree for the second
        assert_eq!(views[1].last, "1m 30s");
        assert_eq!(views[1].total, "1m 30s");
        assert!(views[1].node_uuid.is_none());
    }

    #[test]
    fn test_render_merged_deltas_follow_merged_sequence() {
        let mut a = instance(TemplateKind::XenServerBoston);
        let mut b = instance(TemplateKind::XenServerBoston);
        a.transition("boot", "ok", "booting");
        a.transition("health-check", "ok", "ready");
        b.transition("boot", "ok", "booting");

        let base = Utc::now();
        a.log.entries[0].timestamp = base;
        b.log.entries[0].timestamp = base + Duration::seconds(10);
        a.log.entries[1].timestamp = base + Duration::seconds(30);

        let mut pairs: Vec<_> = a.log_pairs();
        pairs.extend(b.log_pairs());
        pairs.sort_by_key(|(_, e)| e.timestamp);

        let views = render_entries(&pairs, true);
        assert_eq!(views.len(), 3);
        // Totals run from the first entry of the merged sequence
        assert_eq!(views[0].total, "0s");
        assert_eq!(views[1].total, "10s");
        assert_eq!(views[2].total, "30s");
        // Last is relative to the interleaved predecessor, not the
        // per-instance one
        assert_eq!(views[2].last, "20s");
        assert_eq!(views[1].node_uuid, Some(b.node_uuid));
    }
}
