//! Application state for API handlers

use crate::access::TrustedNetwork;
use crate::scheduler::Supervisor;
use kiln_registry::Registry;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Object registry
    pub registry: Arc<Registry>,

    /// Periodic task supervisor
    pub supervisor: Arc<Supervisor>,

    /// Trusted operator network
    pub trust: Arc<TrustedNetwork>,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        registry: Arc<Registry>,
        supervisor: Arc<Supervisor>,
        trust: Arc<TrustedNetwork>,
    ) -> Self {
        Self {
            registry,
            supervisor,
            trust,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
