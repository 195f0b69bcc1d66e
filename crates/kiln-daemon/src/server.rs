//! Server setup and lifecycle management

use crate::access::TrustedNetwork;
use crate::api::{create_router, AppState};
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::scheduler::{ReconcileEngine, Supervisor};
use kiln_registry::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Duration;

pub const EXPIRY_TASK_TAG: &str = "node-expiry";
pub const MONITOR_TASK_TAG: &str = "task-monitor";

/// Kiln daemon server
pub struct Server {
    config: DaemonConfig,
    registry: Arc<Registry>,
    supervisor: Arc<Supervisor>,
    trust: Arc<TrustedNetwork>,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let trust = Arc::new(TrustedNetwork::from_config(&config.trust)?);

        Ok(Self {
            config,
            registry: Arc::new(Registry::in_memory()),
            supervisor: Arc::new(Supervisor::new()),
            trust,
        })
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(
            self.registry.clone(),
            self.supervisor.clone(),
            self.trust.clone(),
        );
        let app = create_router(state, self.config.server.enable_cors);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Kiln daemon listening on {}", addr);

        self.start_periodic_tasks();

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Kiln daemon shutting down");

        self.supervisor.stop();

        Ok(())
    }

    /// Register the recurring maintenance tasks. Safe to call more than
    /// once; the supervisor refuses duplicate tags.
    fn start_periodic_tasks(&self) {
        let reconciler = &self.config.reconciler;

        let engine = Arc::new(ReconcileEngine::new(
            self.registry.clone(),
            reconciler.node_expire_timeout_secs,
        ));
        self.supervisor.schedule(
            EXPIRY_TASK_TAG,
            Duration::from_secs(reconciler.min_cycle_time_secs),
            move || {
                let engine = engine.clone();
                async move {
                    engine.remove_expired_nodes().await?;
                    Ok(())
                }
            },
        );

        // Weak reference: the monitor must not keep the supervisor alive
        let supervisor = Arc::downgrade(&self.supervisor);
        self.supervisor.schedule(
            MONITOR_TASK_TAG,
            Duration::from_secs(reconciler.monitor_interval_secs),
            move || {
                let supervisor = supervisor.clone();
                async move {
                    if let Some(supervisor) = supervisor.upgrade() {
                        tracing::info!(tags = ?supervisor.running_tags(), "Periodic tasks running");
                    }
                    Ok(())
                }
            },
        );
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_periodic_task_startup_is_idempotent() {
        let server = Server::new(DaemonConfig::default()).unwrap();

        server.start_periodic_tasks();
        server.start_periodic_tasks();

        let tags = server.supervisor.running_tags();
        assert_eq!(
            tags,
            vec![EXPIRY_TASK_TAG.to_string(), MONITOR_TASK_TAG.to_string()]
        );
        server.supervisor.stop();
    }
}
