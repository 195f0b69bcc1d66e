//! Health and status handlers

use crate::api::state::AppState;
use axum::{extract::State, Json};
use kiln_registry::Scope;
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
    })
}

/// Daemon status response
#[derive(Debug, Serialize)]
pub struct DaemonStatusResponse {
    pub status: String,
    pub version: String,
    pub uptime: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub total_nodes: usize,
    pub total_active_models: usize,
    pub bound_nodes: usize,
    pub running_tasks: Vec<String>,
}

/// Daemon status endpoint
pub async fn daemon_status(State(state): State<AppState>) -> Json<DaemonStatusResponse> {
    let nodes = state.registry.list_nodes().await;
    let instances = state.registry.list_instances(Scope::Active).await;
    let bound = nodes.iter().filter(|n| n.is_bound()).count();

    Json(DaemonStatusResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime: state.uptime(),
        started_at: state.started_at,
        total_nodes: nodes.len(),
        total_active_models: instances.len(),
        bound_nodes: bound,
        running_tasks: state.supervisor.running_tags(),
    })
}
