//! Active model instance handlers
//!
//! Listing and single-instance retrieval are public; both log views are
//! restricted to the operator host, and deletion to the operator subnet.

use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{ConnectInfo, Path, State},
    Json,
};
use kiln_registry::Scope;
use kiln_types::{render_entries, ActiveModelInstance, InstanceId, LogEntry, LogEntryView};
use serde::Serialize;
use std::net::SocketAddr;

/// List all active model instances
pub async fn list_active_models(
    State(state): State<AppState>,
) -> Json<Vec<ActiveModelInstance>> {
    Json(state.registry.list_instances(Scope::Active).await)
}

/// Get a specific active model instance
pub async fn get_active_model(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<ActiveModelInstance>> {
    let id = parse_instance_id(&uuid)?;
    let instance = state.registry.get_instance(Scope::Active, &id).await?;
    Ok(Json(instance))
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: String,
}

/// Remove an active model instance. Operator subnet only.
pub async fn delete_active_model(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<RemoveResponse>> {
    require_operator_subnet(&state, addr, "active_model removal")?;

    let id = parse_instance_id(&uuid)?;
    state.registry.delete_instance(&id).await?;
    tracing::info!(instance_id = %id, caller = %addr.ip(), "Removed active model via API");

    Ok(Json(RemoveResponse {
        removed: id.to_string(),
    }))
}

/// Render one instance's own log, without node tags. Operator host only.
pub async fn get_active_model_logs(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<Vec<LogEntryView>>> {
    require_operator_host(&state, addr, "active_model logs")?;

    let id = parse_instance_id(&uuid)?;
    let instance = state.registry.get_instance(Scope::Active, &id).await?;
    let pairs = instance.log_pairs();
    Ok(Json(render_entries(&pairs, false)))
}

/// Render every instance's log merged into one time-ascending sequence,
/// each entry tagged with its node UUID. The elapsed-time columns are
/// computed over the merged ordering. Operator host only.
pub async fn list_all_logs(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> ApiResult<Json<Vec<LogEntryView>>> {
    require_operator_host(&state, addr, "fleet-wide logs")?;

    let instances = state.registry.list_instances(Scope::Active).await;
    let mut pairs: Vec<(&ActiveModelInstance, &LogEntry)> = instances
        .iter()
        .flat_map(|instance| instance.log_pairs())
        .collect();
    pairs.sort_by_key(|(_, entry)| entry.timestamp);

    Ok(Json(render_entries(&pairs, true)))
}

pub(super) fn parse_instance_id(uuid: &str) -> ApiResult<InstanceId> {
    InstanceId::parse_str(uuid)
        .map_err(|_| ApiError::InvalidIdentifier(format!("cannot find active model instance with uuid [{}]", uuid)))
}

pub(super) fn require_operator_host(
    state: &AppState,
    addr: SocketAddr,
    what: &str,
) -> ApiResult<()> {
    if state.trust.is_operator_host(addr.ip()) {
        Ok(())
    } else {
        Err(ApiError::AccessForbidden(format!(
            "remote access forbidden; {} is only available from the operator host",
            what
        )))
    }
}

pub(super) fn require_operator_subnet(
    state: &AppState,
    addr: SocketAddr,
    what: &str,
) -> ApiResult<()> {
    if state.trust.in_operator_subnet(addr.ip()) {
        Ok(())
    } else {
        Err(ApiError::AccessForbidden(format!(
            "remote access forbidden; {} is only available from the operator subnet",
            what
        )))
    }
}
