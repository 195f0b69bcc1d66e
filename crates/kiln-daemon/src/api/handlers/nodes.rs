//! Node handlers
//!
//! The check-in endpoint carries only the lifecycle bookkeeping half of the
//! protocol: a node announcing itself by UUID. The wire format of full
//! check-in messages lives outside this daemon.

use super::active_models::{require_operator_host, require_operator_subnet};
use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{ConnectInfo, Path, State},
    Json,
};
use kiln_types::{Node, NodeId};
use std::net::SocketAddr;

/// List all known nodes. Operator host only.
pub async fn list_nodes(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> ApiResult<Json<Vec<Node>>> {
    require_operator_host(&state, addr, "node listing")?;
    Ok(Json(state.registry.list_nodes().await))
}

/// Record a node check-in, creating the node on first contact.
/// Operator subnet only.
pub async fn checkin_node(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<Node>> {
    require_operator_subnet(&state, addr, "node check-in")?;

    let id = NodeId::parse_str(&uuid)
        .map_err(|_| ApiError::InvalidIdentifier(format!("malformed node uuid [{}]", uuid)))?;
    let node = state.registry.checkin_node(id).await;
    Ok(Json(node))
}
