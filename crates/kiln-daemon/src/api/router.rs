//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let api_routes = Router::new()
        // Health and status
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::daemon_status))
        // Model templates
        .route("/templates", get(handlers::list_templates))
        // Active model instances
        .route("/active_models", get(handlers::list_active_models))
        .route("/active_models/logs", get(handlers::list_all_logs))
        .route("/active_models/:uuid", get(handlers::get_active_model))
        .route("/active_models/:uuid", delete(handlers::delete_active_model))
        .route("/active_models/:uuid/logs", get(handlers::get_active_model_logs))
        // Nodes
        .route("/nodes", get(handlers::list_nodes))
        .route("/nodes/:uuid/checkin", post(handlers::checkin_node));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
