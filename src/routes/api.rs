use std::sync::Arc;
use axum::{middleware, routing::{get, post}, Router};
use crate::handlers::{diagnostics, health_check, list_operators, publish_feed, ready_check};
use crate::routes::auth_middleware::auth_middleware;
use crate::state::AppState;

/// Create API routes
pub fn create_api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/v1/diagnostics", get(diagnostics))
        .route("/v1/operators", get(list_operators))
        .route("/v1/feed", post(publish_feed))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware)); // Applies to all routes added above

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .merge(protected)
}
