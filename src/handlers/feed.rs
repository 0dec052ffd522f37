use crate::{auth::auth, models::{ApiError, ErrorResponse, FeedRequest, FeedResponse}, state::AppState};
use axum::{extract::{State, Extension}, http::StatusCode, Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Publish an event to every connected operator's feed.
///
/// Used by the command surface to report the outcome of commands it ran.
pub async fn publish_feed(
    State(app_state): State<Arc<AppState>>,
    Extension(prpls): Extension<Vec<String>>,
    Json(request): Json<FeedRequest>,
) -> Result<(StatusCode, Json<FeedResponse>), ApiError> {
    let caller = auth::ensure_service_or_admin(&prpls)?;

    let event = request.event.trim();
    if event.is_empty() {
        return Err(ErrorResponse::reply(StatusCode::BAD_REQUEST, "Event name must not be empty"));
    }

    let user = match request.user.as_deref() {
        Some(user) if !user.is_empty() => user.to_string(),
        _ => auth::actor_name(&prpls).unwrap_or("system").to_string(),
    };

    let now = Utc::now();
    let delivered_to = app_state.room.publish_feed(event, &user, request.data, now);
    info!(
        "Feed event {} from {} ({}) delivered to {} connection(s)",
        event,
        caller,
        if auth::is_service(&prpls) { "service" } else { "admin" },
        delivered_to
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(FeedResponse {
            timestamp: now.to_rfc3339(),
            delivered_to,
        }),
    ))
}
