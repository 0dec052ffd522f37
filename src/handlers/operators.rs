use crate::{auth::auth, models::{ApiError, PublicOperator}, state::AppState};
use axum::{extract::{State, Extension}, Json};
use std::sync::Arc;

/// Current roster of the room, public fields only
pub async fn list_operators(
    State(app_state): State<Arc<AppState>>,
    Extension(prpls): Extension<Vec<String>>,
) -> Result<Json<Vec<PublicOperator>>, ApiError> {
    auth::ensure_authenticated(&prpls)?;

    let mut roster = app_state.room.roster();
    roster.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(Json(roster))
}
