use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API response for liveness check
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub service: String,
}
