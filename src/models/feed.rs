use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Request body for publishing an event to the operator feed
#[derive(Serialize, Deserialize, ToSchema)]
pub struct FeedRequest {
    /// Event name, e.g. `sling:done`
    pub event: String,
    /// Operator the event is attributed to, defaults to the calling principal
    pub user: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
}

/// Response for a published feed event
#[derive(Serialize, Deserialize, ToSchema)]
pub struct FeedResponse {
    pub timestamp: String,
    pub delivered_to: u32,
}
