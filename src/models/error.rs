use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for an error
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub code: u16,
    pub status: String,
    pub error: String,
}

/// Error half of every fallible HTTP handler
pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl ErrorResponse {
    pub fn reply(status: StatusCode, error: impl Into<String>) -> ApiError {
        (status, Json(ErrorResponse {
            code: status.as_u16(),
            status: status.to_string(),
            error: error.into(),
        }))
    }
}
