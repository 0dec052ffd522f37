use utoipa::{Modify, OpenApi};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Relay is ready", body = ReadyResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Room and process diagnostics
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Diagnostics snapshot", body = DiagnosticsResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Service or admin access required", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

/// Operators currently in the room
#[utoipa::path(
    get,
    path = "/api/v1/operators",
    responses(
        (status = 200, description = "Public roster", body = [PublicOperator]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn list_operators_doc() {}

/// Publish an event to the operator feed
#[utoipa::path(
    post,
    path = "/api/v1/feed",
    request_body = FeedRequest,
    responses(
        (status = 202, description = "Event handed to connected operators", body = FeedResponse),
        (status = 400, description = "Empty event name", body = ErrorResponse),
        (status = 403, description = "Service or admin access required", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[allow(dead_code)]
pub async fn publish_feed_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        diagnostics_doc,
        list_operators_doc,
        publish_feed_doc,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            DiagnosticsResponse,
            ErrorResponse,
            FeedRequest,
            FeedResponse,
            PublicOperator,
            Cursor,
            PaletteColor,
            OperatorStatus,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "api", description = "Relay API endpoints")
    )
)]
pub struct ApiDoc;

/// Registers the JWT bearer scheme referenced by the protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
