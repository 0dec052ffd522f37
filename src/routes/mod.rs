pub mod api;
pub mod auth_middleware;

use std::sync::Arc;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::docs::ApiDoc;
use crate::state::AppState;
use crate::websocket::handler::websocket_handler;
use api::create_api_routes;

/// Build the complete application: relay socket, API and docs.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Relay socket
        .route("/ws", get(websocket_handler))
        // Mount API routes
        .nest("/api", create_api_routes(state.clone()))
        .with_state(state)
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = config.cors_origin_list();
    if origins.is_empty() {
        if config.is_production() {
            warn!("No CORS origins configured - cross-origin requests will be refused");
            return CorsLayer::new();
        }
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use tokio::sync::mpsc::channel;
    use crate::ws::room::OUTBOX_CAPACITY;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::models::{Identity, SendMessage};
    use crate::services::auth_service::test_tokens::{service_token, user_token, SECRET};
    use crate::services::session_resolver::JwtSessionResolver;

    fn test_state() -> Arc<AppState> {
        let config = Config {
            auth_jwt_secret: Some(SECRET.to_string()),
            ..Config::default()
        };
        let resolver = Arc::new(JwtSessionResolver::new(config.auth_jwt_secret.clone(), None));
        Arc::new(AppState::new(config, resolver))
    }

    async fn call(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
        let response = create_app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_feed(token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/feed")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_and_ready_are_public() {
        let state = test_state();
        let (status, body) = call(&state, get("/api/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "gastown-relay");

        let (status, body) = call(&state, get("/api/ready", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["operators"], 0);
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let state = test_state();
        let (status, body) = call(&state, get("/api/v1/operators", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);

        let (status, _) = call(&state, get("/api/v1/operators", Some("garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn operators_lists_public_roster() {
        let state = test_state();
        let (tx, _rx) = channel(OUTBOX_CAPACITY);
        state.room.join(
            Uuid::new_v4(),
            Identity { id: "mayor".into(), name: "Mayor".into(), avatar: None },
            tx,
            Utc::now(),
        );

        let token = user_token("deacon", json!({}));
        let (status, body) = call(&state, get("/api/v1/operators", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "mayor");
        assert_eq!(body[0]["color"], "red");
        assert!(body[0].get("lastActivity").is_none());
    }

    #[tokio::test]
    async fn diagnostics_require_service_or_admin() {
        let state = test_state();
        let user = user_token("deacon", json!({}));
        let (status, _) = call(&state, get("/api/v1/diagnostics", Some(&user))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = user_token("mayor", json!({"roles": ["GasTown-Admin"]}));
        let (status, body) = call(&state, get("/api/v1/diagnostics", Some(&admin))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["n_conn"], 0);
    }

    #[tokio::test]
    async fn feed_is_published_to_the_room() {
        let state = test_state();
        let (tx, mut rx) = channel(OUTBOX_CAPACITY);
        state.room.join(
            Uuid::new_v4(),
            Identity { id: "mayor".into(), name: "Mayor".into(), avatar: None },
            tx,
            Utc::now(),
        );
        let _room_state = rx.try_recv().unwrap();

        let token = service_token("gt-cli");
        let request = post_feed(&token, json!({"event": "sling:done", "data": {"issue": "gt-7"}}));
        let (status, body) = call(&state, request).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["delivered_to"], 1);

        let frame = rx.try_recv().unwrap();
        match serde_json::from_str::<SendMessage>(&frame).unwrap() {
            SendMessage::FeedEvent(feed) => {
                assert_eq!(feed.event, "sling:done");
                assert_eq!(feed.user, "gt-cli");
                assert_eq!(feed.data["issue"], "gt-7");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn feed_rejects_plain_users_and_empty_events() {
        let state = test_state();
        let user = user_token("deacon", json!({}));
        let (status, _) = call(&state, post_feed(&user, json!({"event": "stop"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let service = service_token("gt-cli");
        let (status, body) = call(&state, post_feed(&service, json!({"event": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
    }

    #[test]
    fn cors_layer_skips_invalid_origins() {
        let mut config = Config::default();
        config.environment = "production".to_string();
        let _ = cors_layer(&config);
        config.cors_origins = Some("https://gastown.example,bad\norigin".to_string());
        let _ = cors_layer(&config);
    }
}
