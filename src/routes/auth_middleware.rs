use std::sync::Arc;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{error, info};
use crate::models::{ApiError, ErrorResponse};
use crate::services::auth_service::{get_auth_token, principals_from_claims, validate_jwt};
use crate::state::AppState;

pub async fn auth_middleware(
    State(app_state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {

    // 1. Get the auth token from the request
    let token = get_auth_token(req.headers(), None)
        .map_err(|e| ErrorResponse::reply(StatusCode::UNAUTHORIZED, e))?;

    // 2. Validate Token
    let secret = match &app_state.config.auth_jwt_secret {
        Some(secret) => secret,
        None => {
            error!("Auth JWT secret not configured");
            return Err(ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, "Authentication is not configured"));
        }
    };
    let token_data = match validate_jwt(&token, secret) {
        Ok(token_data) => token_data,
        Err(e) => {
            error!("JWT validation failed: {}", e);
            return Err(ErrorResponse::reply(StatusCode::UNAUTHORIZED, "Invalid token"));
        }
    };

    // 3. Derive principals from the user or service claims
    let prpls = principals_from_claims(&token_data.claims).map_err(|e| {
        error!("{}", e);
        ErrorResponse::reply(StatusCode::UNAUTHORIZED, "Invalid token")
    })?;
    info!("Token validated for {}", prpls[0]);

    // 4. Set these principals into request extensions for downstream handlers
    req.extensions_mut().insert(prpls);

    Ok(next.run(req).await)
}
