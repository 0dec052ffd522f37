use axum::http::StatusCode;
use crate::models::{ApiError, ErrorResponse};

const ADMIN_PRPL: &str = "r/GasTown-Admin";

pub fn is_admin(prpls: &[String]) -> bool {
    prpls.iter().any(|p| p == ADMIN_PRPL)
}

pub fn is_service(prpls: &[String]) -> bool {
    prpls.iter().any(|p| p.starts_with("s/"))
}

/// The principal an action is attributed to: the user or service name without its prefix.
pub fn actor_name(prpls: &[String]) -> Option<&str> {
    prpls
        .iter()
        .find_map(|p| p.strip_prefix("u/").or_else(|| p.strip_prefix("s/")))
}

pub fn ensure_service_or_admin(prpls: &[String]) -> Result<String, ApiError> {
    if let Some(service_prpl) = prpls.iter().find(|p| p.starts_with("s/")) {
        return Ok(service_prpl.clone());
    }

    if is_admin(prpls) {
        return Ok(ADMIN_PRPL.to_string());
    }

    Err(ErrorResponse::reply(StatusCode::FORBIDDEN, "Service or admin access required"))
}

pub fn ensure_authenticated(prpls: &[String]) -> Result<(), ApiError> {
    if prpls.is_empty() {
        return Err(ErrorResponse::reply(StatusCode::UNAUTHORIZED, "Authentication required"));
    }
    Ok(())
}
