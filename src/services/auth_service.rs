use axum::http::{self, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation, TokenData};
use serde_json::Value;

/// Cookie set by the session provider for browser clients
pub const AUTH_COOKIE: &str = "auth_token";

// Get the auth token from request headers, falling back to a query parameter.
// Browsers cannot set headers on a websocket handshake, hence the query fallback.
pub fn get_auth_token(headers: &HeaderMap, query_token: Option<&str>) -> Result<String, String> {
    // 1. Try to get token from Authorization header
    if let Some(auth_header) = headers.get(http::header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| "Invalid Authorization header".to_string())?;
        return Ok(auth_str
            .strip_prefix("Bearer ")
            .unwrap_or(auth_str)
            .to_string());
    }

    // 2. Try to get token from cookies
    if let Some(cookie_header) = headers.get(http::header::COOKIE) {
        let cookie_str = cookie_header.to_str().map_err(|_| "Invalid Cookie header".to_string())?;
        for c in cookie::Cookie::split_parse(cookie_str).flatten() {
            if c.name() == AUTH_COOKIE {
                return Ok(c.value().to_string());
            }
        }
    }

    // 3. Try the query string
    match query_token {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err("Missing Authorization header, auth_token cookie or token parameter".to_string()),
    }
}

// Validate a JWT token and return the token data
pub fn validate_jwt(token: &str, secret: &str) -> Result<TokenData<Value>, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Value>(token, &decoding_key, &validation)
}

pub fn claim_str<'a>(claims: &'a Value, key: &str) -> Option<&'a str> {
    claims.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

pub fn claim_roles(claims: &Value) -> Vec<String> {
    match claims.get("roles").and_then(|v| v.as_array()) {
        Some(roles_array) => roles_array.iter().filter_map(|r| r.as_str().map(|s| s.to_string())).collect(),
        None => Vec::new(),
    }
}

/// Principals granted by a validated token: `u/<sub>` plus `r/<role>` for user
/// tokens, `s/<sub>` for service tokens.
pub fn principals_from_claims(claims: &Value) -> Result<Vec<String>, String> {
    let token_type = claim_str(claims, "type").ok_or_else(|| "JWT token does not contain 'type' claim".to_string())?;
    let sub = claim_str(claims, "sub").ok_or_else(|| "JWT token does not contain 'sub' claim".to_string())?;

    match token_type {
        "user" => {
            let mut prpls = vec![format!("u/{}", sub)];
            for role in claim_roles(claims) {
                let role_prpl = format!("r/{}", role);
                if !prpls.contains(&role_prpl) {
                    prpls.push(role_prpl);
                }
            }
            Ok(prpls)
        }
        "service" => Ok(vec![format!("s/{}", sub)]),
        other => Err(format!("Invalid token type: {}", other)),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::test_tokens::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn header_wins_over_cookie_and_query() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(http::header::COOKIE, HeaderValue::from_static("auth_token=def"));
        assert_eq!(get_auth_token(&headers, Some("ghi")).unwrap(), "abc");
    }

    #[test]
    fn cookie_then_query() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::COOKIE, HeaderValue::from_static("theme=dark; auth_token=def"));
        assert_eq!(get_auth_token(&headers, Some("ghi")).unwrap(), "def");

        let mut headers = HeaderMap::new();
        headers.insert(http::header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(get_auth_token(&headers, Some("ghi")).unwrap(), "ghi");
        assert!(get_auth_token(&headers, Some("")).is_err());
        assert!(get_auth_token(&HeaderMap::new(), None).is_err());
    }

    #[test]
    fn validates_signature_and_expiry() {
        let token = user_token("mayor", json!({}));
        let data = validate_jwt(&token, SECRET).unwrap();
        assert_eq!(claim_str(&data.claims, "sub"), Some("mayor"));
        assert!(validate_jwt(&token, "wrong-secret").is_err());

        let expired = sign(json!({"sub": "mayor", "type": "user", "exp": 1000}));
        assert!(validate_jwt(&expired, SECRET).is_err());
    }

    #[test]
    fn principals_by_token_type() {
        let user = json!({"sub": "mayor", "type": "user", "roles": ["GasTown-Admin", "GasTown-Admin"]});
        assert_eq!(
            principals_from_claims(&user).unwrap(),
            vec!["u/mayor".to_string(), "r/GasTown-Admin".to_string()]
        );

        let service = json!({"sub": "gt-cli", "type": "service"});
        assert_eq!(principals_from_claims(&service).unwrap(), vec!["s/gt-cli".to_string()]);

        assert!(principals_from_claims(&json!({"sub": "x", "type": "robot"})).is_err());
        assert!(principals_from_claims(&json!({"type": "user"})).is_err());
    }
}
