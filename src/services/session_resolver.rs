use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use tracing::{info, warn};

use crate::clients::profile_client::ProfileClient;
use crate::models::Identity;
use crate::services::auth_service::{claim_str, validate_jwt};

pub type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Option<Identity>> + Send + 'a>>;

/// Turns the credentials carried by a connection into an operator identity.
///
/// `None` means no identity could be established; the caller decides whether
/// that is fatal.
pub trait SessionResolver: Send + Sync {
    fn resolve<'a>(&'a self, token: Option<&'a str>) -> ResolveFuture<'a>;
}

#[derive(Clone)]
struct CachedIdentity {
    identity: Identity,
    /// The token's `exp`, in seconds since the epoch
    expires_at: i64,
}

/// Resolves identities from HS256 session tokens issued by the session provider.
pub struct JwtSessionResolver {
    secret: Option<String>,
    profiles: Option<Arc<ProfileClient>>,
    cache: Cache<String, CachedIdentity>,
}

impl JwtSessionResolver {
    pub fn new(secret: Option<String>, profiles: Option<Arc<ProfileClient>>) -> Self {
        if secret.is_none() {
            warn!("No JWT secret configured - session tokens cannot be validated");
        }
        Self {
            secret,
            profiles,
            cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(60))
                .build(),
        }
    }

    async fn resolve_token(&self, token: &str) -> Option<Identity> {
        if let Some(cached) = self.cache.get(token).await {
            if Utc::now().timestamp() < cached.expires_at {
                return Some(cached.identity);
            }
            self.cache.invalidate(token).await;
        }

        let secret = self.secret.as_deref()?;
        let token_data = match validate_jwt(token, secret) {
            Ok(token_data) => token_data,
            Err(e) => {
                warn!("JWT validation failed: {}", e);
                return None;
            }
        };
        let claims = &token_data.claims;

        if claim_str(claims, "type") != Some("user") {
            warn!("Rejecting non-user token for an operator session");
            return None;
        }
        let Some(uid) = claim_str(claims, "sub") else {
            warn!("JWT token does not contain 'sub' claim");
            return None;
        };
        // Validation already required `exp`
        let expires_at = claims.get("exp").and_then(|v| v.as_i64()).unwrap_or_default();

        let mut name = claim_str(claims, "name").map(str::to_string);
        let mut avatar = claim_str(claims, "picture").map(str::to_string);

        if name.is_none() || avatar.is_none() {
            if let Some(profiles) = &self.profiles {
                match profiles.get_profile(uid).await {
                    Ok(profile) => {
                        name = name.or(profile.name);
                        avatar = avatar.or(profile.avatar);
                    }
                    Err(e) => warn!("Failed to fetch profile for {}: {}", uid, e),
                }
            }
        }

        let identity = Identity {
            id: uid.to_string(),
            name: name.unwrap_or_else(|| uid.to_string()),
            avatar,
        };
        info!("Session resolved for operator {}", identity.id);
        let cached = CachedIdentity { identity: identity.clone(), expires_at };
        self.cache.insert(token.to_string(), cached).await;
        Some(identity)
    }
}

impl SessionResolver for JwtSessionResolver {
    fn resolve<'a>(&'a self, token: Option<&'a str>) -> ResolveFuture<'a> {
        Box::pin(async move {
            match token {
                Some(token) => self.resolve_token(token).await,
                None => None,
            }
        })
    }
}
