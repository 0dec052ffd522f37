use reqwest::Client;
use jsonwebtoken::{encode, Header, EncodingKey};
use serde::{Serialize, Deserialize};
use chrono::{Utc, Duration};

/// Client for the profile service that knows operators' display names and avatars
#[derive(Debug)]
pub struct ProfileClient {
    client: Client,
    base_url: String,
    jwt_secret: String,
    service_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "type")]
    type_: String,
    exp: usize,
}

/// Profile fields the relay cares about; everything else is ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default, alias = "displayName")]
    pub name: Option<String>,
    #[serde(default, alias = "picture")]
    pub avatar: Option<String>,
}

#[derive(Debug)]
pub enum ProfileError {
    Token(jsonwebtoken::errors::Error),
    Http(reqwest::Error),
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::Token(e) => write!(f, "Failed to sign service token: {}", e),
            ProfileError::Http(e) => write!(f, "Profile request failed: {}", e),
        }
    }
}

impl std::error::Error for ProfileError {}

impl From<reqwest::Error> for ProfileError {
    fn from(e: reqwest::Error) -> Self {
        ProfileError::Http(e)
    }
}

impl ProfileClient {
    pub fn new(base_url: String, jwt_secret: String, service_name: String) -> Result<Self, ProfileError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            jwt_secret,
            service_name,
        })
    }

    fn generate_token(&self) -> Result<String, ProfileError> {
        // 1 minute expiration
        let expiration = (Utc::now() + Duration::seconds(60)).timestamp();

        let claims = Claims {
            sub: self.service_name.clone(),
            type_: "service".to_string(),
            exp: expiration as usize,
        };

        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.jwt_secret.as_bytes()))
            .map_err(ProfileError::Token)
    }

    pub fn profile_url(&self, uid: &str) -> String {
        format!("{}/profiles/{}", self.base_url, uid)
    }

    /// Fetch the profile of one operator
    pub async fn get_profile(&self, uid: &str) -> Result<Profile, ProfileError> {
        let token = self.generate_token()?;
        let profile = self.client.get(self.profile_url(uid))
            .header("Authorization", format!("Bearer {}", token))
            .send().await?
            .error_for_status()?
            .json().await?;
        Ok(profile)
    }
}
