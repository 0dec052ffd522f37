use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, error};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated
    pub cors_origins: Option<String>,

    /// Name used as the subject of outgoing service tokens
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// JWT secret key shared with the session provider
    pub auth_jwt_secret: Option<String>,

    /// Base URL of the profile service used to enrich identities
    pub profile_service_url: Option<String>,

    /// Seconds without activity before an active operator is marked away
    #[serde(default = "default_away_timeout_secs")]
    pub away_timeout_secs: u64,

    /// Seconds between two away sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        Self::from_vars(std::env::vars())
    }

    /// Build the configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        match envy::from_iter::<_, Config>(vars) {
            Ok(config) => {
                info!("✅ Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("❌ Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Defaults to run with after `load` failed. The raw `ENVIRONMENT` value is
    /// kept, and a production deployment gets no fallback at all.
    pub fn fallback(environment: Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            environment: environment.unwrap_or_else(default_environment),
            ..Self::default()
        };
        if config.is_production() {
            return Err(ConfigError::NoProductionFallback);
        }
        Ok(config)
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "prod" || env == "production"
    }

    pub fn away_timeout(&self) -> Duration {
        Duration::from_secs(self.away_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    /// Parsed CORS origins, empty when none are configured
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .map(|origins| {
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            cors_origins: None,
            service_name: default_service_name(),
            auth_jwt_secret: None,
            profile_service_url: None,
            away_timeout_secs: default_away_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
    NoProductionFallback,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
            ConfigError::NoProductionFallback => write!(f, "Refusing to start production with default configuration"),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_service_name() -> String {
    "gastown-relay".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_away_timeout_secs() -> u64 {
    5 * 60
}

fn default_sweep_interval_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_relay_timings() {
        let config = Config::default();
        assert_eq!(config.away_timeout(), Duration::from_secs(300));
        assert_eq!(config.sweep_interval(), Duration::from_secs(30));
        assert_eq!(config.server_address(), "0.0.0.0:3000");
        assert!(!config.is_production());
    }

    #[test]
    fn production_is_case_insensitive() {
        let mut config = Config::default();
        config.environment = "PROD".to_string();
        assert!(config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
        config.environment = "staging".to_string();
        assert!(!config.is_production());
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let mut config = Config::default();
        assert!(config.cors_origin_list().is_empty());
        config.cors_origins = Some("https://a.example, https://b.example,,".to_string());
        assert_eq!(
            config.cors_origin_list(),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn zero_sweep_interval_is_clamped() {
        let mut config = Config::default();
        config.sweep_interval_secs = 0;
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn upper_case_variables_are_read() {
        let config = Config::from_vars(vars(&[("ENVIRONMENT", "production"), ("PORT", "8080")])).unwrap();
        assert!(config.is_production());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn broken_production_config_has_no_fallback() {
        let raw = vars(&[("ENVIRONMENT", "production"), ("PORT", "not-a-port")]);
        assert!(Config::from_vars(raw).is_err());
        assert!(matches!(
            Config::fallback(Some("production".to_string())),
            Err(ConfigError::NoProductionFallback)
        ));
        assert!(Config::fallback(Some("PROD".to_string())).is_err());
    }

    #[test]
    fn fallback_keeps_the_environment() {
        let config = Config::fallback(Some("staging".to_string())).unwrap();
        assert_eq!(config.environment, "staging");
        assert_eq!(config.port, 3000);
        assert_eq!(Config::fallback(None).unwrap().environment, "development");
    }
}
