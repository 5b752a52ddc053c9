use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::assessment::{ScoringConfig, UnscorablePolicy};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the assessment service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let rules_csv = env::var("APP_RULES_CSV")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let scoring = scoring_from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            catalog: CatalogConfig { rules_csv },
            scoring,
        })
    }
}

fn scoring_from_env() -> Result<ScoringConfig, ConfigError> {
    let mut scoring = ScoringConfig::default();

    if let Ok(value) = env::var("APP_SCALE_MAX") {
        let max = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|max| max.is_finite() && *max > 0.0)
            .ok_or(ConfigError::InvalidScaleMax { value })?;
        scoring.default_scale_max = max;
    }

    if let Ok(value) = env::var("APP_HONOR_SCALE_OVERRIDE") {
        scoring.honor_scale_max_override = matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }

    if let Ok(value) = env::var("APP_UNSCORABLE_POLICY") {
        scoring.unscorable_questions = match value.trim().to_ascii_lowercase().as_str() {
            "dilute" => UnscorablePolicy::Dilute,
            "exclude" => UnscorablePolicy::Exclude,
            _ => return Err(ConfigError::InvalidUnscorablePolicy { value }),
        };
    }

    Ok(scoring)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where recommendation rules are loaded from. `None` falls back to the seeded catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub rules_csv: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidScaleMax { value: String },
    InvalidUnscorablePolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidScaleMax { value } => {
                write!(f, "APP_SCALE_MAX must be a positive number, got '{}'", value)
            }
            ConfigError::InvalidUnscorablePolicy { value } => write!(
                f,
                "APP_UNSCORABLE_POLICY must be 'dilute' or 'exclude', got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidScaleMax { .. }
            | ConfigError::InvalidUnscorablePolicy { .. } => None,
        }
    }
}
