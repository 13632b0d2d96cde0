use crate::workflows::canvas::ColumnDetection;
use crate::workflows::peer_review::{AnalysisConfig, QualityPolicy, SchemeKind};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig::from_env()?,
        })
    }
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Grading policy knobs applied to every analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringConfig {
    pub scheme: SchemeKind,
    pub quality_policy: QualityPolicy,
    pub expected_review_load: u32,
    pub column_detection: ColumnDetection,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            scheme: SchemeKind::Bonus,
            quality_policy: QualityPolicy::Lenient,
            expected_review_load: 3,
            column_detection: ColumnDetection::HeaderMatch,
        }
    }
}

impl ScoringConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let scheme = match env::var("APP_SCORING_SCHEME") {
            Ok(value) => SchemeKind::from_label(&value).ok_or(ConfigError::InvalidScheme(value))?,
            Err(_) => defaults.scheme,
        };

        let quality_policy = match env::var("APP_QUALITY_POLICY") {
            Ok(value) => QualityPolicy::from_label(&value)
                .ok_or(ConfigError::InvalidQualityPolicy(value))?,
            Err(_) => defaults.quality_policy,
        };

        let expected_review_load = match env::var("APP_EXPECTED_REVIEW_LOAD") {
            Ok(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|load| *load > 0)
                .ok_or(ConfigError::InvalidReviewLoad)?,
            Err(_) => defaults.expected_review_load,
        };

        let column_detection = match env::var("APP_COLUMN_DETECTION") {
            Ok(value) => ColumnDetection::from_label(&value)
                .ok_or(ConfigError::InvalidColumnDetection(value))?,
            Err(_) => defaults.column_detection,
        };

        Ok(Self {
            scheme,
            quality_policy,
            expected_review_load,
            column_detection,
        })
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            scheme: self.scheme,
            quality_policy: self.quality_policy,
            expected_review_load: self.expected_review_load,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidScheme(String),
    InvalidQualityPolicy(String),
    InvalidReviewLoad,
    InvalidColumnDetection(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidScheme(value) => write!(
                f,
                "APP_SCORING_SCHEME must be 'bonus' or 'penalty' (found '{value}')"
            ),
            ConfigError::InvalidQualityPolicy(value) => write!(
                f,
                "APP_QUALITY_POLICY must be 'lenient' or 'length_sensitive' (found '{value}')"
            ),
            ConfigError::InvalidReviewLoad => {
                write!(f, "APP_EXPECTED_REVIEW_LOAD must be a positive integer")
            }
            ConfigError::InvalidColumnDetection(value) => write!(
                f,
                "APP_COLUMN_DETECTION must be 'positional' or 'header_match' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_SCORING_SCHEME",
            "APP_QUALITY_POLICY",
            "APP_EXPECTED_REVIEW_LOAD",
            "APP_COLUMN_DETECTION",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn scoring_overrides_are_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SCORING_SCHEME", "Penalty");
        env::set_var("APP_QUALITY_POLICY", "length_sensitive");
        env::set_var("APP_EXPECTED_REVIEW_LOAD", "4");
        env::set_var("APP_COLUMN_DETECTION", "positional");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring.scheme, SchemeKind::Penalty);
        assert_eq!(config.scoring.quality_policy, QualityPolicy::LengthSensitive);
        assert_eq!(config.scoring.expected_review_load, 4);
        assert_eq!(config.scoring.column_detection, ColumnDetection::Positional);

        let analysis = config.scoring.analysis_config();
        assert_eq!(analysis.scheme, SchemeKind::Penalty);
        assert_eq!(analysis.expected_review_load, 4);
        reset_env();
    }

    #[test]
    fn rejects_unknown_scheme_and_zero_load() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SCORING_SCHEME", "weighted");
        match AppConfig::load() {
            Err(ConfigError::InvalidScheme(value)) => assert_eq!(value, "weighted"),
            other => panic!("expected invalid scheme, got {other:?}"),
        }

        reset_env();
        env::set_var("APP_EXPECTED_REVIEW_LOAD", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidReviewLoad)
        ));
        reset_env();
    }
}
