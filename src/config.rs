//! Application configuration module
//! Handles environment variable loading, configuration validation, and application settings

use crate::payments::types::ProviderName;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub source_api: SourceApiConfig,
    pub khqr: KhqrConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsConfig>,
}

/// Certificate/key pair handed to the fronting proxy
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Which upstream resolves payment status
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub provider: ProviderName,
}

/// Remote source API configuration
#[derive(Debug, Clone)]
pub struct SourceApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Bakong open API configuration (the KHQR checking endpoint)
#[derive(Debug, Clone)]
pub struct KhqrConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

pub const DEFAULT_SOURCE_API_URL: &str = "https://mengtopup.shop/api";
pub const DEFAULT_KHQR_API_URL: &str = "https://api-bakong.nbc.gov.kh";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PORT: u16 = 5000;

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `default_provider` is used when `PAYMENT_UPSTREAM` is unset; each binary
    /// picks its own.
    pub fn from_env(default_provider: ProviderName) -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            upstream: UpstreamConfig::from_env(default_provider)?,
            source_api: SourceApiConfig::from_env()?,
            khqr: KhqrConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logging.validate()?;

        // Only the selected upstream has to be usable.
        match self.upstream.provider {
            ProviderName::SourceApi => self.source_api.validate()?,
            ProviderName::Khqr => self.khqr.validate()?,
        }

        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let tls = match (env::var("TLS_CERT_PATH").ok(), env::var("TLS_KEY_PATH").ok()) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::ValidationFailed(
                    "TLS_CERT_PATH and TLS_KEY_PATH must be set together".to_string(),
                ))
            }
        };

        Ok(ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
            tls,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("PORT cannot be 0".to_string()));
        }

        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue("HOST cannot be empty".to_string()));
        }

        if let Some(tls) = &self.tls {
            tls.validate()?;
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl TlsConfig {
    /// Both files must exist; an incomplete pair is a startup error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, path) in [("TLS_CERT_PATH", &self.cert_path), ("TLS_KEY_PATH", &self.key_path)]
        {
            if !path.is_file() {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} does not point to a file: {}",
                    name,
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

impl UpstreamConfig {
    pub fn from_env(default_provider: ProviderName) -> Result<Self, ConfigError> {
        let provider = match env::var("PAYMENT_UPSTREAM") {
            Ok(value) if !value.trim().is_empty() => ProviderName::from_str(&value)
                .map_err(|_| ConfigError::InvalidValue("PAYMENT_UPSTREAM".to_string()))?,
            _ => default_provider,
        };
        Ok(UpstreamConfig { provider })
    }
}

impl Default for SourceApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SOURCE_API_URL.to_string(),
            timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            user_agent: "BakongPaymentGateway/1.0".to_string(),
        }
    }
}

impl SourceApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(SourceApiConfig {
            base_url: normalize_base_url(
                &env::var("SOURCE_API_URL").unwrap_or_else(|_| DEFAULT_SOURCE_API_URL.to_string()),
            ),
            timeout_secs: env::var("SOURCE_API_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SOURCE_API_TIMEOUT_SECS".to_string()))?,
            ..Default::default()
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("SOURCE_API_URL", &self.base_url)?;

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SOURCE_API_TIMEOUT_SECS".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for KhqrConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_KHQR_API_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
        }
    }
}

impl KhqrConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(KhqrConfig {
            base_url: normalize_base_url(
                &env::var("KHQR_API_URL").unwrap_or_else(|_| DEFAULT_KHQR_API_URL.to_string()),
            ),
            token: env::var("KHQR_TOKEN")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            timeout_secs: env::var("KHQR_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KHQR_TIMEOUT_SECS".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("KHQR_API_URL", &self.base_url)?;

        if self.token.is_none() {
            return Err(ConfigError::MissingVariable("KHQR_TOKEN".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("KHQR_TIMEOUT_SECS".to_string()));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn validate_url(name: &str, url: &str) -> Result<(), ConfigError> {
    if url.is_empty() {
        return Err(ConfigError::InvalidValue(name.to_string()));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::InvalidValue(format!(
            "{} must be a valid URL",
            name
        )));
    }

    Ok(())
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(port: u16, host: &str) -> ServerConfig {
        ServerConfig {
            host: host.to_string(),
            port,
            tls: None,
        }
    }

    #[test]
    fn test_server_config_validation() {
        assert!(server(5000, "0.0.0.0").validate().is_ok());
        assert_eq!(server(5000, "0.0.0.0").bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_invalid_port_validation() {
        assert!(server(0, "127.0.0.1").validate().is_err());
    }

    #[test]
    fn test_empty_host_validation() {
        assert!(server(5000, "").validate().is_err());
    }

    #[test]
    fn test_missing_tls_files_rejected() {
        let config = ServerConfig {
            tls: Some(TlsConfig {
                cert_path: PathBuf::from("/nonexistent/cert.pem"),
                key_path: PathBuf::from("/nonexistent/key.pem"),
            }),
            ..server(5000, "0.0.0.0")
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(
            normalize_base_url("https://example.com/api/"),
            "https://example.com/api"
        );
        assert_eq!(
            normalize_base_url(" https://example.com//"),
            "https://example.com"
        );
    }

    #[test]
    fn test_source_api_validation() {
        let mut config = SourceApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(15));

        config.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.base_url = "http://example.com".to_string();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_khqr_requires_token() {
        let mut config = KhqrConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingVariable(_))
        ));

        config.token = Some("token".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_only_selected_upstream_is_validated() {
        let config = AppConfig {
            server: server(5000, "0.0.0.0"),
            upstream: UpstreamConfig {
                provider: ProviderName::SourceApi,
            },
            source_api: SourceApiConfig::default(),
            khqr: KhqrConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Plain,
            },
        };
        assert!(config.validate().is_ok());

        let khqr_selected = AppConfig {
            upstream: UpstreamConfig {
                provider: ProviderName::Khqr,
            },
            ..config
        };
        assert!(khqr_selected.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let config = LoggingConfig {
            level: "verbose".to_string(),
            format: LogFormat::Json,
        };
        assert!(config.validate().is_err());
    }
}
