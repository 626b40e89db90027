//! Configuration management
//!
//! This module handles loading and parsing configuration for the EEPD site.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Which backend serves auth and data
    #[serde(default)]
    pub backend: BackendConfig,
    /// Local SQLite store (used when `backend.driver` is `local`)
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Hosted backend-as-a-service (used when `backend.driver` is `hosted`)
    #[serde(default)]
    pub hosted: HostedConfig,
    /// Session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Site presentation settings
    #[serde(default)]
    pub site: SiteConfig,
    /// Template override configuration
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin for the JSON API
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:8080".to_string()
}

/// Backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub driver: BackendDriver,
}

/// Backend driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendDriver {
    /// Embedded SQLite store (default)
    #[default]
    Local,
    /// Supabase-compatible hosted service
    Hosted,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite path or URL (`:memory:` for an in-memory store)
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/eepd.db".to_string()
}

/// Hosted backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: String,
    /// Public (anon) API key
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    10
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in days (cookie max-age and local token expiry)
    #[serde(default = "default_session_days")]
    pub max_age_days: i64,
    /// Mark the session cookie `Secure`
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_days: default_session_days(),
            secure_cookie: false,
        }
    }
}

fn default_session_days() -> i64 {
    7
}

impl SessionConfig {
    /// Cookie max-age in seconds
    pub fn max_age_seconds(&self) -> i64 {
        self.max_age_days * 24 * 60 * 60
    }
}

/// Site presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Short name shown in the header
    #[serde(default = "default_site_name")]
    pub name: String,
    /// Full institution name
    #[serde(default = "default_site_full_name")]
    pub full_name: String,
    /// Tagline shown on the home page
    #[serde(default = "default_tagline")]
    pub tagline: String,
    /// Redirect anonymous visitors away from the staff/student directories
    #[serde(default = "default_true")]
    pub directories_require_login: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            full_name: default_site_full_name(),
            tagline: default_tagline(),
            directories_require_login: true,
        }
    }
}

fn default_site_name() -> String {
    "EEPD-BH".to_string()
}

fn default_site_full_name() -> String {
    "Escola Estadual Presidente Dutra".to_string()
}

fn default_tagline() -> String {
    "Excelência em Educação Técnica e Profissional".to_string()
}

fn default_true() -> bool {
    true
}

/// Template override configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Directory whose `.html` files replace the embedded templates
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - EEPD_SERVER_HOST
    /// - EEPD_SERVER_PORT
    /// - EEPD_BACKEND_DRIVER
    /// - EEPD_DATABASE_URL
    /// - EEPD_HOSTED_URL
    /// - EEPD_HOSTED_API_KEY
    /// - EEPD_SITE_DIRECTORIES_REQUIRE_LOGIN
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field requirements
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.driver == BackendDriver::Hosted {
            if self.hosted.url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "hosted.url is required when backend.driver is 'hosted'".to_string(),
                ));
            }
            if self.hosted.api_key.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "hosted.api_key is required when backend.driver is 'hosted'".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("EEPD_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("EEPD_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("EEPD_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(driver) = std::env::var("EEPD_BACKEND_DRIVER") {
            match driver.to_lowercase().as_str() {
                "local" => self.backend.driver = BackendDriver::Local,
                "hosted" => self.backend.driver = BackendDriver::Hosted,
                _ => {} // Ignore invalid values
            }
        }

        if let Ok(url) = std::env::var("EEPD_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(url) = std::env::var("EEPD_HOSTED_URL") {
            self.hosted.url = url;
        }
        if let Ok(key) = std::env::var("EEPD_HOSTED_API_KEY") {
            self.hosted.api_key = key;
        }

        if let Ok(flag) = std::env::var("EEPD_SITE_DIRECTORIES_REQUIRE_LOGIN") {
            match flag.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.site.directories_require_login = true,
                "false" | "0" | "no" => self.site.directories_require_login = false,
                _ => {}
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared by every test that touches EEPD_* variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());


/// Property-based tests for configuration parsing
#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_server_config_strategy() -> impl Strategy<Value = ServerConfig> {
        (
            prop_oneof![
                Just("0.0.0.0".to_string()),
                Just("127.0.0.1".to_string()),
                "[a-z]{3,10}".prop_map(|s| format!("{}.local", s)),
            ],
            1u16..=65535,
        )
            .prop_map(|(host, port)| ServerConfig {
                host,
                port,
                cors_origin: default_cors_origin(),
            })
    }

    fn valid_config_strategy() -> impl Strategy<Value = Config> {
        (
            valid_server_config_strategy(),
            prop_oneof![Just(BackendDriver::Local), Just(BackendDriver::Hosted)],
            "[a-z]{3,10}".prop_map(|s| format!("data/{}.db", s)),
            1i64..=30,
            any::<bool>(),
        )
            .prop_map(|(server, driver, url, days, guard)| Config {
                server,
                backend: BackendConfig { driver },
                database: DatabaseConfig { url },
                hosted: HostedConfig::default(),
                session: SessionConfig {
                    max_age_days: days,
                    secure_cookie: false,
                },
                site: SiteConfig {
                    directories_require_login: guard,
                    ..SiteConfig::default()
                },
                theme: ThemeConfig::default(),
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Serializing a config to YAML and parsing it back preserves every field we set.
        #[test]
        fn config_yaml_roundtrip(config in valid_config_strategy()) {
            let yaml = serde_yaml::to_string(&config).unwrap();
            let parsed: Config = serde_yaml::from_str(&yaml).unwrap();

            prop_assert_eq!(parsed.server.host, config.server.host);
            prop_assert_eq!(parsed.server.port, config.server.port);
            prop_assert_eq!(parsed.backend.driver, config.backend.driver);
            prop_assert_eq!(parsed.database.url, config.database.url);
            prop_assert_eq!(parsed.session.max_age_days, config.session.max_age_days);
            prop_assert_eq!(
                parsed.site.directories_require_login,
                config.site.directories_require_login
            );
        }

        /// A file that only sets the port still yields defaults everywhere else.
        #[test]
        fn partial_config_fills_defaults(port in 1u16..=65535) {
            let yaml = format!("server:\n  port: {}\n", port);
            let config: Config = serde_yaml::from_str(&yaml).unwrap();

            prop_assert_eq!(config.server.port, port);
            prop_assert_eq!(config.server.host, "0.0.0.0");
            prop_assert_eq!(config.backend.driver, BackendDriver::Local);
            prop_assert_eq!(config.site.name, "EEPD-BH");
        }
    }
}
