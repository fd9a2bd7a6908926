//! Bootstrap configuration loading
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (handled by the binary's argument parser)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! A missing TOML file is not fatal: compiled defaults are used and the
//! returned [`ConfigSource`] logs a warning once tracing is installed.
//! A TOML file that exists but cannot be parsed is an error.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result};

/// Deployment environment selecting which pair of name buckets is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Production, Environment::Development];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(Error::Config(format!(
                "Unknown environment '{}' (expected 'production' or 'development')",
                other
            ))),
        }
    }
}

/// Bootstrap configuration loaded from TOML file
///
/// Read once at startup; the process must restart to pick up changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Active environment (default: development)
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub startup: StartupConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Persistent name store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file; defaults to the OS data directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Upper bound on every store round trip, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl StoreConfig {
    /// Configured database path, or the platform default
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// Match classifier calibration
///
/// The three thresholds form a relaxation ladder: the less the phonetic codes
/// agree, the higher the string similarity required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum similarity when both phonetic codes agree
    #[serde(default = "default_both_codes_threshold")]
    pub both_codes_threshold: f64,

    /// Minimum similarity when exactly one phonetic code agrees
    #[serde(default = "default_one_code_threshold")]
    pub one_code_threshold: f64,

    /// Minimum similarity with no phonetic agreement
    #[serde(default = "default_orthographic_threshold")]
    pub orthographic_threshold: f64,

    /// Truncate phonetic codes to this many characters (unbounded if unset)
    #[serde(default)]
    pub max_code_length: Option<usize>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            both_codes_threshold: default_both_codes_threshold(),
            one_code_threshold: default_one_code_threshold(),
            orthographic_threshold: default_orthographic_threshold(),
            max_code_length: None,
        }
    }
}

impl MatchingConfig {
    /// Check ranges and ladder ordering of the thresholds
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("both_codes_threshold", self.both_codes_threshold),
            ("one_code_threshold", self.one_code_threshold),
            ("orthographic_threshold", self.orthographic_threshold),
        ];

        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "matching.{} must be within [0.0, 1.0], got {}",
                    name, value
                )));
            }
        }

        if self.both_codes_threshold > self.one_code_threshold
            || self.one_code_threshold > self.orthographic_threshold
        {
            return Err(Error::Config(format!(
                "matching thresholds must satisfy both_codes <= one_code <= orthographic \
                 (got {} / {} / {})",
                self.both_codes_threshold, self.one_code_threshold, self.orthographic_threshold
            )));
        }

        if self.max_code_length == Some(0) {
            return Err(Error::Config(
                "matching.max_code_length must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Initial corpus load behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Refresh attempts before startup gives up
    #[serde(default = "default_refresh_attempts")]
    pub refresh_attempts: u32,

    /// Delay between refresh attempts, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            refresh_attempts: default_refresh_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Operator endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Bearer token for `/admin/*`; absent or empty disables the check
    #[serde(default)]
    pub token: Option<String>,
}

impl AdminConfig {
    /// Token to enforce, if any
    pub fn effective_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directives (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3500
}

fn default_store_timeout_ms() -> u64 {
    2000
}

fn default_both_codes_threshold() -> f64 {
    0.60
}

fn default_one_code_threshold() -> f64 {
    0.70
}

fn default_orthographic_threshold() -> f64 {
    0.82
}

fn default_refresh_attempts() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where [`TomlConfig::load_or_default`] got its settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// This file does not exist; compiled defaults in use
    Missing(PathBuf),
    /// No platform config directory; compiled defaults in use
    NoConfigDir,
}

impl ConfigSource {
    pub fn is_default(&self) -> bool {
        !matches!(self, ConfigSource::File(_))
    }

    /// Report the outcome; a missing file is a warning
    pub fn log(&self) {
        match self {
            ConfigSource::File(p) => info!("Loaded configuration from {}", p.display()),
            ConfigSource::Missing(p) => warn!(
                "Config file {} not found, using compiled defaults",
                p.display()
            ),
            ConfigSource::NoConfigDir => {
                warn!("Could not determine config directory, using compiled defaults")
            }
        }
    }
}

/// Command-line / environment overrides applied on top of the TOML file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub environment: Option<Environment>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {:?}: {}", path, e)))
    }

    /// Parse TOML text and validate it
    pub fn parse(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the given file (or the platform default location)
    ///
    /// Falls back to compiled defaults when the file does not exist. The
    /// returned [`ConfigSource`] says which happened; call
    /// [`ConfigSource::log`] once tracing is up.
    pub fn load_or_default(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };

        match path {
            Some(p) if p.exists() => {
                let config = Self::load(&p)?;
                Ok((config, ConfigSource::File(p)))
            }
            Some(p) => Ok((Self::default(), ConfigSource::Missing(p))),
            None => Ok((Self::default(), ConfigSource::NoConfigDir)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.matching.validate()?;
        if self.store.timeout_ms == 0 {
            return Err(Error::Config("store.timeout_ms must be positive".to_string()));
        }
        if self.startup.refresh_attempts == 0 {
            return Err(Error::Config(
                "startup.refresh_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply CLI/environment overrides (they win over file values)
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(environment) = overrides.environment {
            self.environment = environment;
        }
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(path) = overrides.database_path {
            self.store.database_path = Some(path);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        self
    }
}

/// Default configuration file location: `<config_dir>/namesake/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("namesake").join("config.toml"))
}

/// Default database location: `<data_local_dir>/namesake/names.db`
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("namesake"))
        .unwrap_or_else(|| PathBuf::from("./namesake_data"))
        .join("names.db")
}
