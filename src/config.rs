//! Application configuration
//!
//! Settings come from defaults, an optional JSON file, and `CINEMA_DB_*`
//! environment variables, applied in that order.

use app_ui::navigation::{RouterConfig, UnresolvedPolicy};
use app_ui::screens::DEFAULT_IMAGE_BASE_URL;
use networking::firebase::{self, FirebaseConfig};
use networking::retry::RetryConfig;
use networking::tmdb::{self, TmdbConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid configuration JSON
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Environment variable holds an unusable value
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Rejected value
        value: String,
    },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Movie catalog settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// TMDB API base URL
    pub base_url: String,
    /// Base URL poster paths are appended to
    pub image_base_url: String,
    /// TMDB read access token
    pub access_token: String,
    /// Response language
    pub language: String,
    /// Retries of transient failures per request
    pub max_retries: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: tmdb::DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            access_token: String::new(),
            language: tmdb::DEFAULT_LANGUAGE.to_string(),
            max_retries: 3,
        }
    }
}

/// Identity provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Identity Toolkit base URL
    pub base_url: String,
    /// Firebase web API key
    pub api_key: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            base_url: firebase::DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
        }
    }
}

/// What the router does with a destination value nobody registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedDestinations {
    /// Abort
    Fatal,
    /// Log and ignore the request
    Ignore,
}

impl From<UnresolvedDestinations> for UnresolvedPolicy {
    fn from(value: UnresolvedDestinations) -> Self {
        match value {
            UnresolvedDestinations::Fatal => UnresolvedPolicy::Fatal,
            UnresolvedDestinations::Ignore => UnresolvedPolicy::Ignore,
        }
    }
}

impl std::str::FromStr for UnresolvedDestinations {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fatal" => Ok(UnresolvedDestinations::Fatal),
            "ignore" => Ok(UnresolvedDestinations::Ignore),
            _ => Err(()),
        }
    }
}

/// Navigation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    /// Unresolved destination handling; build-dependent when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved_destinations: Option<UnresolvedDestinations>,
    /// Animate transitions
    pub animated: bool,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            unresolved_destinations: None,
            animated: true,
        }
    }
}

/// Application configuration
///
/// # Example
///
/// ```
/// use cinema_db::config::AppConfig;
///
/// let config: AppConfig = serde_json::from_str(
///     r#"{ "catalog": { "access_token": "token" }, "log_filter": "debug" }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.catalog.access_token, "token");
/// assert_eq!(config.catalog.language, "en-US");
/// assert_eq!(config.log_filter, "debug");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Movie catalog
    pub catalog: CatalogSettings,
    /// Identity provider
    pub auth: AuthSettings,
    /// Navigation
    pub navigation: NavigationSettings,
    /// HTTP request timeout in seconds
    pub http_timeout_secs: u64,
    /// Log filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogSettings::default(),
            auth: AuthSettings::default(),
            navigation: NavigationSettings::default(),
            http_timeout_secs: 30,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Read a JSON configuration file
    ///
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Io` - The file could not be read
    /// - `ConfigError::Parse` - The file is not valid configuration JSON
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `CINEMA_DB_*` environment variables
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidValue` - A numeric or policy variable does not parse
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("CINEMA_DB_TMDB_BASE_URL") {
            self.catalog.base_url = value;
        }
        if let Some(value) = lookup("CINEMA_DB_IMAGE_BASE_URL") {
            self.catalog.image_base_url = value;
        }
        if let Some(value) = lookup("CINEMA_DB_TMDB_TOKEN") {
            self.catalog.access_token = value;
        }
        if let Some(value) = lookup("CINEMA_DB_LANGUAGE") {
            self.catalog.language = value;
        }
        if let Some(value) = lookup("CINEMA_DB_MAX_RETRIES") {
            self.catalog.max_retries = parse_var("CINEMA_DB_MAX_RETRIES", value)?;
        }
        if let Some(value) = lookup("CINEMA_DB_AUTH_BASE_URL") {
            self.auth.base_url = value;
        }
        if let Some(value) = lookup("CINEMA_DB_FIREBASE_API_KEY") {
            self.auth.api_key = value;
        }
        if let Some(value) = lookup("CINEMA_DB_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = parse_var("CINEMA_DB_HTTP_TIMEOUT_SECS", value)?;
        }
        if let Some(value) = lookup("CINEMA_DB_LOG") {
            self.log_filter = value;
        }
        if let Some(value) = lookup("CINEMA_DB_UNRESOLVED_DESTINATIONS") {
            self.navigation.unresolved_destinations =
                Some(parse_var("CINEMA_DB_UNRESOLVED_DESTINATIONS", value)?);
        }
        Ok(())
    }

    /// HTTP request timeout
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// TMDB client configuration
    pub fn tmdb_config(&self) -> TmdbConfig {
        TmdbConfig::new(self.catalog.access_token.clone())
            .with_base_url(self.catalog.base_url.clone())
            .with_language(self.catalog.language.clone())
            .with_timeout(self.http_timeout())
            .with_retry(RetryConfig::new(self.catalog.max_retries))
    }

    /// Firebase client configuration
    pub fn firebase_config(&self) -> FirebaseConfig {
        FirebaseConfig::new(self.auth.api_key.clone())
            .with_base_url(self.auth.base_url.clone())
            .with_timeout(self.http_timeout())
    }

    /// Router configuration
    pub fn router_config(&self) -> RouterConfig {
        let config = RouterConfig::new().with_animations(self.navigation.animated);
        match self.navigation.unresolved_destinations {
            Some(policy) => config.with_unresolved_policy(policy.into()),
            None => config,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}
