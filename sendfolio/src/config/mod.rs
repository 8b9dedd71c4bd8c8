//! Configuration management
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `SENDFOLIO_` prefix, `__`
//!    for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/sendfolio/config.toml` (user config, XDG)
//! 4. `/etc/sendfolio/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! Environment variable format: `SENDFOLIO_SECTION__FIELD_NAME`, for
//! example `SENDFOLIO_DISPATCH__CONCURRENCY=4`.
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [service]
//! name = "sendfolio"
//! port = 3000
//!
//! [database]
//! url = "postgres://localhost/sendfolio"
//!
//! [google]
//! client_id = "…apps.googleusercontent.com"
//! client_secret = "…"
//! redirect_uri = "http://localhost:3000/auth/google/callback"
//!
//! [dispatch]
//! concurrency = 1
//! request_timeout_secs = 30
//! ```

use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name, used in logs
    pub name: String,

    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "sendfolio".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Postgres connection URL
    pub url: String,

    /// Maximum pool size
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/sendfolio".to_string(),
            max_connections: 5,
        }
    }
}

/// Google OAuth2 client settings
///
/// These identify the application to Google; the per-user token pair comes
/// from the authenticated request, not from configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth2 client id
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: String,

    /// Registered redirect URI
    pub redirect_uri: String,
}

/// Batch dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Maximum provider calls in flight per batch
    ///
    /// The default of 1 sends strictly sequentially. Raising it keeps
    /// result ordering and per-recipient isolation unchanged.
    pub concurrency: usize,

    /// Per-request timeout for provider calls, in seconds
    pub request_timeout_secs: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            request_timeout_secs: 30,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendfolioConfig {
    /// HTTP service settings
    #[serde(default)]
    pub service: ServiceSettings,

    /// Database settings
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Google OAuth2 client settings
    #[serde(default)]
    pub google: GoogleSettings,

    /// Batch dispatch settings
    #[serde(default)]
    pub dispatch: DispatchSettings,
}

impl SendfolioConfig {
    /// Load configuration with the documented precedence chain
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is malformed or a value fails to
    /// deserialize into the typed sections.
    pub fn load() -> anyhow::Result<Self> {
        let mut figment = Figment::new()
            // 5. Start with defaults (lowest priority)
            .merge(Toml::string(&toml::to_string(&Self::default())?));

        // 4. System config: /etc/sendfolio/config.toml
        let system_config = PathBuf::from("/etc/sendfolio/config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        // 3. User config: ~/.config/sendfolio/config.toml
        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                figment = figment.merge(Toml::file(&user_config));
            }
        }

        // 2. Local config: ./config.toml
        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        // 1. Environment variables (highest priority, double underscore for nesting)
        figment = figment.merge(Env::prefixed("SENDFOLIO_").split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// The XDG user config path
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sendfolio").join("config.toml"))
    }
}
