//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `PETSHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `PETSHOP_PORT` - Listen port (default: 3000)
//! - `PETSHOP_DATA_DIR` - Directory holding the stored cart (default: data)
//! - `PETSHOP_CART_SLOT` - Storage slot name for the cart (default: `petshop_cart`)
//! - `PETSHOP_CART_PATH` - Location of the cart page (default: /cart)
//! - `PETSHOP_STORAGE_QUOTA_BYTES` - Maximum size of the stored cart
//! - `PETSHOP_CATALOG_PATH` - JSON product catalog (default: built-in list)
//! - `PETSHOP_STATIC_DIR` - Static assets directory (default: crates/storefront/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::cart::DEFAULT_CART_SLOT;
use crate::navigation::{CartLink, DEFAULT_CART_PATH};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the stored cart
    pub data_dir: PathBuf,
    /// Storage slot name for the cart
    pub cart_slot: String,
    /// Location of the cart page
    pub cart_link: CartLink,
    /// Maximum stored cart size in bytes
    pub storage_quota_bytes: Option<u64>,
    /// JSON catalog file; `None` uses the built-in catalog
    pub catalog_path: Option<PathBuf>,
    /// Static assets directory
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };

        let host = env.parse_or("PETSHOP_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parse_or("PETSHOP_PORT", 3000)?;
        let data_dir = PathBuf::from(env.get_or_default("PETSHOP_DATA_DIR", "data"));
        let cart_slot = env.get_or_default("PETSHOP_CART_SLOT", DEFAULT_CART_SLOT);
        if cart_slot.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "PETSHOP_CART_SLOT".to_string(),
                "cannot be empty".to_string(),
            ));
        }
        let cart_link =
            CartLink::parse(&env.get_or_default("PETSHOP_CART_PATH", DEFAULT_CART_PATH)).map_err(
                |e| ConfigError::InvalidEnvVar("PETSHOP_CART_PATH".to_string(), e.to_string()),
            )?;
        let storage_quota_bytes = env.parse_optional("PETSHOP_STORAGE_QUOTA_BYTES")?;
        let catalog_path = env.get_optional("PETSHOP_CATALOG_PATH").map(PathBuf::from);
        let static_dir =
            PathBuf::from(env.get_or_default("PETSHOP_STATIC_DIR", "crates/storefront/static"));

        let sentry_dsn = env.get_optional("SENTRY_DSN");
        let sentry_environment = env.get_optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env.parse_rate_or("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = env.parse_rate_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?;

        Ok(Self {
            host,
            port,
            data_dir,
            cart_slot,
            cart_link,
            storage_quota_bytes,
            catalog_path,
            static_dir,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; empty values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parse_optional(key)?.unwrap_or(default))
    }

    /// Parse an optional variable.
    fn parse_optional<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_optional(key)
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }

    /// Parse a sample rate in `0.0..=1.0`.
    fn parse_rate_or(&self, key: &str, default: f32) -> Result<f32, ConfigError> {
        let rate = self.parse_or(key, default)?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("{rate} is not between 0.0 and 1.0"),
            ))
        }
    }
}
