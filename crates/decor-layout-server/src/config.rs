// crates/decor-layout-server/src/config.rs
// ============================================================================
// Module: Server Configuration
// Description: TOML-backed configuration for the layout service.
// Purpose: Centralize listener, body-limit, and store settings with
//          fail-closed validation.
// Dependencies: decor-layout-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration loads from a TOML file and validates before the service
//! starts. Validation fails closed: a config that cannot be proven sane is
//! rejected with a message naming the offending field.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;

use decor_layout_store_sqlite::SqliteLayoutStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default listener address for the layout service.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8087";
/// Default maximum request body size in bytes (5 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;
/// Default warehouse served when a request names none.
pub const DEFAULT_WAREHOUSE_ID: &str = "warehouse-main";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config file {path} could not be read: {reason}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O failure.
        reason: String,
    },
    /// The config file could not be parsed as TOML.
    #[error("config file {path} is not valid TOML: {reason}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying parse failure.
        reason: String,
    },
    /// A config field failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Top-level service configuration.
///
/// # Invariants
/// - `listen_addr` parses as a socket address.
/// - `max_body_bytes` is greater than zero.
/// - `default_warehouse_id` is non-empty.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listener address, for example `127.0.0.1:8087`.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Warehouse served when a request names none.
    #[serde(default = "default_warehouse_id")]
    pub default_warehouse_id: String,
    /// Layout store settings.
    pub store: SqliteLayoutStoreConfig,
}

impl ServerConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let config: Self = toml::from_str(&raw).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every field, failing closed on the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr.parse::<SocketAddr>().map_err(|err| {
            ConfigError::Invalid(format!(
                "listen_addr {} is not a socket address: {err}",
                self.listen_addr
            ))
        })?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.default_warehouse_id.is_empty() {
            return Err(ConfigError::Invalid(
                "default_warehouse_id must not be empty".to_string(),
            ));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must not be empty".to_string()));
        }
        if self.store.legacy_org_id.is_empty() {
            return Err(ConfigError::Invalid(
                "store.legacy_org_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns the default listener address.
fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

/// Returns the default maximum body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default warehouse identifier.
fn default_warehouse_id() -> String {
    DEFAULT_WAREHOUSE_ID.to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
