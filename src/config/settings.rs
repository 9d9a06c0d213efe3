//! Application configuration loading from config.toml
//!
//! The file has a `[register]` table with tuning knobs and an optional `[[productos]]` list
//! used to seed the catalog. Every key has a default, so a missing file or an empty table is
//! a valid configuration.

use super::catalog::CatalogEntry;
use crate::{
    core::{
        catalog::DEFAULT_CATALOG_PAGE_SIZE, inventory::DEFAULT_LOW_STOCK_THRESHOLD,
        scanner::DEFAULT_SCAN_GAP,
    },
    errors::{Error, Result},
};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::info;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_VAR: &str = "KIOSKO_CONFIG";

/// Structure of the whole config.toml file
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Register tuning
    #[serde(default)]
    pub register: RegisterSettings,
    /// Products to seed on first run
    #[serde(default)]
    pub productos: Vec<CatalogEntry>,
}

/// `[register]` table
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegisterSettings {
    /// Longest pause between keystrokes of one scan, in milliseconds
    pub scanner_gap_ms: u64,
    /// Products loaded into the register's catalog cache
    pub catalog_page_size: u64,
    /// Rows shown on the products and inventory screens
    pub products_page_size: u64,
    /// Stock below which a product is flagged
    pub low_stock_threshold: i64,
}

impl Default for RegisterSettings {
    fn default() -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let scanner_gap_ms = DEFAULT_SCAN_GAP.as_millis() as u64;
        Self {
            scanner_gap_ms,
            catalog_page_size: DEFAULT_CATALOG_PAGE_SIZE,
            products_page_size: 100,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl RegisterSettings {
    /// Scanner gap as a [`Duration`].
    #[must_use]
    pub const fn scanner_gap(&self) -> Duration {
        Duration::from_millis(self.scanner_gap_ms)
    }

    fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.catalog_page_size == 0 {
            problems.push("catalog_page_size must be positive");
        }
        if self.products_page_size == 0 {
            problems.push("products_page_size must be positive");
        }
        if self.low_stock_threshold < 0 {
            problems.push("low_stock_threshold must not be negative");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Config {
                message: problems.join("; "),
            })
        }
    }
}

/// Parses a configuration document.
///
/// # Errors
/// Returns an error if the TOML is invalid or a setting is out of range.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.register.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A setting is out of range
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `$KIOSKO_CONFIG`, or ./config.toml.
///
/// A missing file yields the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        info!(path = %path, "No config file, using defaults");
        return Ok(AppConfig::default());
    }
    let config = load_config(&path)?;
    info!(path = %path, seed_products = config.productos.len(), "Configuration loaded");
    Ok(config)
}
