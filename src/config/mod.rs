/// Database configuration and connection management
pub mod database;

/// Seed catalog entries from config.toml
pub mod catalog;

/// Register settings loaded from config.toml
pub mod settings;

/// Initial operator account from environment variables
pub mod users;

pub use settings::{AppConfig, RegisterSettings, load_config, load_default_config};
