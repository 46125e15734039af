//! Configuration module for the sum tool
//!
//! Provides types and parsing for the optional `sum.toml` settings file.

pub mod loader;
pub mod schema;

pub use loader::{find_config, find_config_from, load_config, merge_cli_overrides, CliOverrides, ConfigError};
pub use schema::*;
