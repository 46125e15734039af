//! Configuration loading and discovery for `sum.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::SumConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "sum.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse sum.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override luminance threshold
    pub threshold: Option<u8>,
    /// Force exact (pure black) classification
    pub exact: Option<bool>,
    /// Override row deduplication
    pub dedupe_rows: Option<bool>,
    /// Override scale factor
    pub scale: Option<u32>,
    /// Override default frame duration
    pub default_frame_ms: Option<u32>,
    /// Override strict mode
    pub strict: Option<bool>,
}

/// Find sum.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find sum.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a sum.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. Without a config file the defaults are returned.
pub fn load_config(path: Option<&Path>) -> Result<SumConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(SumConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<SumConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: SumConfig = toml::from_str(&contents)?;
    check(&config)?;
    Ok(config)
}

fn check(config: &SumConfig) -> Result<(), ConfigError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(())
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The merged result
/// is validated again, so an out-of-range flag is reported like a bad config value.
pub fn merge_cli_overrides(
    config: &mut SumConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    if let Some(threshold) = overrides.threshold {
        config.import.threshold = threshold;
        config.import.policy = super::schema::PolicyKind::Threshold;
    }
    if overrides.exact == Some(true) {
        config.import.policy = super::schema::PolicyKind::Exact;
    }
    if let Some(dedupe) = overrides.dedupe_rows {
        config.import.dedupe_rows = dedupe;
    }
    if let Some(scale) = overrides.scale {
        config.render.scale = scale;
    }
    if let Some(ms) = overrides.default_frame_ms {
        config.render.default_frame_ms = ms;
    }
    if let Some(strict) = overrides.strict {
        config.validate.strict = strict;
    }

    check(config)
}
