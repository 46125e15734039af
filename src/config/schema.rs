//! Configuration schema types for `sum.toml`
//!
//! Defines the structure and validation rules for SUM conversion settings.

use crate::encoder::{Classification, EncodeOptions};
use crate::fmt::FormatOptions;
use crate::gif::DEFAULT_FRAME_MS;
use crate::models::DEFAULT_VERSION;
use serde::{Deserialize, Serialize};

/// Largest accepted `render.scale`.
pub const MAX_SCALE: u32 = 64;

/// How imported pixels are split into foreground and background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Luminance threshold
    #[default]
    Threshold,
    /// Pure black only
    Exact,
}

/// Image import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub policy: PolicyKind,
    /// Luminance below this value is foreground
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    /// Alpha below this value is background
    #[serde(default = "default_threshold")]
    pub alpha_threshold: u8,
    /// Write repeated rows as `dK` back-references
    #[serde(default)]
    pub dedupe_rows: bool,
    /// Version token for the `!sum` header line
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            threshold: default_threshold(),
            alpha_threshold: default_threshold(),
            dedupe_rows: false,
            version: default_version(),
        }
    }
}

fn default_threshold() -> u8 {
    128
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Image export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Nearest-neighbour upscale factor
    #[serde(default = "default_scale")]
    pub scale: u32,
    /// Frame duration when the script has no `fps=` header
    #[serde(default = "default_frame_ms")]
    pub default_frame_ms: u32,
    /// Loop animated exports forever
    #[serde(default = "default_true")]
    pub loop_animation: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            default_frame_ms: default_frame_ms(),
            loop_animation: true,
        }
    }
}

fn default_scale() -> u32 {
    1
}

fn default_frame_ms() -> u32 {
    DEFAULT_FRAME_MS
}

fn default_true() -> bool {
    true
}

/// Validation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidateConfig {
    /// Treat parse warnings as errors
    #[serde(default)]
    pub strict: bool,
}

/// Root configuration from `sum.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SumConfig {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub validate: ValidateConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "render.scale")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sum.toml: '{}' {}", self.field, self.message)
    }
}

impl SumConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message: message.to_string(),
            });
        };

        if self.import.policy == PolicyKind::Threshold && self.import.threshold == 0 {
            push("import.threshold", "must be between 1 and 255");
        }
        if self.import.alpha_threshold == 0 {
            push("import.alpha_threshold", "must be between 1 and 255");
        }
        if self.import.version.trim().is_empty() {
            push("import.version", "must be a non-empty string");
        }
        if self.render.scale == 0 || self.render.scale > MAX_SCALE {
            push("render.scale", "must be between 1 and 64");
        }
        if self.render.default_frame_ms == 0 {
            push("render.default_frame_ms", "must be a positive integer");
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Pixel classification policy for imports.
    pub fn classification(&self) -> Classification {
        match self.import.policy {
            PolicyKind::Threshold => Classification::Threshold {
                luma: self.import.threshold,
                alpha: self.import.alpha_threshold,
            },
            PolicyKind::Exact => Classification::Exact,
        }
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            classification: self.classification(),
            version: self.import.version.clone(),
        }
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions { dedupe_rows: self.import.dedupe_rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SumConfig = toml::from_str("").unwrap();
        assert_eq!(config, SumConfig::default());
        assert_eq!(config.import.threshold, 128);
        assert_eq!(config.render.default_frame_ms, 100);
        assert!(config.render.loop_animation);
        assert!(!config.validate.strict);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[import]
policy = "exact"
alpha_threshold = 200
dedupe_rows = true
version = "1.1"

[render]
scale = 4
default_frame_ms = 50
loop_animation = false

[validate]
strict = true
"#;
        let config: SumConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.import.policy, PolicyKind::Exact);
        assert_eq!(config.classification(), Classification::Exact);
        assert!(config.format_options().dedupe_rows);
        assert_eq!(config.encode_options().version, "1.1");
        assert_eq!(config.render.scale, 4);
        assert!(!config.render.loop_animation);
        assert!(config.validate.strict);
        assert!(config.is_valid());
    }

    #[test]
    fn test_threshold_classification() {
        let config: SumConfig = toml::from_str("[import]\nthreshold = 90").unwrap();
        assert_eq!(config.classification(), Classification::Threshold { luma: 90, alpha: 128 });
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let result: Result<SumConfig, _> = toml::from_str("[import]\npolicy = \"dither\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = SumConfig::default();
        config.import.threshold = 0;
        config.import.version = " ".to_string();
        config.render.scale = 100;
        config.render.default_frame_ms = 0;

        let errors = config.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["import.threshold", "import.version", "render.scale", "render.default_frame_ms"]
        );
        assert!(errors[0].to_string().starts_with("sum.toml: 'import.threshold'"));
    }
}
