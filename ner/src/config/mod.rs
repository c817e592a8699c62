//! Configuration system.
//!
//! Configuration is layered: compiled-in defaults, then an optional file
//! (TOML, YAML or JSON), then `NER_*` environment variables. Nested keys are
//! separated by a double underscore, e.g. `NER_MODEL__MODEL_ID`.

mod builder;
mod loader;
mod models;
pub(crate) mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "ner.toml",
    "ner.yaml",
    "ner.yml",
    "ner.json",
    ".ner/config.toml",
    ".ner/config.yaml",
    ".ner/config.yml",
    ".ner/config.json",
];

/// Environment variable prefix for configuration
pub const ENV_PREFIX: &str = "NER_";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
