//! Configuration models.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::AggregationStrategy;

/// Pretrained model used when nothing else is configured
pub const DEFAULT_MODEL_ID: &str = "KB/bert-base-swedish-cased-ner";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Which model to load and where from
    pub model: ModelConfig,

    /// How token predictions are turned into entities
    pub pipeline: PipelineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Model source and runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Hugging Face model identifier
    pub model_id: String,

    /// Hub revision (branch, tag or commit)
    pub revision: String,

    /// Load model files from this directory instead of the hub
    pub local_path: Option<PathBuf>,

    /// Hub cache directory; the hub default (`HF_HOME`) when unset
    pub cache_dir: Option<PathBuf>,

    /// Hub access token for gated or private models
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,

    /// Device to run inference on
    pub device: DeviceKind,

    /// Token window; longer inputs are truncated
    pub max_seq_length: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            revision: "main".to_string(),
            local_path: None,
            cache_dir: None,
            auth_token: None,
            device: DeviceKind::Auto,
            max_seq_length: 512,
        }
    }
}

/// Inference device selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// CUDA if available, then Metal, then CPU
    #[default]
    Auto,

    /// Always run on the CPU
    Cpu,

    /// First CUDA device
    Cuda,

    /// First Metal device
    Metal,
}

impl std::str::FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(DeviceKind::Auto),
            "cpu" => Ok(DeviceKind::Cpu),
            "cuda" | "gpu" => Ok(DeviceKind::Cuda),
            "metal" => Ok(DeviceKind::Metal),
            other => Err(format!(
                "unknown device '{}', expected one of: auto, cpu, cuda, metal",
                other
            )),
        }
    }
}

/// Entity decoding settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// How sub-word tokens are merged into entities
    pub aggregation: AggregationStrategy,

    /// Labels that never produce an entity
    pub ignore_labels: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            aggregation: AggregationStrategy::None,
            ignore_labels: vec!["O".to_string()],
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,

    /// Debug level
    Debug,

    /// Info level
    Info,

    /// Warn level
    Warn,

    /// Error level
    Error,
}

impl LogLevel {
    /// Directive string understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// Pretty format (more human-readable)
    Pretty,

    /// Compact single-line format
    Compact,

    /// JSON format (for machine parsing)
    Json,
}
