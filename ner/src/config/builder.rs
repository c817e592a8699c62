//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use crate::pipeline::AggregationStrategy;
use std::path::Path;

/// Builder for creating NerConfig instances.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: NerConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: NerConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: NerConfig) -> Self {
        Self { config }
    }

    /// Set the Hugging Face model identifier.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.config.model.model_id = model_id.into();
        self
    }

    /// Set the hub revision.
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.config.model.revision = revision.into();
        self
    }

    /// Load model files from a local directory instead of the hub.
    pub fn with_local_model<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.model.local_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the hub cache directory.
    pub fn with_cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.model.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the hub access token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.model.auth_token = Some(token.into());
        self
    }

    /// Set the inference device.
    pub fn with_device(mut self, device: DeviceKind) -> Self {
        self.config.model.device = device;
        self
    }

    /// Set the token window.
    pub fn with_max_seq_length(mut self, max_seq_length: usize) -> Self {
        self.config.model.max_seq_length = max_seq_length;
        self
    }

    /// Set the aggregation strategy.
    pub fn with_aggregation(mut self, aggregation: AggregationStrategy) -> Self {
        self.config.pipeline.aggregation = aggregation;
        self
    }

    /// Replace the labels that never produce an entity.
    pub fn with_ignore_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.pipeline.ignore_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Log to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Configuration for development: verbose, human-readable logs.
    pub fn development() -> Self {
        Self::new()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Configuration for production: JSON logs at info level.
    pub fn production() -> Self {
        Self::new()
            .with_log_level(LogLevel::Info)
            .with_log_format(LogFormat::Json)
    }

    /// Build the configuration.
    pub fn build(self) -> Result<NerConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}
