//! Server configuration module

use anyhow::{Context, Result};
use ner::config::{ConfigBuilder, ConfigLoader, NerConfig};
use ner::logging::parse_log_level;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::cli::CliArgs;

/// Default request body limit: 2 MiB
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 2 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_request_size: usize,

    /// Model, pipeline and logging configuration of the library
    pub ner: NerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            ner: NerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from CLI arguments and environment variables
    /// CLI arguments take precedence over environment variables
    pub fn from_cli_and_env(cli_args: CliArgs) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = cli_args.host {
            config.host = host;
        } else if let Ok(host) = env::var("NER_HOST") {
            config.host = host;
        }

        if let Some(port) = cli_args.port {
            config.port = port;
        } else if let Ok(port) = env::var("NER_PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("NER_PORT must be a port number, got '{}'", port))?;
        }

        if let Some(max_size) = cli_args.max_request_size {
            config.max_request_size = max_size;
        } else if let Ok(max_size) = env::var("NER_MAX_REQUEST_SIZE") {
            config.max_request_size = max_size.parse().with_context(|| {
                format!("NER_MAX_REQUEST_SIZE must be a byte count, got '{}'", max_size)
            })?;
        }

        let config_file = cli_args
            .config_file
            .or_else(|| env::var("NER_CONFIG_FILE").ok().map(PathBuf::from));

        let mut loader = ConfigLoader::new();
        match &config_file {
            Some(path) => {
                loader.load_file(path)?;
            }
            None => {
                loader.load_default_files();
            }
        }
        let ner_config = loader
            .load_env()
            .extract()
            .context("Invalid NER configuration")?;

        let mut builder = ConfigBuilder::from_config(ner_config);
        if let Some(model_id) = cli_args.model_id {
            builder = builder.with_model_id(model_id);
        }
        if let Some(revision) = cli_args.revision {
            builder = builder.with_revision(revision);
        }
        if let Some(model_path) = cli_args.model_path {
            builder = builder.with_local_model(model_path);
        }
        if let Some(device) = cli_args.device {
            builder = builder.with_device(device);
        }
        if let Some(aggregation) = cli_args.aggregation {
            builder = builder.with_aggregation(aggregation);
        }
        if let Some(level) = cli_args.log_level {
            builder = builder.with_log_level(parse_log_level(&level)?);
        }
        config.ner = builder.build()?;

        Ok(config)
    }
}
