//! Application state management

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use ner::config::NerConfig;
use ner::pipeline::{EntityRecognizer, TokenClassificationPipeline};

use crate::config::ServerConfig;

/// Application state shared across all handlers
///
/// Built once before the listener binds and never mutated afterwards.
pub struct AppState {
    /// The loaded model
    pub recognizer: Arc<dyn EntityRecognizer>,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create new application state
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, config: ServerConfig) -> Self {
        Self { recognizer, config }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("model_id", &self.recognizer.model_id())
            .field("config", &self.config)
            .finish()
    }
}

/// Text run through a freshly loaded model before the server binds
const WARM_UP_TEXT: &str = "Erik bor i Stockholm.";

/// Load the configured model on a blocking thread and run one warm-up pass.
///
/// Any failure is fatal for startup. Load failures (missing files, bad
/// weights, invalid configuration) are reported separately from a model that
/// loads but cannot run.
pub async fn load_pipeline(config: &NerConfig) -> anyhow::Result<TokenClassificationPipeline> {
    let config = config.clone();
    let model_id = match &config.model.local_path {
        Some(path) => path.display().to_string(),
        None => config.model.model_id.clone(),
    };

    tokio::task::spawn_blocking(move || -> ner::Result<TokenClassificationPipeline> {
        let pipeline = TokenClassificationPipeline::from_config(&config)?;
        pipeline.recognize(WARM_UP_TEXT)?;
        Ok(pipeline)
    })
    .await
    .context("Model loading task failed")?
    .map_err(|err| {
        let context = if err.is_load_failure() {
            format!("Failed to load model '{}'", model_id)
        } else {
            format!("Model '{}' loaded but failed its warm-up pass", model_id)
        };
        anyhow::Error::new(err).context(context)
    })
}
