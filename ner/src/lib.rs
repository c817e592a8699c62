//! # ner
//!
//! Named entity recognition over pretrained BERT token-classification models,
//! running locally on [candle](https://github.com/huggingface/candle).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ner::prelude::*;
//!
//! fn main() -> ner::Result<()> {
//!     let config = ConfigBuilder::new()
//!         .with_model_id("KB/bert-base-swedish-cased-ner")
//!         .with_aggregation(AggregationStrategy::Simple)
//!         .build()?;
//!
//!     // Blocking: downloads (or reads from cache) and loads the weights
//!     let pipeline = TokenClassificationPipeline::from_config(&config)?;
//!
//!     let batch = vec!["Erik bor i Stockholm.".to_string()];
//!     for entities in pipeline.recognize_batch(&batch)? {
//!         for entity in entities {
//!             println!("{} {} {:.3}", entity.text, entity.label, entity.score);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **config**: layered configuration (defaults, file, `NER_*` environment)
//! - **logging**: `tracing` subscriber setup and the HTTP trace layer
//! - **ml**: model file resolution, tokenizer loading, the candle BERT classifier
//! - **pipeline**: the [`EntityRecognizer`](pipeline::EntityRecognizer) seam, the
//!   token-classification pipeline and label aggregation
//!
//! The HTTP surface lives in the separate `ner-server` crate.

pub mod config;
pub mod logging;
pub mod ml;
pub mod pipeline;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::config::{
        ConfigBuilder, ConfigLoader, DeviceKind, LogLevel, LoggingConfig, ModelConfig, NerConfig,
        PipelineConfig,
    };
    pub use crate::pipeline::{
        AggregationStrategy, Entity, EntityRecognizer, Position, TokenClassificationPipeline,
    };
    pub use crate::{NerError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for library operations
#[derive(Debug, thiserror::Error)]
pub enum NerError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Configuration(#[from] crate::config::ConfigError),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// Model loading, tokenization or inference failed
    #[error("ML error: {0}")]
    ML(#[from] crate::ml::MLError),
}

impl NerError {
    /// Whether the error happened while loading the model rather than running it.
    ///
    /// Load failures are fatal at startup; everything else is a per-request failure.
    pub fn is_load_failure(&self) -> bool {
        match self {
            NerError::Configuration(_) => true,
            NerError::ML(err) => err.is_load_failure(),
            _ => false,
        }
    }
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, NerError>;
