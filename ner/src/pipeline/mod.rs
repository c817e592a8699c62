//! Token-classification pipeline.
//!
//! Turns raw texts into lists of [`Entity`] values: tokenize, run the model,
//! take the softmax over labels, then decode the per-token probabilities with
//! the configured [`AggregationStrategy`].

pub mod aggregation;
mod recognizer;
mod token_classification;
mod types;

pub use aggregation::AggregationStrategy;
pub use recognizer::EntityRecognizer;
pub use token_classification::TokenClassificationPipeline;
pub use types::{Entity, Position};
