//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;

/// Largest token window accepted; BERT-family checkpoints stay well below this
pub const MAX_SEQ_LENGTH_LIMIT: usize = 8192;

/// Smallest token window: `[CLS]`, `[SEP]` and one token of text
pub const MIN_SEQ_LENGTH: usize = 3;

/// Validate the entire configuration.
pub fn validate_config(config: &NerConfig) -> Result<(), ConfigError> {
    validate_model_config(&config.model)?;

    Ok(())
}

/// Validate model configuration.
fn validate_model_config(config: &ModelConfig) -> Result<(), ConfigError> {
    if config.local_path.is_none() && config.model_id.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Model id cannot be empty unless a local model path is set".to_string(),
        ));
    }

    if config.local_path.is_none() && config.revision.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Model revision cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.local_path
        && path.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "Local model path cannot be empty".to_string(),
        ));
    }

    if !(MIN_SEQ_LENGTH..=MAX_SEQ_LENGTH_LIMIT).contains(&config.max_seq_length) {
        return Err(ConfigError::ValidationError(format!(
            "max_seq_length must be between {} and {}, got {}",
            MIN_SEQ_LENGTH, MAX_SEQ_LENGTH_LIMIT, config.max_seq_length
        )));
    }

    Ok(())
}
