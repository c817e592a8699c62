//! Model file resolution.
//!
//! A token-classification checkpoint is a `config.json`, a tokenizer and a
//! weights file. They come either from a local directory or from the Hugging
//! Face hub, where `hf-hub` caches them on disk.

use std::path::{Path, PathBuf};

use hf_hub::api::sync::{ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};

use super::error::{MLError, Result};
use crate::config::ModelConfig;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const VOCAB_FILE: &str = "vocab.txt";
const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";
const SAFETENSORS_FILE: &str = "model.safetensors";
const PYTORCH_FILE: &str = "pytorch_model.bin";

/// Where the tokenizer comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizerSource {
    /// A serialized `tokenizer.json`
    Json(PathBuf),

    /// A BERT `vocab.txt`, with the optional `tokenizer_config.json` next to it
    WordPiece {
        vocab: PathBuf,
        config: Option<PathBuf>,
    },
}

/// Checkpoint weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightsFile {
    SafeTensors(PathBuf),
    PyTorch(PathBuf),
}

impl WeightsFile {
    pub fn path(&self) -> &Path {
        match self {
            WeightsFile::SafeTensors(path) | WeightsFile::PyTorch(path) => path,
        }
    }
}

/// Local paths of every file needed to build the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: TokenizerSource,
    pub weights: WeightsFile,
}

impl ModelFiles {
    /// Resolve the files for the configured model, downloading them if needed.
    ///
    /// This blocks on network and disk IO.
    pub fn resolve(config: &ModelConfig) -> Result<Self> {
        match &config.local_path {
            Some(dir) => Self::from_dir(dir),
            None => Self::from_hub(config),
        }
    }

    /// Resolve the files from a local model directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(MLError::model_not_found(format!(
                "model directory {} does not exist",
                dir.display()
            )));
        }

        let existing = |name: &str| Some(dir.join(name)).filter(|path| path.is_file());

        let config = existing(CONFIG_FILE).ok_or_else(|| {
            MLError::model_not_found(format!("{} missing in {}", CONFIG_FILE, dir.display()))
        })?;

        let tokenizer = match existing(TOKENIZER_FILE) {
            Some(path) => TokenizerSource::Json(path),
            None => TokenizerSource::WordPiece {
                vocab: existing(VOCAB_FILE).ok_or_else(|| {
                    MLError::model_not_found(format!(
                        "neither {} nor {} found in {}",
                        TOKENIZER_FILE,
                        VOCAB_FILE,
                        dir.display()
                    ))
                })?,
                config: existing(TOKENIZER_CONFIG_FILE),
            },
        };

        let weights = existing(SAFETENSORS_FILE)
            .map(WeightsFile::SafeTensors)
            .or_else(|| existing(PYTORCH_FILE).map(WeightsFile::PyTorch))
            .ok_or_else(|| {
                MLError::model_not_found(format!(
                    "neither {} nor {} found in {}",
                    SAFETENSORS_FILE,
                    PYTORCH_FILE,
                    dir.display()
                ))
            })?;

        Ok(Self {
            config,
            tokenizer,
            weights,
        })
    }

    /// Resolve the files from the Hugging Face hub.
    pub fn from_hub(config: &ModelConfig) -> Result<Self> {
        let mut builder = ApiBuilder::new().with_progress(false);
        if let Some(cache_dir) = &config.cache_dir {
            builder = builder.with_cache_dir(cache_dir.clone());
        }
        if let Some(token) = &config.auth_token {
            builder = builder.with_token(Some(token.clone()));
        }
        let api = builder
            .build()
            .map_err(|e| MLError::model_loading(format!("Failed to create hub client: {}", e)))?;

        let repo = api.repo(Repo::with_revision(
            config.model_id.clone(),
            RepoType::Model,
            config.revision.clone(),
        ));

        tracing::info!(
            model_id = %config.model_id,
            revision = %config.revision,
            "Resolving model files from the hub"
        );

        let model_config = fetch_required(&repo, &config.model_id, CONFIG_FILE)?;

        let tokenizer = match fetch_optional(&repo, TOKENIZER_FILE) {
            Some(path) => TokenizerSource::Json(path),
            None => TokenizerSource::WordPiece {
                vocab: fetch_required(&repo, &config.model_id, VOCAB_FILE)?,
                config: fetch_optional(&repo, TOKENIZER_CONFIG_FILE),
            },
        };

        let weights = match fetch_optional(&repo, SAFETENSORS_FILE) {
            Some(path) => WeightsFile::SafeTensors(path),
            None => WeightsFile::PyTorch(fetch_required(&repo, &config.model_id, PYTORCH_FILE)?),
        };

        Ok(Self {
            config: model_config,
            tokenizer,
            weights,
        })
    }
}

fn fetch_required(repo: &ApiRepo, model_id: &str, file: &str) -> Result<PathBuf> {
    repo.get(file).map_err(|e| {
        MLError::model_not_found(format!("{} from {}: {}", file, model_id, e))
    })
}

fn fetch_optional(repo: &ApiRepo, file: &str) -> Option<PathBuf> {
    match repo.get(file) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::debug!("Optional model file {} unavailable: {}", file, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"{}").unwrap();
        path
    }

    #[test]
    fn test_missing_directory() {
        let result = ModelFiles::from_dir("/no/such/model/dir");
        assert!(matches!(result, Err(MLError::ModelNotFound(_))));
    }

    #[test]
    fn test_prefers_tokenizer_json_and_safetensors() {
        let dir = tempdir().unwrap();
        let config = touch(dir.path(), CONFIG_FILE);
        let tokenizer = touch(dir.path(), TOKENIZER_FILE);
        touch(dir.path(), VOCAB_FILE);
        let weights = touch(dir.path(), SAFETENSORS_FILE);
        touch(dir.path(), PYTORCH_FILE);

        let files = ModelFiles::from_dir(dir.path()).unwrap();
        assert_eq!(files.config, config);
        assert_eq!(files.tokenizer, TokenizerSource::Json(tokenizer));
        assert_eq!(files.weights, WeightsFile::SafeTensors(weights));
    }

    #[test]
    fn test_falls_back_to_vocab_and_pytorch() {
        let dir = tempdir().unwrap();
        touch(dir.path(), CONFIG_FILE);
        let vocab = touch(dir.path(), VOCAB_FILE);
        let tokenizer_config = touch(dir.path(), TOKENIZER_CONFIG_FILE);
        let weights = touch(dir.path(), PYTORCH_FILE);

        let files = ModelFiles::from_dir(dir.path()).unwrap();
        assert_eq!(
            files.tokenizer,
            TokenizerSource::WordPiece {
                vocab,
                config: Some(tokenizer_config),
            }
        );
        assert_eq!(files.weights.path(), weights.as_path());
    }

    #[test]
    fn test_missing_required_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            ModelFiles::from_dir(dir.path()),
            Err(MLError::ModelNotFound(_))
        ));

        touch(dir.path(), CONFIG_FILE);
        touch(dir.path(), VOCAB_FILE);
        let err = ModelFiles::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, MLError::ModelNotFound(_)));
        assert!(err.to_string().contains(SAFETENSORS_FILE));
    }
}
