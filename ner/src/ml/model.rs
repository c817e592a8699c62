//! BERT token classifier on candle.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use serde_json::Value;

use super::error::{MLError, Result};
use super::hub::WeightsFile;

/// Class id to label name, dense and ordered by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels(Vec<String>);

impl Labels {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    /// Parse the `id2label` map of a model `config.json`.
    ///
    /// Ids must cover `0..n` without gaps.
    pub fn from_model_config(config: &Value) -> Result<Self> {
        let map = config
            .get("id2label")
            .and_then(Value::as_object)
            .filter(|map| !map.is_empty())
            .ok_or_else(|| MLError::configuration("config.json has no id2label map"))?;

        let mut labels = vec![None; map.len()];
        for (id, label) in map {
            let index: usize = id
                .parse()
                .map_err(|_| MLError::configuration(format!("label id '{}' is not a number", id)))?;
            let label = label.as_str().ok_or_else(|| {
                MLError::configuration(format!("label for id {} is not a string", index))
            })?;
            let slot = labels.get_mut(index).ok_or_else(|| {
                MLError::configuration(format!(
                    "label id {} out of range for {} labels",
                    index,
                    map.len()
                ))
            })?;
            *slot = Some(label.to_string());
        }

        // With ids bounded by the map size, every slot is filled exactly once
        labels
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .map(Self)
            .ok_or_else(|| MLError::configuration("id2label ids are not contiguous"))
    }

    pub fn get(&self, id: usize) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Read `config.json` into the encoder configuration and the label map.
pub fn read_model_config(path: &Path) -> Result<(Config, Labels)> {
    let raw = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| MLError::configuration(format!("Failed to parse {}: {}", path.display(), e)))?;
    let labels = Labels::from_model_config(&value)?;
    let config: Config = serde_json::from_value(value).map_err(|e| {
        MLError::configuration(format!("Unsupported encoder config in {}: {}", path.display(), e))
    })?;
    Ok((config, labels))
}

/// Open checkpoint weights as a variable builder.
pub fn load_weights(weights: &WeightsFile, device: &Device) -> Result<VarBuilder<'static>> {
    match weights {
        WeightsFile::SafeTensors(path) => {
            // SAFETY: the file is memory mapped read-only and must not be modified while
            // the model is alive; hub cache and model directories are not written to after download.
            unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device) }.map_err(
                |e| MLError::model_loading(format!("Failed to map {}: {}", path.display(), e)),
            )
        }
        WeightsFile::PyTorch(path) => VarBuilder::from_pth(path, DType::F32, device)
            .map_err(|e| MLError::model_loading(format!("Failed to read {}: {}", path.display(), e))),
    }
}

/// BERT encoder with a per-token linear classification head.
pub struct BertForTokenClassification {
    bert: BertModel,
    classifier: Linear,
    num_labels: usize,
}

impl BertForTokenClassification {
    /// Build the model from a variable builder.
    ///
    /// Encoder weights are looked up under `bert.` first, as in checkpoints
    /// exported for token classification, then at the root.
    pub fn load(vb: VarBuilder, config: &Config, num_labels: usize) -> Result<Self> {
        let bert = match BertModel::load(vb.pp("bert"), config) {
            Ok(bert) => bert,
            Err(prefixed) => BertModel::load(vb.clone(), config).map_err(|e| {
                MLError::model_loading(format!(
                    "Failed to load encoder weights: {} (with bert. prefix: {})",
                    e, prefixed
                ))
            })?,
        };

        let classifier = candle_nn::linear(config.hidden_size, num_labels, vb.pp("classifier"))
            .map_err(|e| MLError::model_loading(format!("Failed to load classifier head: {}", e)))?;

        Ok(Self {
            bert,
            classifier,
            num_labels,
        })
    }

    /// Logits of shape `[batch, seq_len, num_labels]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> candle_core::Result<Tensor> {
        let hidden = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?;
        self.classifier.forward(&hidden)
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }
}
