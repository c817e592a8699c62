use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use tokenizers::{Encoding, Tokenizer};

use super::aggregation::{self, AggregationStrategy, TokenScores};
use super::{Entity, EntityRecognizer};
use crate::config::{NerConfig, PipelineConfig};
use crate::ml::device::device_name;
use crate::ml::model::{load_weights, read_model_config};
use crate::ml::{
    BertForTokenClassification, Labels, MLError, ModelFiles, load_tokenizer, select_device,
};

/// A loaded token-classification model ready to recognize entities.
///
/// Loading is blocking. Once built the pipeline is immutable and can be shared
/// across threads; every text runs its own forward pass, so results never
/// depend on what else is in the batch.
pub struct TokenClassificationPipeline {
    model_id: String,
    model: BertForTokenClassification,
    tokenizer: Tokenizer,
    labels: Labels,
    aggregation: AggregationStrategy,
    ignore_labels: Vec<String>,
    device: Device,
}

impl TokenClassificationPipeline {
    /// Resolve, download if needed, and load the configured model.
    pub fn from_config(config: &NerConfig) -> crate::Result<Self> {
        let started = Instant::now();
        let model_config = &config.model;
        let model_id = match &model_config.local_path {
            Some(path) => path.display().to_string(),
            None => model_config.model_id.clone(),
        };

        tracing::info!(model_id = %model_id, "Loading token classification model");

        let files = ModelFiles::resolve(model_config)?;
        let (encoder_config, labels) = read_model_config(&files.config)?;

        let max_length = model_config
            .max_seq_length
            .min(encoder_config.max_position_embeddings);
        let tokenizer = load_tokenizer(&files.tokenizer, max_length)?;

        let device = select_device(model_config.device)?;
        let vb = load_weights(&files.weights, &device)?;
        let model = BertForTokenClassification::load(vb, &encoder_config, labels.len())?;

        tracing::info!(
            model_id = %model_id,
            labels = labels.len(),
            max_length,
            device = device_name(&device),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model loaded"
        );

        Ok(Self::new(
            model_id,
            model,
            tokenizer,
            labels,
            &config.pipeline,
            device,
        ))
    }

    /// Assemble a pipeline from already loaded parts.
    pub fn new(
        model_id: impl Into<String>,
        model: BertForTokenClassification,
        tokenizer: Tokenizer,
        labels: Labels,
        pipeline: &PipelineConfig,
        device: Device,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            model,
            tokenizer,
            labels,
            aggregation: pipeline.aggregation,
            ignore_labels: pipeline.ignore_labels.clone(),
            device,
        }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn aggregation(&self) -> AggregationStrategy {
        self.aggregation
    }

    /// Recognize the entities of a single text.
    pub fn recognize(&self, text: &str) -> crate::Result<Vec<Entity>> {
        let encoding = self
            .tokenizer
            .encode_char_offsets(text, true)
            .map_err(MLError::tokenization)?;

        let tokens = encoding.get_special_tokens_mask().iter().filter(|&&m| m == 0).count();
        if tokens == 0 {
            return Ok(Vec::new());
        }

        let probabilities = self.predict(&encoding)?;
        let scores = token_scores(&encoding, probabilities);
        let entities = aggregation::decode(
            text,
            &scores,
            &self.labels,
            self.aggregation,
            &self.ignore_labels,
        )?;

        Ok(entities)
    }

    /// Recognize entities in every text, preserving order.
    pub fn recognize_batch(&self, texts: &[String]) -> crate::Result<Vec<Vec<Entity>>> {
        let started = Instant::now();
        let results = texts
            .iter()
            .map(|text| self.recognize(text))
            .collect::<crate::Result<Vec<_>>>()?;

        tracing::debug!(
            texts = texts.len(),
            entities = results.iter().map(Vec::len).sum::<usize>(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recognized batch"
        );

        Ok(results)
    }

    /// Label probabilities for every position of the encoding.
    fn predict(&self, encoding: &Encoding) -> Result<Vec<Vec<f32>>, MLError> {
        let to_input = |values: &[u32]| {
            Tensor::new(values, &self.device).and_then(|tensor| tensor.unsqueeze(0))
        };
        let inference = |e: candle_core::Error| MLError::inference(e);

        let input_ids = to_input(encoding.get_ids()).map_err(inference)?;
        let token_type_ids = to_input(encoding.get_type_ids()).map_err(inference)?;
        let attention_mask = to_input(encoding.get_attention_mask()).map_err(inference)?;

        let logits = self
            .model
            .forward(&input_ids, &token_type_ids, &attention_mask)
            .map_err(inference)?;

        candle_nn::ops::softmax_last_dim(&logits)
            .and_then(|probabilities| probabilities.squeeze(0))
            .and_then(|probabilities| probabilities.to_dtype(DType::F32))
            .and_then(|probabilities| probabilities.to_vec2::<f32>())
            .map_err(inference)
    }
}

/// Pair each non-special token with its probabilities.
fn token_scores(encoding: &Encoding, probabilities: Vec<Vec<f32>>) -> Vec<TokenScores> {
    let special = encoding.get_special_tokens_mask();
    let tokens = encoding.get_tokens();
    let words = encoding.get_word_ids();
    let offsets = encoding.get_offsets();

    probabilities
        .into_iter()
        .enumerate()
        .filter(|(index, _)| special.get(*index) == Some(&0))
        .filter_map(|(index, probabilities)| {
            let (start, end) = *offsets.get(index)?;
            Some(TokenScores {
                index,
                token: tokens.get(index)?.clone(),
                word: words.get(index).copied().flatten(),
                start,
                end,
                probabilities,
            })
        })
        .collect()
}

impl EntityRecognizer for TokenClassificationPipeline {
    fn recognize_batch(&self, texts: &[String]) -> crate::Result<Vec<Vec<Entity>>> {
        TokenClassificationPipeline::recognize_batch(self, texts)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
