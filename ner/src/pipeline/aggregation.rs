//! Decoding per-token label distributions into entities.
//!
//! The strategies follow the token-classification conventions of the common
//! transformer pipelines. Tags may carry a BIO prefix (`B-PER`, `I-PER`); a bare
//! tag such as `PER` is treated as a continuation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Entity, Position};
use crate::ml::{Labels, MLError, Result};

/// How token predictions are merged into entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationStrategy {
    /// One entity per token, labelled with the raw tag
    #[default]
    None,

    /// Consecutive tokens with the same entity type form one entity
    Simple,

    /// Words take the label of their first sub-word token, then group as `Simple`
    First,

    /// Words take the label of their averaged token distribution, then group as `Simple`
    Average,

    /// Words take the label of their highest-scoring token, then group as `Simple`
    Max,
}

impl AggregationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationStrategy::None => "none",
            AggregationStrategy::Simple => "simple",
            AggregationStrategy::First => "first",
            AggregationStrategy::Average => "average",
            AggregationStrategy::Max => "max",
        }
    }
}

impl fmt::Display for AggregationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(AggregationStrategy::None),
            "simple" => Ok(AggregationStrategy::Simple),
            "first" => Ok(AggregationStrategy::First),
            "average" => Ok(AggregationStrategy::Average),
            "max" => Ok(AggregationStrategy::Max),
            other => Err(format!(
                "unknown aggregation '{}', expected one of: none, simple, first, average, max",
                other
            )),
        }
    }
}

/// Model output for one non-special token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenScores {
    /// Position in the encoded sequence
    pub index: usize,
    /// Token string as produced by the tokenizer (`##holm`)
    pub token: String,
    /// Word the token belongs to, if the tokenizer tracks words
    pub word: Option<u32>,
    /// Character offsets into the input
    pub start: usize,
    pub end: usize,
    /// Softmax over the label set
    pub probabilities: Vec<f32>,
}

/// A labelled token or word before grouping.
#[derive(Debug)]
struct Tagged<'a> {
    label: &'a str,
    score: f32,
    index: usize,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bio {
    Begin,
    Inside,
}

/// Decode the token predictions of `text` into entities.
///
/// Entities whose label (the raw tag for `None`, the entity type otherwise)
/// is in `ignore_labels` are dropped.
pub fn decode(
    text: &str,
    tokens: &[TokenScores],
    labels: &Labels,
    strategy: AggregationStrategy,
    ignore_labels: &[String],
) -> Result<Vec<Entity>> {
    for token in tokens {
        check_scores(token, labels)?;
    }

    let ignored = |label: &str| ignore_labels.iter().any(|ignored| ignored == label);

    if strategy == AggregationStrategy::None {
        let mut entities = Vec::with_capacity(tokens.len());
        for token in tokens {
            let tagged = tag(labels, &token.probabilities, token, token)?;
            if ignored(tagged.label) {
                continue;
            }
            entities.push(Entity {
                text: token.token.clone(),
                label: tagged.label.to_string(),
                score: tagged.score,
                position: Position {
                    index: tagged.index,
                    start: tagged.start,
                    end: tagged.end,
                },
            });
        }
        return Ok(entities);
    }

    let tagged = match strategy {
        AggregationStrategy::Simple => tokens
            .iter()
            .map(|token| tag(labels, &token.probabilities, token, token))
            .collect::<Result<Vec<_>>>()?,
        _ => words(tokens)
            .into_iter()
            .map(|word| tag_word(labels, strategy, word))
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(group(text, tagged)
        .into_iter()
        .filter(|entity| !ignored(&entity.label))
        .collect())
}

fn check_scores(token: &TokenScores, labels: &Labels) -> Result<()> {
    if token.probabilities.len() != labels.len() {
        return Err(MLError::inference(format!(
            "model produced {} scores for {} labels at token {}",
            token.probabilities.len(),
            labels.len(),
            token.index
        )));
    }
    if token.probabilities.iter().any(|p| !p.is_finite()) {
        return Err(MLError::inference(format!(
            "non-finite score at token {} ('{}')",
            token.index, token.token
        )));
    }
    Ok(())
}

/// Index and value of the largest probability; the first one wins ties.
fn argmax(probabilities: &[f32]) -> Option<(usize, f32)> {
    probabilities
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (id, p)| match best {
            Some((_, best_p)) if best_p >= p => best,
            _ => Some((id, p)),
        })
}

fn tag<'a>(
    labels: &'a Labels,
    probabilities: &[f32],
    first: &TokenScores,
    last: &TokenScores,
) -> Result<Tagged<'a>> {
    let (id, score) = argmax(probabilities)
        .ok_or_else(|| MLError::inference(format!("no scores at token {}", first.index)))?;
    let label = labels
        .get(id)
        .ok_or_else(|| MLError::inference(format!("label id {} has no name", id)))?;
    Ok(Tagged {
        label,
        score,
        index: first.index,
        start: first.start,
        end: last.end,
    })
}

/// Split tokens into words. A token continues the previous word when both
/// carry the same word id.
fn words(tokens: &[TokenScores]) -> Vec<&[TokenScores]> {
    let mut words = Vec::new();
    let mut start = 0;
    for i in 1..tokens.len() {
        let same_word = tokens[i].word.is_some() && tokens[i].word == tokens[i - 1].word;
        if !same_word {
            words.push(&tokens[start..i]);
            start = i;
        }
    }
    if start < tokens.len() {
        words.push(&tokens[start..]);
    }
    words
}

fn tag_word<'a>(
    labels: &'a Labels,
    strategy: AggregationStrategy,
    word: &[TokenScores],
) -> Result<Tagged<'a>> {
    let (Some(first), Some(last)) = (word.first(), word.last()) else {
        return Err(MLError::inference("empty word"));
    };

    match strategy {
        AggregationStrategy::Max => {
            let best = word
                .iter()
                .filter_map(|token| argmax(&token.probabilities).map(|(_, p)| (token, p)))
                .fold(None, |best: Option<(&TokenScores, f32)>, (token, p)| match best {
                    Some((_, best_p)) if best_p >= p => best,
                    _ => Some((token, p)),
                })
                .map_or(first, |(token, _)| token);
            tag(labels, &best.probabilities, first, last)
        }
        AggregationStrategy::Average => {
            let mut averaged = vec![0.0f32; labels.len()];
            for token in word {
                for (sum, p) in averaged.iter_mut().zip(&token.probabilities) {
                    *sum += p;
                }
            }
            let count = word.len() as f32;
            averaged.iter_mut().for_each(|sum| *sum /= count);
            tag(labels, &averaged, first, last)
        }
        _ => tag(labels, &first.probabilities, first, last),
    }
}

fn split_tag(label: &str) -> (Bio, &str) {
    if let Some(kind) = label.strip_prefix("B-") {
        (Bio::Begin, kind)
    } else if let Some(kind) = label.strip_prefix("I-") {
        (Bio::Inside, kind)
    } else {
        (Bio::Inside, label)
    }
}

/// Merge consecutive items of the same entity type; a `B-` tag always opens a new entity.
fn group(text: &str, tagged: Vec<Tagged<'_>>) -> Vec<Entity> {
    let mut groups: Vec<Vec<Tagged<'_>>> = Vec::new();
    for item in tagged {
        let (bio, kind) = split_tag(item.label);
        match groups.last_mut() {
            Some(current)
                if bio != Bio::Begin
                    && current.last().map(|last| split_tag(last.label).1) == Some(kind) =>
            {
                current.push(item)
            }
            _ => groups.push(vec![item]),
        }
    }

    groups
        .into_iter()
        .filter_map(|members| {
            let first = members.first()?;
            let last = members.last()?;
            let score = members.iter().map(|m| m.score).sum::<f32>() / members.len() as f32;
            Some(Entity {
                text: char_slice(text, first.start, last.end),
                label: split_tag(first.label).1.to_string(),
                score,
                position: Position {
                    index: first.index,
                    start: first.start,
                    end: last.end,
                },
            })
        })
        .collect()
}

/// Substring by character offsets.
fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
