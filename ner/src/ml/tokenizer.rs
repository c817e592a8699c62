//! Tokenizer loading.

use std::path::Path;

use serde::Deserialize;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{PostProcessor, Tokenizer, TruncationParams};

use super::error::{MLError, Result};
use super::hub::TokenizerSource;

const UNK_TOKEN: &str = "[UNK]";
const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";

/// The parts of `tokenizer_config.json` that shape a WordPiece tokenizer.
#[derive(Debug, Deserialize)]
struct WordPieceSettings {
    #[serde(default = "default_lowercase")]
    do_lower_case: bool,
    #[serde(default)]
    strip_accents: Option<bool>,
    #[serde(default = "default_chinese_chars")]
    tokenize_chinese_chars: bool,
}

fn default_lowercase() -> bool {
    true
}

fn default_chinese_chars() -> bool {
    true
}

impl Default for WordPieceSettings {
    fn default() -> Self {
        Self {
            do_lower_case: default_lowercase(),
            strip_accents: None,
            tokenize_chinese_chars: default_chinese_chars(),
        }
    }
}

/// Load the tokenizer and fit it to the model window.
///
/// Inputs longer than `max_length` tokens (special tokens included) are
/// truncated. Padding is disabled; every text is encoded on its own.
pub fn load_tokenizer(source: &TokenizerSource, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = match source {
        TokenizerSource::Json(path) => Tokenizer::from_file(path).map_err(|e| {
            MLError::model_loading(format!("Failed to read {}: {}", path.display(), e))
        })?,
        TokenizerSource::WordPiece { vocab, config } => {
            let settings = match config {
                Some(path) => read_settings(path)?,
                None => WordPieceSettings::default(),
            };
            build_wordpiece(vocab, &settings)?
        }
    };

    let special_tokens = tokenizer
        .get_post_processor()
        .map_or(0, |processor| processor.added_tokens(false));
    if max_length <= special_tokens {
        return Err(MLError::configuration(format!(
            "Token window of {} leaves no room next to {} special tokens",
            max_length, special_tokens
        )));
    }

    tokenizer.with_padding(None);
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| MLError::configuration(format!("Invalid truncation settings: {}", e)))?;

    Ok(tokenizer)
}

fn read_settings(path: &Path) -> Result<WordPieceSettings> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| {
        MLError::configuration(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Rebuild the standard BERT tokenizer from a bare vocabulary.
fn build_wordpiece(vocab: &Path, settings: &WordPieceSettings) -> Result<Tokenizer> {
    let vocab_str = vocab.to_str().ok_or_else(|| {
        MLError::model_loading(format!("Vocabulary path is not UTF-8: {}", vocab.display()))
    })?;

    let model = WordPiece::from_file(vocab_str)
        .unk_token(UNK_TOKEN.to_string())
        .build()
        .map_err(|e| MLError::model_loading(format!("Failed to build WordPiece model: {}", e)))?;

    let mut tokenizer = Tokenizer::new(model);

    let special_id = |token: &str| {
        tokenizer.token_to_id(token).ok_or_else(|| {
            MLError::model_loading(format!("Vocabulary has no {} token", token))
        })
    };
    let cls_id = special_id(CLS_TOKEN)?;
    let sep_id = special_id(SEP_TOKEN)?;

    tokenizer
        .with_normalizer(Some(BertNormalizer::new(
            true,
            settings.tokenize_chinese_chars,
            settings.strip_accents,
            settings.do_lower_case,
        )))
        .with_pre_tokenizer(Some(BertPreTokenizer))
        .with_post_processor(Some(BertProcessing::new(
            (SEP_TOKEN.to_string(), sep_id),
            (CLS_TOKEN.to_string(), cls_id),
        )));

    Ok(tokenizer)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    pub(crate) const VOCAB: &[&str] = &[
        "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "Erik", "bor", "i", "Stock", "##holm", ".",
        "erik", "stock", "Malmö", "malmo",
    ];

    /// Write a small cased WordPiece vocabulary into `dir`.
    pub(crate) fn write_vocab(dir: &Path, lowercase: bool) -> TokenizerSource {
        let vocab = dir.join("vocab.txt");
        std::fs::write(&vocab, VOCAB.join("\n")).unwrap();
        let config = dir.join("tokenizer_config.json");
        std::fs::write(
            &config,
            serde_json::json!({ "do_lower_case": lowercase }).to_string(),
        )
        .unwrap();
        TokenizerSource::WordPiece {
            vocab,
            config: Some(config),
        }
    }

    fn tokens(tokenizer: &Tokenizer, text: &str) -> Vec<String> {
        tokenizer
            .encode_char_offsets(text, true)
            .unwrap()
            .get_tokens()
            .to_vec()
    }

    #[test]
    fn test_wordpiece_fallback_keeps_case() {
        let dir = TempDir::new().unwrap();
        let tokenizer = load_tokenizer(&write_vocab(dir.path(), false), 512).unwrap();

        let encoding = tokenizer.encode_char_offsets("Erik bor i Stockholm.", true).unwrap();
        assert_eq!(
            encoding.get_tokens(),
            &["[CLS]", "Erik", "bor", "i", "Stock", "##holm", ".", "[SEP]"]
        );
        assert_eq!(encoding.get_offsets()[4], (11, 16));
        assert_eq!(encoding.get_offsets()[5], (16, 20));
        assert_eq!(encoding.get_special_tokens_mask(), &[1, 0, 0, 0, 0, 0, 0, 1]);
        // Both pieces of "Stockholm" belong to the same word
        assert_eq!(encoding.get_word_ids()[4], encoding.get_word_ids()[5]);
    }

    #[test]
    fn test_wordpiece_fallback_lowercases() {
        let dir = TempDir::new().unwrap();
        let tokenizer = load_tokenizer(&write_vocab(dir.path(), true), 512).unwrap();
        assert_eq!(tokens(&tokenizer, "Erik"), vec!["[CLS]", "erik", "[SEP]"]);
    }

    #[test]
    fn test_offsets_are_characters() {
        let dir = TempDir::new().unwrap();
        let tokenizer = load_tokenizer(&write_vocab(dir.path(), false), 512).unwrap();

        let encoding = tokenizer.encode_char_offsets("Malmö bor", true).unwrap();
        // "ö" is two bytes but one character
        assert_eq!(encoding.get_offsets()[1], (0, 5));
        assert_eq!(encoding.get_offsets()[2], (6, 9));
    }

    #[test]
    fn test_truncation() {
        let dir = TempDir::new().unwrap();
        let tokenizer = load_tokenizer(&write_vocab(dir.path(), false), 6).unwrap();

        let encoding = tokenizer
            .encode_char_offsets("Erik bor i Stockholm. Erik bor i Stockholm.", true)
            .unwrap();
        assert_eq!(encoding.len(), 6);
        assert_eq!(encoding.get_tokens().first().map(String::as_str), Some("[CLS]"));
        assert_eq!(encoding.get_tokens().last().map(String::as_str), Some("[SEP]"));
    }

    #[test]
    fn test_window_must_fit_special_tokens() {
        let dir = TempDir::new().unwrap();
        let source = write_vocab(dir.path(), false);

        for max_length in [0, 1, 2] {
            assert!(matches!(
                load_tokenizer(&source, max_length),
                Err(MLError::Configuration(_))
            ));
        }

        let tokenizer = load_tokenizer(&source, 3).unwrap();
        assert_eq!(tokens(&tokenizer, "Erik bor i Stockholm."), vec!["[CLS]", "Erik", "[SEP]"]);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let dir = TempDir::new().unwrap();
        let tokenizer = load_tokenizer(&write_vocab(dir.path(), false), 512).unwrap();
        assert_eq!(tokens(&tokenizer, "Göteborg"), vec!["[CLS]", "[UNK]", "[SEP]"]);
    }

    #[test]
    fn test_missing_tokenizer_json() {
        let source = TokenizerSource::Json(PathBuf::from("/no/such/tokenizer.json"));
        assert!(matches!(
            load_tokenizer(&source, 512),
            Err(MLError::ModelLoading(_))
        ));
    }

    #[test]
    fn test_vocab_without_special_tokens() {
        let dir = TempDir::new().unwrap();
        let vocab = dir.path().join("vocab.txt");
        std::fs::write(&vocab, "[UNK]\nhej\n").unwrap();
        let source = TokenizerSource::WordPiece {
            vocab,
            config: None,
        };
        assert!(matches!(
            load_tokenizer(&source, 512),
            Err(MLError::ModelLoading(_))
        ));
    }
}
