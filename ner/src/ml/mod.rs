//! Model loading and inference plumbing.
//!
//! Everything needed to turn a pretrained token-classification checkpoint into
//! something the [`pipeline`](crate::pipeline) can run:
//!
//! - [`hub`]: resolves the model files from a local directory or the Hugging Face hub
//! - [`tokenizer`]: loads `tokenizer.json` or rebuilds a BERT WordPiece tokenizer
//! - [`model`]: the candle BERT encoder with its classification head, plus the label map
//! - [`device`]: picks the device the weights live on

pub mod device;
pub mod error;
pub mod hub;
pub mod model;
pub mod tokenizer;

pub use device::select_device;
pub use error::{MLError, Result};
pub use hub::{ModelFiles, TokenizerSource, WeightsFile};
pub use model::{BertForTokenClassification, Labels};
pub use tokenizer::load_tokenizer;
