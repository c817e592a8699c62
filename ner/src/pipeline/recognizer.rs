use super::Entity;
use crate::Result;

/// Something that recognizes entities in a batch of texts.
///
/// Implementations are blocking and CPU bound; async callers should run them
/// on a blocking thread. The output has one list per input, in input order.
pub trait EntityRecognizer: Send + Sync {
    fn recognize_batch(&self, texts: &[String]) -> Result<Vec<Vec<Entity>>>;

    /// Identifier of the loaded model.
    fn model_id(&self) -> &str;
}
