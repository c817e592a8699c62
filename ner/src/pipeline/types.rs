use serde::{Deserialize, Serialize};

/// A recognized entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Surface text: the token itself for per-token output, the covered input span otherwise
    pub text: String,
    /// Label as emitted by the model, or the entity type once tokens are grouped
    pub label: String,
    /// Softmax probability, averaged over grouped tokens
    pub score: f32,
    pub position: Position,
}

/// Where an entity sits in its input.
///
/// `start` and `end` are character offsets, end exclusive. `index` is the
/// position of the (first) token in the encoded sequence, special tokens included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}
