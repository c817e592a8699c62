//! Data Transfer Objects for the API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use ner::pipeline::{Entity, Position};

/// A recognized entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "text": "Stockholm",
    "label": "LOC",
    "score": 0.9987,
    "position": {"index": 4, "start": 11, "end": 20}
}))]
pub struct EntityDto {
    /// Surface text: the token for per-token output, the covered span when grouped
    pub text: String,

    /// Entity label as defined by the model
    pub label: String,

    /// Confidence in [0, 1]
    pub score: f32,

    /// Where the entity sits in its input
    pub position: PositionDto,
}

impl From<Entity> for EntityDto {
    fn from(entity: Entity) -> Self {
        Self {
            text: entity.text,
            label: entity.label,
            score: entity.score,
            position: entity.position.into(),
        }
    }
}

/// Entity location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PositionDto {
    /// Index of the (first) token in the encoded sequence, special tokens included
    pub index: usize,

    /// Start character offset
    pub start: usize,

    /// End character offset, exclusive
    pub end: usize,
}

impl From<Position> for PositionDto {
    fn from(position: Position) -> Self {
        Self {
            index: position.index,
            start: position.start,
            end: position.end,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` while the server is serving
    #[schema(example = "ok")]
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
