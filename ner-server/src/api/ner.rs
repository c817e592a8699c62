//! Entity recognition endpoint

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use tracing::debug;

use crate::{
    api::dto::EntityDto,
    error::{ServerError, ServerResult},
    state::AppState,
};

/// Recognize entities in a batch of texts
///
/// The response holds one list per input text, in input order.
#[utoipa::path(
    post,
    path = "/ner",
    tag = "ner",
    request_body(content = Vec<String>, description = "Texts to analyse", example = json!(["Erik bor i Stockholm."])),
    responses(
        (status = 200, description = "Entities per input text", body = Vec<Vec<EntityDto>>),
        (status = 400, description = "Malformed JSON", body = crate::error::ErrorResponse),
        (status = 413, description = "Request body too large", body = crate::error::ErrorResponse),
        (status = 415, description = "Body is not declared as JSON", body = crate::error::ErrorResponse),
        (status = 422, description = "Body is not an array of strings", body = crate::error::ErrorResponse),
        (status = 500, description = "Inference failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn recognize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> ServerResult<Json<Vec<Vec<EntityDto>>>> {
    let Json(texts) = payload?;
    if texts.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let started = Instant::now();
    let count = texts.len();
    let recognizer = Arc::clone(&state.recognizer);

    let results = tokio::task::spawn_blocking(move || recognizer.recognize_batch(&texts))
        .await
        .map_err(|e| ServerError::Internal(format!("Inference task failed: {}", e)))??;

    if results.len() != count {
        return Err(ServerError::Internal(format!(
            "Recognizer returned {} results for {} texts",
            results.len(),
            count
        )));
    }

    debug!(
        texts = count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Recognized entities"
    );

    Ok(Json(
        results
            .into_iter()
            .map(|entities| entities.into_iter().map(EntityDto::from).collect())
            .collect(),
    ))
}
