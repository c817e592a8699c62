//! API implementation for the NER HTTP server

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use http::{HeaderValue, header};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod dto;
pub mod ner;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(health_check, ner::recognize),
    components(schemas(
        dto::EntityDto,
        dto::PositionDto,
        dto::HealthResponse,
        crate::error::ErrorResponse,
    )),
    tags(
        (name = "health", description = "Liveness checks"),
        (name = "ner", description = "Named entity recognition"),
    ),
    info(
        title = "NER Service API",
        version = "1.0.0",
        description = "Named entity recognition over a pretrained BERT token-classification model. Send a JSON array of strings, receive one list of entities per string.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

/// Create the main router with all API endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_request_size = state.config.max_request_size;

    let api_router = Router::new()
        .route("/health", get(health_check))
        .route("/ner", post(ner::recognize))
        .layer(DefaultBodyLimit::max(max_request_size))
        .with_state(state);

    let swagger_router = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    api_router.merge(swagger_router)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "The model is loaded and the server is serving", body = dto::HealthResponse,
            headers(("cache-control" = String, description = "Always no-cache")))
    )
)]
pub async fn health_check() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))],
        Json(dto::HealthResponse::ok()),
    )
}
