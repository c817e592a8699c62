use std::sync::Arc;

use anyhow::{Context, Result};
use ner::logging::trace_requests;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

use ner_server::cli::CliArgs;
use ner_server::config::ServerConfig;
use ner_server::state::load_pipeline;
use ner_server::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli_args = CliArgs::parse();

    // Load configuration from CLI arguments, config file and environment variables
    let server_config = ServerConfig::from_cli_and_env(cli_args)?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = ner::logging::init(&server_config.ner.logging)
        .context("Failed to initialize logging")?;

    info!("Starting NER server v{}", ner::VERSION);

    // The model must be ready before the listener binds
    let pipeline = load_pipeline(&server_config.ner).await?;

    info!(
        model_id = %server_config.ner.model.model_id,
        labels = pipeline.labels().len(),
        aggregation = %pipeline.aggregation(),
        "Model loaded"
    );

    let app_state = Arc::new(AppState::new(Arc::new(pipeline), server_config.clone()));

    // Create the router with all API endpoints
    let app = create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(trace_requests())
            .layer(CorsLayer::permissive()),
    );

    // Start the server
    let listener = TcpListener::bind((server_config.host.as_str(), server_config.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                server_config.host, server_config.port
            )
        })?;
    let addr = listener.local_addr()?;

    info!("Server listening on {}", addr);
    info!("API documentation available at http://{}/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
