//! HTTP surface: router construction and server bootstrap.

pub mod routes;

pub use routes::{AppState, ClassifyResponse, triage_routes};

use std::sync::Arc;

use tracing::info;

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::inference::{HfInferenceClient, InferenceBackend};
use crate::pipeline::ClassificationPipeline;

/// Build the pipeline from configuration and serve it until Ctrl-C.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let addr = config.bind_addr()?;

    let http = reqwest::Client::new();
    let backend: Arc<dyn InferenceBackend> =
        Arc::new(HfInferenceClient::new(http, &config.inference));
    let pipeline = Arc::new(ClassificationPipeline::from_config(&config, backend)?);
    let app = triage_routes(pipeline);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Classification server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Classification server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
