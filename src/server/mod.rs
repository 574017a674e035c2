//! HTTP front of the pipeline service.
//!
//! ```text
//! ┌──────────┐  POST /api/generate-pipeline   ┌─────────────────────────────┐
//! │  Client  │ ─────────────────────────────> │ api.rs  (handlers, ApiError)│
//! │  (CLI)   │ <───────────────────────────── │   └─ PipelineGenerator      │
//! └──────────┘  {stages, summary, ...}        │        └─ LanguageModel     │
//!                                             └─────────────────────────────┘
//! ```
//!
//! `mod.rs` owns router assembly (CORS, request tracing) and the listener
//! lifecycle; `api.rs` owns the routes.

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::PipegenConfig;
use crate::generator::PipelineGenerator;
use crate::llm::{LanguageModel, OpenAiChatModel};

pub use api::{AppState, SharedState};

/// Configuration for the service listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_config(&PipegenConfig::default())
    }
}

impl ServerConfig {
    pub fn from_config(config: &PipegenConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            allowed_origins: config.cors_origins(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Browser origins may call the API with credentials; methods and headers
/// are mirrored from the preflight request.
fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the full application router.
pub fn build_router(state: SharedState, allowed_origins: Vec<HeaderValue>) -> Router {
    api::api_router()
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

pub fn app_state(model: Arc<dyn LanguageModel>) -> SharedState {
    Arc::new(AppState {
        generator: PipelineGenerator::new(model),
    })
}

/// Serve `app` on an already-bound listener until ctrl-c.
pub async fn serve(listener: tokio::net::TcpListener, app: Router) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

/// Start the service with the OpenAI-compatible model from `config`.
pub async fn start_server(config: &PipegenConfig, server: ServerConfig) -> Result<()> {
    if config.llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; generation requests will fail until it is");
    }

    let llm = OpenAiChatModel::from_config(&config.llm);
    let model_name = llm.model().to_string();
    let app = build_router(app_state(Arc::new(llm)), server.allowed_origins.clone());

    let addr = server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr: SocketAddr = listener.local_addr()?;
    tracing::info!(
        addr = %local_addr,
        model = %model_name,
        "Test Pipeline Generator API listening"
    );

    serve(listener, app).await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
