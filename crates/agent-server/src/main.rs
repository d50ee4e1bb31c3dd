//! Car sales agent HTTP server
//!
//! Axum-based server exposing the sales assistant as a REST API. A chat UI
//! can be served from the static directory.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::provider::GenerationOptions;
use agent_core::{AgentConfig, LlmProvider};
use agent_runtime::{GeminiConfig, GeminiProvider};
use car_sales::search::{SearchClient, TavilyClient, TavilyConfig};
use car_sales::{Catalog, SalesToolKind, CAR_SALES_PROMPT};

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("✗ {}", e);
            tracing::error!("  Set GOOGLE_API_KEY and TAVILY_API_KEY in .env");
            eprintln!("Error: {}", e);
            return Err(e.into());
        }
    };

    // Initialize model service
    let provider: Arc<dyn LlmProvider> =
        Arc::new(GeminiProvider::from_config(GeminiConfig::new(&config.google_api_key))?);

    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to Gemini ({})", config.gemini_model),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Gemini not reachable - chat turns will report errors");
        }
    }

    // Initialize search service
    let search: Arc<dyn SearchClient> =
        Arc::new(TavilyClient::from_config(TavilyConfig::new(&config.tavily_api_key))?);

    let catalog = Arc::new(Catalog::default_stock());
    tracing::info!("Loaded {} cars into stock", catalog.len());

    tracing::info!("Registered {} tools:", SalesToolKind::ALL.len());
    for kind in SalesToolKind::ALL {
        tracing::info!("  • {}", kind);
    }

    let agent_config = AgentConfig {
        system_prompt: CAR_SALES_PROMPT.into(),
        generation: GenerationOptions {
            model: config.gemini_model.clone(),
            temperature: config.temperature,
            ..Default::default()
        },
        ..Default::default()
    };

    // Build application state
    let state = AppState::new(provider, search, catalog, agent_config)
        .with_idle_timeout(config.session_idle_timeout);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router; static files for the chat UI are the fallback
    let app = handlers::router(state)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚗 car sales agent running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                     - Health check");
    tracing::info!("  GET    /api/tools                  - List sales tools");
    tracing::info!("  POST   /api/sessions               - Start a session");
    tracing::info!("  GET    /api/sessions/{{id}}          - Session transcript");
    tracing::info!("  DELETE /api/sessions/{{id}}          - End a session");
    tracing::info!("  PUT    /api/sessions/{{id}}/contact  - Update contact form");
    tracing::info!("  POST   /api/chat                   - Send message");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
