//! reply-gateway server entry point.
//!
//! Starts the Axum HTTP server with the reply endpoints.

use reply_gateway::api;
use reply_gateway::app_state::AppState;
use reply_gateway::config::ReplyConfig;
use reply_gateway::service::ReplyService;
use reply_gateway::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ReplyConfig::from_env()?;

    // Initialize tracing
    telemetry::init(config.log_format).map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        addr = %config.listen_addr,
        store = config.store.backend.name(),
        model = %config.generator.model,
        "starting reply-gateway"
    );

    // Build service layer
    let reply_service = ReplyService::from_config(&config).await?;

    // Build router
    let app = api::app(AppState::new(reply_service));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
