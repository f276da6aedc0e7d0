use crate::app::router::build_router;
use crate::config::ProxyConfig;
use crate::core::proxy::ProxyEngine;
use crate::utils::error::Result;
use crate::utils::redact::mask_secret;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Binds the configured address and serves until Ctrl+C.
pub async fn serve(config: &ProxyConfig) -> Result<()> {
    let engine = Arc::new(ProxyEngine::from_config(config)?);
    let app = build_router(engine);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("🚀 Trademark proxy running at http://{}", addr);
    tracing::info!(
        "Using upstream {} as {} (password {})",
        config.upstream.base_url,
        config.upstream.username,
        mask_secret(&config.upstream.password)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
