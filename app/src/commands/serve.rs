//! HTTP API command

use peg_core::AppConfig;
use pegswap_api::{start_server, AppState};

/// Serve the API until Ctrl-C
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let port = config.api_port;
    let state = AppState::new(config)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown requested");
    };

    start_server(state, port, shutdown).await?;
    Ok(())
}
