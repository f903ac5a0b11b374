//! Node status endpoint

use axum::{extract::State, routing::get, Json, Router};

use crate::dto::NodeStatusResponse;
use crate::AppState;

/// Create node routes
pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(get_status))
}

/// GET /node/status - Probe the configured node
pub async fn get_status(State(state): State<AppState>) -> Json<NodeStatusResponse> {
    let config = state.config();
    let status = state.ledger().status().await;

    Json(NodeStatusResponse {
        connected: status.online,
        url: config.node.url.clone(),
        network: config.network.as_str().to_string(),
        chain_id: status.chain_id,
        block_number: status.block_number,
        syncing: status.syncing,
    })
}
