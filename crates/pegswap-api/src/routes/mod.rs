//! API route handlers

pub mod health;
pub mod node;
pub mod swap;

use axum::{routing::get, Router};

use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/node", node::router())
        .nest("/swap", swap::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use peg_core::{AppConfig, NodeConfig};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// State pointed at a port nothing listens on
    fn offline_state() -> AppState {
        let config = AppConfig {
            node: NodeConfig {
                url: "http://127.0.0.1:9".to_string(),
                request_timeout_secs: 2,
                ..NodeConfig::default()
            },
            ..AppConfig::default()
        };
        AppState::new(config).unwrap()
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = create_router(offline_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_node_status_offline() {
        let (status, body) = send(get("/node/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connected"], false);
        assert_eq!(body["network"], "devnet");
    }

    #[tokio::test]
    async fn test_mint_quote_needs_no_ledger() {
        let (status, body) = send(post(
            "/swap/quote",
            json!({ "direction": "mint", "amount": "100" }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["amount_in"], "100000000000000000000");
        assert_eq!(body["net_out"], "100000000");
        assert_eq!(body["fee"], "0");
        assert_eq!(body["net_out_display"], "100");
    }

    #[tokio::test]
    async fn test_redeem_quote_without_node_is_unavailable() {
        let (status, body) = send(post(
            "/swap/quote",
            json!({ "direction": "redeem", "amount": "100" }),
        ))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "state_unavailable");
    }

    #[tokio::test]
    async fn test_invalid_direction() {
        let (status, body) = send(post(
            "/swap/quote",
            json!({ "direction": "sideways", "amount": "1" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_direction");
    }

    #[tokio::test]
    async fn test_invalid_amount_never_reaches_ledger() {
        for amount in ["", "-5", "1e6", "0.0000001"] {
            let (status, body) = send(post(
                "/swap/submit",
                json!({
                    "direction": "redeem",
                    "amount": amount,
                    "account": "0x00000000000000000000000000000000000000a1",
                }),
            ))
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "amount {amount:?}");
            assert_eq!(body["code"], "invalid_amount");
        }
    }

    #[tokio::test]
    async fn test_invalid_account() {
        let (status, body) = send(post(
            "/swap/preview",
            json!({ "direction": "mint", "amount": "1", "account": "alice" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_account");

        let (status, _) = send(get("/swap/state?account=0x123")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
