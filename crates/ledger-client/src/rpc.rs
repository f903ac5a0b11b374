//! JSON-RPC transport
//!
//! Thin request/response layer over HTTP. Every request is bounded by the
//! configured timeout so a stalled node surfaces as an error instead of a hang.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use peg_core::{LedgerError, NodeConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorObject {
    fn into_ledger_error(self) -> LedgerError {
        LedgerError::Rpc {
            code: self.code,
            message: self.message,
            data: self.data.as_ref().and_then(revert_data),
        }
    }
}

/// Nodes report revert data either as a bare hex string or nested under `data`.
fn revert_data(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.starts_with("0x") => Some(s.clone()),
        Value::Object(map) => map.get("data").and_then(revert_data),
        _ => None,
    }
}

/// HTTP JSON-RPC transport
#[derive(Debug)]
pub struct RpcTransport {
    http: reqwest::Client,
    url: String,
    request_timeout: Duration,
    next_id: AtomicU64,
}

impl RpcTransport {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one JSON-RPC call and decode its `result`.
    ///
    /// A missing or null `result` decodes as JSON `null`, so `Option<T>` targets
    /// yield `None` for pending lookups such as receipts.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        tracing::trace!(method, id = request.id, "rpc request");

        let send = self.http.post(&self.url).json(&request).send();
        let response = tokio::time::timeout(self.request_timeout, send)
            .await
            .map_err(|_| LedgerError::Timeout {
                what: format!(
                    "{} after {}s",
                    method,
                    self.request_timeout.as_secs()
                ),
            })?
            .map_err(|e| LedgerError::Unreachable {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::ParseError(format!("{}: {}", method, e)))?;

        decode_response(method, body)
    }
}

fn decode_response<T: DeserializeOwned>(method: &str, body: RpcResponse) -> Result<T> {
    if let Some(error) = body.error {
        return Err(error.into_ledger_error());
    }
    let value = body.result.unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| LedgerError::ParseError(format!("{}: {}", method, e)))
}
