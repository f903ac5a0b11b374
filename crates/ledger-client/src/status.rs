//! Node status detection
//!
//! Probes chain id, head block and sync state.

use alloy_primitives::U64;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::rpc::RpcTransport;

/// Node status detected through probing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    /// Node is reachable and responding
    pub online: bool,

    /// EIP-155 chain id
    pub chain_id: Option<u64>,

    /// Latest block number
    pub block_number: u64,

    /// Node reports it is still syncing
    pub syncing: bool,
}

impl NodeStatus {
    fn offline() -> Self {
        Self {
            online: false,
            chain_id: None,
            block_number: 0,
            syncing: false,
        }
    }

    /// Safe to quote and submit against
    pub fn is_ready(&self) -> bool {
        self.online && !self.syncing
    }
}

/// Detect node status by probing endpoints
pub async fn detect_status(transport: &RpcTransport) -> NodeStatus {
    let block_number = match transport.call::<U64>("eth_blockNumber", json!([])).await {
        Ok(n) => n.to::<u64>(),
        Err(e) => {
            tracing::debug!(url = transport.url(), error = %e, "node offline");
            return NodeStatus::offline();
        }
    };

    let chain_id = transport
        .call::<U64>("eth_chainId", json!([]))
        .await
        .ok()
        .map(|id| id.to::<u64>());

    // eth_syncing returns `false` when synced, otherwise a progress object
    let syncing = transport
        .call::<Value>("eth_syncing", json!([]))
        .await
        .map(|v| is_syncing(&v))
        .unwrap_or(false);

    NodeStatus {
        online: true,
        chain_id,
        block_number,
        syncing,
    }
}

fn is_syncing(value: &Value) -> bool {
    !matches!(value, Value::Bool(false) | Value::Null)
}
