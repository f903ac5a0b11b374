//! RPC-backed contract handles

use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy_primitives::{Address, Bytes, TxHash, U256, U64};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use peg_core::{LedgerError, NodeConfig};
use serde::Deserialize;
use serde_json::json;

use crate::abi::{IStableController, IERC20};
use crate::rpc::RpcTransport;
use crate::status::{detect_status, NodeStatus};
use crate::{Receipt, ReceiptWatcher, RedeemPreview, Result, SwapController, TokenLedger};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: TxHash,
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    gas_used: Option<U64>,
}

/// Token ledger access over JSON-RPC
#[derive(Clone)]
pub struct RpcLedger {
    transport: Arc<RpcTransport>,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl RpcLedger {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            transport: Arc::new(RpcTransport::new(config)),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
        }
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }

    /// Handle to the controller at `address`, sharing this connection
    pub fn controller(&self, address: Address) -> RpcController {
        RpcController {
            ledger: self.clone(),
            address,
        }
    }

    /// Probe the node; never fails, offline nodes report `online = false`
    pub async fn status(&self) -> NodeStatus {
        detect_status(&self.transport).await
    }

    /// Read-only contract call against the latest block
    async fn eth_call<C: SolCall>(&self, to: Address, call: &C) -> Result<C::Return> {
        let data = Bytes::from(call.abi_encode());
        let raw: Bytes = self
            .transport
            .call("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await?;
        C::abi_decode_returns(&raw).map_err(|e| LedgerError::Abi(e.to_string()))
    }

    /// Estimate then submit a state-changing call from `from`
    async fn send<C: SolCall>(&self, from: Address, to: Address, call: &C) -> Result<TxHash> {
        let data = Bytes::from(call.abi_encode());
        let tx = json!({ "from": from, "to": to, "data": data });

        let gas: U256 = self
            .transport
            .call("eth_estimateGas", json!([tx.clone()]))
            .await
            .map_err(LedgerError::estimation)?;

        let mut tx = tx;
        tx["gas"] = json!(gas);
        let hash: TxHash = self.transport.call("eth_sendTransaction", json!([tx])).await?;

        tracing::debug!(tx = %hash, %from, %to, gas = %gas, "transaction submitted");
        Ok(hash)
    }
}

/// Outcome of one receipt lookup; `None` while the transaction is still pending
fn settle(tx: TxHash, raw: Option<RawReceipt>) -> Option<Result<Receipt>> {
    let raw = raw?;
    // Some nodes return a receipt before the block number is filled in
    let block = raw.block_number?;
    if raw.status == Some(U64::ZERO) {
        return Some(Err(LedgerError::Reverted { tx }));
    }
    Some(Ok(Receipt {
        tx_hash: raw.transaction_hash,
        block_number: block.to::<u64>(),
        gas_used: raw.gas_used.map(|g| g.to::<u64>()),
    }))
}

#[async_trait]
impl ReceiptWatcher for RpcLedger {
    async fn wait_for_receipt(&self, tx: TxHash) -> Result<Receipt> {
        let deadline = Instant::now() + self.receipt_timeout;

        loop {
            let raw: Option<RawReceipt> = self
                .transport
                .call("eth_getTransactionReceipt", json!([tx]))
                .await?;

            if let Some(outcome) = settle(tx, raw) {
                return outcome;
            }

            if Instant::now() >= deadline {
                return Err(LedgerError::Timeout {
                    what: format!("receipt of {}", tx),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl TokenLedger for RpcLedger {
    async fn decimals(&self, asset: Address) -> Result<u8> {
        self.eth_call(asset, &IERC20::decimalsCall {}).await
    }

    async fn balance_of(&self, asset: Address, account: Address) -> Result<U256> {
        self.eth_call(asset, &IERC20::balanceOfCall { account }).await
    }

    async fn allowance(&self, asset: Address, owner: Address, spender: Address) -> Result<U256> {
        self.eth_call(asset, &IERC20::allowanceCall { owner, spender })
            .await
    }

    async fn approve(
        &self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash> {
        self.send(owner, asset, &IERC20::approveCall { spender, amount })
            .await
    }
}

/// Controller access over JSON-RPC
#[derive(Clone)]
pub struct RpcController {
    ledger: RpcLedger,
    address: Address,
}

#[async_trait]
impl ReceiptWatcher for RpcController {
    async fn wait_for_receipt(&self, tx: TxHash) -> Result<Receipt> {
        self.ledger.wait_for_receipt(tx).await
    }
}

#[async_trait]
impl SwapController for RpcController {
    async fn swap_fee_bps(&self) -> Result<U256> {
        self.ledger
            .eth_call(self.address, &IStableController::swapFeeBpsCall {})
            .await
    }

    async fn preview_swap_redeem_like(&self, amount_in: U256) -> Result<RedeemPreview> {
        let ret = self
            .ledger
            .eth_call(
                self.address,
                &IStableController::previewSwapRedeemLikeCall { amountIn: amount_in },
            )
            .await?;
        Ok(RedeemPreview {
            net_out: ret.netOut,
            fee: ret.fee,
            gross_out: ret.grossOut,
        })
    }

    async fn swap_mint_like(&self, from: Address, amount_in: U256) -> Result<TxHash> {
        self.ledger
            .send(
                from,
                self.address,
                &IStableController::swapMintLikeCall { amountIn: amount_in },
            )
            .await
    }

    async fn swap_redeem_like(&self, from: Address, amount_in: U256) -> Result<TxHash> {
        self.ledger
            .send(
                from,
                self.address,
                &IStableController::swapRedeemLikeCall { amountIn: amount_in },
            )
            .await
    }

    fn address(&self) -> Address {
        self.address
    }
}
