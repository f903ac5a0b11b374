//! ledger-client: JSON-RPC access to the token ledger and the swap controller
//!
//! The swap service never holds balances or fee rates of its own; every value
//! comes from these contracts. This crate provides:
//!
//! - [`TokenLedger`] and [`SwapController`], the two contract seams
//! - [`RpcLedger`] / [`RpcController`], their HTTP JSON-RPC implementations
//! - receipt polling and a node status probe

pub mod abi;
pub mod client;
pub mod rpc;
pub mod status;

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use peg_core::{BlockNumber, LedgerError};
use serde::{Deserialize, Serialize};

pub use client::{RpcController, RpcLedger};
pub use status::NodeStatus;

/// Result type for ledger client operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Mined transaction receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: BlockNumber,
    pub gas_used: Option<u64>,
}

/// Controller-side quote for a redeem-direction swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemPreview {
    pub net_out: U256,
    pub fee: U256,
    pub gross_out: U256,
}

/// Waits for submitted transactions to be mined
#[async_trait]
pub trait ReceiptWatcher: Send + Sync {
    /// Resolve once `tx` is included. A reverted transaction is an error.
    async fn wait_for_receipt(&self, tx: TxHash) -> Result<Receipt>;
}

/// ERC-20 style token ledger
#[async_trait]
pub trait TokenLedger: ReceiptWatcher {
    async fn decimals(&self, asset: Address) -> Result<u8>;

    async fn balance_of(&self, asset: Address, account: Address) -> Result<U256>;

    async fn allowance(&self, asset: Address, owner: Address, spender: Address) -> Result<U256>;

    /// Submit `approve(spender, amount)` from `owner`; returns once the node accepted it
    async fn approve(
        &self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash>;
}

/// Peg/swap controller
#[async_trait]
pub trait SwapController: ReceiptWatcher {
    /// Current redeem-direction fee in basis points, unvalidated
    async fn swap_fee_bps(&self) -> Result<U256>;

    async fn preview_swap_redeem_like(&self, amount_in: U256) -> Result<RedeemPreview>;

    async fn swap_mint_like(&self, from: Address, amount_in: U256) -> Result<TxHash>;

    async fn swap_redeem_like(&self, from: Address, amount_in: U256) -> Result<TxHash>;

    /// Address users grant allowance to
    fn address(&self) -> Address;
}
