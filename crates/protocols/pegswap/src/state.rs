//! Peg Swap State
//!
//! Read-only snapshots built from ledger reads. None of these survive a
//! submission; callers fetch fresh ones after every state-changing call.

use alloy_primitives::{Address, TxHash, U256};
use peg_core::{Asset, BlockNumber, Direction};
use serde::{Deserialize, Serialize};

use crate::calculator::{ConversionQuote, FeeBps};
use crate::constants::Deployment;

/// An account's holdings of a swap's source and destination assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub account: Address,
    pub direction: Direction,
    #[serde(with = "crate::serde_amount")]
    pub source_balance: U256,
    #[serde(with = "crate::serde_amount")]
    pub dest_balance: U256,
}

/// Holdings and controller allowances of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub address: Address,
    #[serde(with = "crate::serde_amount")]
    pub entry_balance: U256,
    #[serde(with = "crate::serde_amount")]
    pub peg_balance: U256,
    #[serde(with = "crate::serde_amount")]
    pub entry_allowance: U256,
    #[serde(with = "crate::serde_amount")]
    pub peg_allowance: U256,
}

/// Swap state for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapState {
    pub entry_asset: Asset,
    pub peg_asset: Asset,
    pub controller: Address,

    // Redeem-direction fee
    pub fee_bps: FeeBps,
    pub fee_pct: f64,

    pub account: Option<AccountState>,
}

impl SwapState {
    pub fn from_parts(deployment: &Deployment, fee: FeeBps, account: Option<AccountState>) -> Self {
        Self {
            entry_asset: deployment.entry_asset.clone(),
            peg_asset: deployment.peg_asset.clone(),
            controller: deployment.controller,
            fee_bps: fee,
            fee_pct: fee.as_pct(),
            account,
        }
    }
}

/// What a swap would do right now, without submitting anything
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapPreview {
    pub direction: Direction,
    #[serde(with = "crate::serde_amount")]
    pub requested: U256,
    /// Amount actually submitted after balance clamping
    #[serde(with = "crate::serde_amount")]
    pub safe_amount: U256,
    pub fee_bps: FeeBps,
    pub quote: ConversionQuote,
    pub balances: BalanceSnapshot,
    /// An approval transaction precedes the swap
    pub needs_approval: bool,
}

impl SwapPreview {
    /// Requested amount was reduced to fit the balance
    pub fn is_clamped(&self) -> bool {
        self.safe_amount < self.requested
    }
}

/// Mined swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub tx_hash: TxHash,
    pub block_number: BlockNumber,
    pub direction: Direction,
    #[serde(with = "crate::serde_amount")]
    pub amount_in: U256,
    /// Approval mined before the swap, if one was needed
    pub approval_tx: Option<TxHash>,
}

/// Result of a full swap flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub receipt: SwapReceipt,
    /// Quote shown before submission
    pub quote: ConversionQuote,
    /// Balances re-read after the swap; `None` if that read failed
    pub balances: Option<BalanceSnapshot>,
}
