//! Peg Swap Protocol Implementation
//!
//! This crate implements the accounting and call sequencing of the stable
//! controller's peg swap.
//!
//! # Protocol Overview
//!
//! The controller keeps the peg asset 1:1 backed by the entry asset:
//! - Mint direction: entry asset in, peg asset out, no fee
//! - Redeem direction: peg asset in, entry asset out, swap fee taken from the gross output
//!
//! # Features
//!
//! - Exact integer quotes with decimal rescaling that always truncates
//! - Swap state snapshots read from the ledger
//! - Allowance management and balance clamping before submission
//! - Classification of ledger failures into one closed error set
//!
//! # Example
//!
//! ```ignore
//! use pegswap::{Deployment, SwapOrchestrator};
//!
//! let orchestrator = SwapOrchestrator::new(ledger, controller, deployment);
//! let outcome = orchestrator.swap(account, amount, Direction::RedeemLike).await?;
//! println!("mined in block {}", outcome.receipt.block_number);
//! ```

pub mod calculator;
pub mod classify;
pub mod constants;
pub mod fetch;
pub mod orchestrator;
pub mod serde_amount;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use calculator::*;
pub use classify::classify;
pub use constants::*;
pub use fetch::*;
pub use orchestrator::*;
pub use peg_core::{Asset, Direction, SwapError};
pub use state::*;
