//! Peg Swap Orchestration
//!
//! Sequences one swap against the ledger: read balances, clamp the amount,
//! quote, approve if needed, submit, then re-read. Each step awaits the
//! previous one; nothing is batched or retried.
//!
//! Values read before a state-changing call are not reused after it. The
//! outcome carries a fresh balance snapshot instead.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use alloy_primitives::{Address, TxHash, U256};
use ledger_client::{SwapController, TokenLedger};
use peg_core::constants::MAX_APPROVAL;
use peg_core::{Asset, Direction, LedgerError, SwapError};

use crate::calculator::{quote_request, ConversionRequest};
use crate::classify::classify;
use crate::constants::{params, Deployment};
use crate::fetch::{fetch_allowance, fetch_balances, fetch_fee_rate, verify_preview};
use crate::state::{SwapOutcome, SwapPreview, SwapReceipt};

/// Largest amount that can be submitted from `balance`
///
/// A redeem of the whole balance leaves one base unit of the peg asset behind.
/// Requests above the balance clamp to the balance itself.
pub fn prepare_amount(requested: U256, direction: Direction, balance: U256) -> U256 {
    let reserve = U256::from(params::REDEEM_RESERVE_UNITS);
    match direction {
        Direction::RedeemLike if requested == balance && balance > reserve => balance - reserve,
        _ => requested.min(balance),
    }
}

/// Accounts with a swap currently running
#[derive(Default)]
struct InFlight(Mutex<HashSet<Address>>);

impl InFlight {
    fn accounts(&self) -> MutexGuard<'_, HashSet<Address>> {
        // The set stays consistent even if a holder panicked
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserve `account` until the returned guard drops
    fn claim(&self, account: Address) -> Result<InFlightGuard<'_>, SwapError> {
        if !self.accounts().insert(account) {
            return Err(SwapError::SwapInProgress);
        }
        Ok(InFlightGuard {
            in_flight: self,
            account,
        })
    }
}

struct InFlightGuard<'a> {
    in_flight: &'a InFlight,
    account: Address,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.accounts().remove(&self.account);
    }
}

/// Drives swaps for one deployment
pub struct SwapOrchestrator<L, C> {
    ledger: L,
    controller: C,
    deployment: Deployment,
    in_flight: InFlight,
}

impl<L, C> SwapOrchestrator<L, C>
where
    L: TokenLedger,
    C: SwapController,
{
    pub fn new(ledger: L, controller: C, deployment: Deployment) -> Self {
        Self {
            ledger,
            controller,
            deployment,
            in_flight: InFlight::default(),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Make sure `spender` may move `needed` of `asset` from `owner`
    ///
    /// Returns the approval transaction when one had to be sent. Approvals are
    /// unlimited, so later swaps of the same asset skip this write.
    pub async fn ensure_allowance(
        &self,
        asset: &Asset,
        owner: Address,
        spender: Address,
        needed: U256,
    ) -> Result<Option<TxHash>, SwapError> {
        let current = fetch_allowance(&self.ledger, asset, owner, spender).await?;
        if current >= needed {
            tracing::debug!(asset = %asset.symbol, allowance = %current, needed = %needed, "allowance sufficient");
            return Ok(None);
        }

        tracing::debug!(asset = %asset.symbol, allowance = %current, needed = %needed, "requesting approval");
        let tx = self
            .ledger
            .approve(asset.address, owner, spender, MAX_APPROVAL)
            .await
            .map_err(|e| report("approve", &e))?;

        match self.ledger.wait_for_receipt(tx).await {
            Ok(receipt) => {
                tracing::debug!(tx = %tx, block = receipt.block_number, "approval mined");
                Ok(Some(tx))
            }
            Err(LedgerError::Reverted { tx }) => {
                tracing::warn!(tx = %tx, asset = %asset.symbol, "approval reverted");
                Err(SwapError::InsufficientAllowance {
                    reason: format!("approval {} reverted", tx),
                })
            }
            Err(e) => Err(report("approval receipt", &e)),
        }
    }

    /// Submit the swap call for `amount` and wait for it to be mined
    pub async fn submit_swap(
        &self,
        account: Address,
        direction: Direction,
        amount: U256,
    ) -> Result<SwapReceipt, SwapError> {
        let submitted = match direction {
            Direction::MintLike => self.controller.swap_mint_like(account, amount).await,
            Direction::RedeemLike => self.controller.swap_redeem_like(account, amount).await,
        };
        let tx = submitted.map_err(|e| report("swap", &e))?;
        tracing::debug!(tx = %tx, %direction, "swap submitted");

        let receipt = self
            .controller
            .wait_for_receipt(tx)
            .await
            .map_err(|e| report("swap receipt", &e))?;

        Ok(SwapReceipt {
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            direction,
            amount_in: amount,
            approval_tx: None,
        })
    }

    /// Clamp and quote a swap without writing anything
    pub async fn preview(
        &self,
        account: Address,
        requested: U256,
        direction: Direction,
    ) -> Result<SwapPreview, SwapError> {
        if requested.is_zero() {
            return Err(SwapError::invalid_amount("amount must be greater than zero"));
        }

        let fee_bps = fetch_fee_rate(&self.controller).await?;
        let balances = fetch_balances(&self.ledger, &self.deployment, account, direction).await?;
        let safe_amount = prepare_amount(requested, direction, balances.source_balance);

        let (source, dest) = self.deployment.assets(direction);
        let request = ConversionRequest::new(direction, safe_amount, source, dest);
        let quote = quote_request(&request, fee_bps)?;
        let allowance =
            fetch_allowance(&self.ledger, source, account, self.deployment.controller).await?;

        Ok(SwapPreview {
            direction,
            requested,
            safe_amount,
            fee_bps,
            quote,
            balances,
            needs_approval: !safe_amount.is_zero() && allowance < safe_amount,
        })
    }

    /// Run a full swap for `account`
    ///
    /// Fails with `SwapInProgress` while another swap for the same account is
    /// still running. Different accounts swap concurrently.
    pub async fn swap(
        &self,
        account: Address,
        requested: U256,
        direction: Direction,
    ) -> Result<SwapOutcome, SwapError> {
        let _guard = self.in_flight.claim(account)?;

        if requested.is_zero() {
            return Err(SwapError::invalid_amount("amount must be greater than zero"));
        }

        let (source, dest) = self.deployment.assets(direction);
        tracing::info!(%account, %direction, requested = %requested, "swap started");

        let balances = fetch_balances(&self.ledger, &self.deployment, account, direction).await?;
        let safe_amount = prepare_amount(requested, direction, balances.source_balance);
        if safe_amount.is_zero() {
            tracing::info!(%account, asset = %source.symbol, "nothing to swap");
            return Err(SwapError::InsufficientBalance {
                reason: format!("{} balance is {}", source.symbol, balances.source_balance),
            });
        }
        if safe_amount < requested {
            tracing::debug!(requested = %requested, safe = %safe_amount, "amount clamped to balance");
        }

        let fee_bps = fetch_fee_rate(&self.controller).await?;
        let request = ConversionRequest::new(direction, safe_amount, source, dest);
        let quote = quote_request(&request, fee_bps)?;
        if direction.charges_fee() {
            verify_preview(&self.controller, safe_amount, &quote).await?;
        }
        tracing::debug!(
            gross = %quote.gross_out,
            fee = %quote.fee,
            net = %quote.net_out,
            fee_bps = fee_bps.get(),
            "quoted"
        );

        let approval_tx = self
            .ensure_allowance(source, account, self.deployment.controller, safe_amount)
            .await?;

        let mut receipt = self.submit_swap(account, direction, safe_amount).await?;
        receipt.approval_tx = approval_tx;

        let balances = match fetch_balances(&self.ledger, &self.deployment, account, direction).await {
            Ok(b) => Some(b),
            Err(e) => {
                tracing::warn!(error = %e, "could not refresh balances after swap");
                None
            }
        };

        tracing::info!(
            tx = %receipt.tx_hash,
            block = receipt.block_number,
            amount_in = %safe_amount,
            net_out = %quote.net_out,
            "swap completed"
        );

        Ok(SwapOutcome {
            receipt,
            quote,
            balances,
        })
    }
}

/// Classify a failed write and log it at the level its class deserves
fn report(stage: &str, err: &LedgerError) -> SwapError {
    let classified = classify(err);
    match &classified {
        SwapError::UserRejected => tracing::info!(stage, "transaction cancelled by user"),
        SwapError::UnknownFailure { .. } => {
            tracing::warn!(stage, error = %err, "unclassified ledger failure")
        }
        other => tracing::warn!(stage, error = %other, "swap step failed"),
    }
    classified
}
