//! Peg Swap State Fetching from the Ledger
//!
//! Reads fee rate, decimals, balances and allowances and assembles snapshots.
//! Read failures surface as `StateUnavailable`; they never reach a submission.

use alloy_primitives::{Address, U256};
use ledger_client::{SwapController, TokenLedger};
use peg_core::{Asset, Direction, LedgerError, SwapError};

use crate::calculator::{ConversionQuote, FeeBps};
use crate::constants::Deployment;
use crate::state::{AccountState, BalanceSnapshot, SwapState};

fn unavailable(what: &str, err: LedgerError) -> SwapError {
    SwapError::StateUnavailable {
        reason: format!("{}: {}", what, err),
    }
}

/// Read and validate the controller's current fee rate
pub async fn fetch_fee_rate<C>(controller: &C) -> Result<FeeBps, SwapError>
where
    C: SwapController + ?Sized,
{
    let raw = controller
        .swap_fee_bps()
        .await
        .map_err(|e| unavailable("fee rate", e))?;
    FeeBps::from_ledger(raw)
}

/// Check on-chain decimals against the configured deployment
pub async fn verify_assets<L>(ledger: &L, deployment: &Deployment) -> Result<(), SwapError>
where
    L: TokenLedger + ?Sized,
{
    for asset in [&deployment.entry_asset, &deployment.peg_asset] {
        let decimals = ledger
            .decimals(asset.address)
            .await
            .map_err(|e| unavailable(&format!("{} decimals", asset.symbol), e))?;
        if decimals != asset.decimals {
            return Err(SwapError::StateUnavailable {
                reason: format!(
                    "{} reports {} decimals, configured {}",
                    asset, decimals, asset.decimals
                ),
            });
        }
    }
    Ok(())
}

async fn balance<L>(ledger: &L, asset: &Asset, account: Address) -> Result<U256, SwapError>
where
    L: TokenLedger + ?Sized,
{
    ledger
        .balance_of(asset.address, account)
        .await
        .map_err(|e| unavailable(&format!("{} balance", asset.symbol), e))
}

/// Allowance `owner` has granted `spender` for one asset
pub async fn fetch_allowance<L>(
    ledger: &L,
    asset: &Asset,
    owner: Address,
    spender: Address,
) -> Result<U256, SwapError>
where
    L: TokenLedger + ?Sized,
{
    ledger
        .allowance(asset.address, owner, spender)
        .await
        .map_err(|e| unavailable(&format!("{} allowance", asset.symbol), e))
}

/// Source and destination balances of `account` for a direction
pub async fn fetch_balances<L>(
    ledger: &L,
    deployment: &Deployment,
    account: Address,
    direction: Direction,
) -> Result<BalanceSnapshot, SwapError>
where
    L: TokenLedger + ?Sized,
{
    let (source, dest) = deployment.assets(direction);
    let source_balance = balance(ledger, source, account).await?;
    let dest_balance = balance(ledger, dest, account).await?;

    Ok(BalanceSnapshot {
        account,
        direction,
        source_balance,
        dest_balance,
    })
}

/// Balances and controller allowances for both assets
pub async fn fetch_account_state<L>(
    ledger: &L,
    deployment: &Deployment,
    account: Address,
) -> Result<AccountState, SwapError>
where
    L: TokenLedger + ?Sized,
{
    let spender = deployment.controller;
    Ok(AccountState {
        address: account,
        entry_balance: balance(ledger, &deployment.entry_asset, account).await?,
        peg_balance: balance(ledger, &deployment.peg_asset, account).await?,
        entry_allowance: fetch_allowance(ledger, &deployment.entry_asset, account, spender).await?,
        peg_allowance: fetch_allowance(ledger, &deployment.peg_asset, account, spender).await?,
    })
}

/// Fetch a full swap state snapshot
pub async fn fetch_swap_state<L, C>(
    ledger: &L,
    controller: &C,
    deployment: &Deployment,
    account: Option<Address>,
) -> Result<SwapState, SwapError>
where
    L: TokenLedger + ?Sized,
    C: SwapController + ?Sized,
{
    let fee = fetch_fee_rate(controller).await?;
    let account = match account {
        Some(address) => Some(fetch_account_state(ledger, deployment, address).await?),
        None => None,
    };

    tracing::debug!(fee_bps = fee.get(), has_account = account.is_some(), "swap state fetched");
    Ok(SwapState::from_parts(deployment, fee, account))
}

/// Compare a local redeem quote with the controller's own preview
pub async fn verify_preview<C>(
    controller: &C,
    amount_in: U256,
    local: &ConversionQuote,
) -> Result<(), SwapError>
where
    C: SwapController + ?Sized,
{
    let remote = controller
        .preview_swap_redeem_like(amount_in)
        .await
        .map_err(|e| unavailable("controller preview", e))?;

    if remote.gross_out != local.gross_out
        || remote.fee != local.fee
        || remote.net_out != local.net_out
    {
        tracing::warn!(
            amount = %amount_in,
            local_net = %local.net_out,
            ledger_net = %remote.net_out,
            "local quote differs from controller preview"
        );
        return Err(SwapError::QuoteMismatch {
            local: format!("{}/{}/{}", local.gross_out, local.fee, local.net_out),
            ledger: format!("{}/{}/{}", remote.gross_out, remote.fee, remote.net_out),
        });
    }
    Ok(())
}
