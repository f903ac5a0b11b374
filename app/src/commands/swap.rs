//! Swap state, quote and submission commands

use alloy_primitives::Address;
use ledger_client::{RpcController, RpcLedger};
use peg_core::{AppConfig, Direction, SwapError};
use pegswap::{
    fetch_fee_rate, fetch_swap_state, format_amount, quote_str, verify_assets, Deployment, FeeBps,
    SwapOrchestrator,
};

fn connect(config: &AppConfig) -> Result<(RpcLedger, RpcController, Deployment), SwapError> {
    let deployment = Deployment::resolve(config)?;
    let ledger = RpcLedger::new(&config.node);
    let controller = ledger.controller(deployment.controller);
    Ok((ledger, controller, deployment))
}

/// Turn a classified failure into the one line the user sees
fn terminal(err: SwapError) -> anyhow::Error {
    tracing::debug!(error = %err, code = err.error_code(), "command failed");
    anyhow::anyhow!(err.user_message())
}

/// Print fee rate, deployment and optionally an account's holdings
pub async fn state(config: &AppConfig, account: Option<Address>) -> anyhow::Result<()> {
    let (ledger, controller, deployment) = connect(config).map_err(terminal)?;
    verify_assets(&ledger, &deployment).await.map_err(terminal)?;
    let state = fetch_swap_state(&ledger, &controller, &deployment, account)
        .await
        .map_err(terminal)?;

    println!("controller: {}", state.controller);
    println!("entry:      {}", state.entry_asset);
    println!("peg:        {}", state.peg_asset);
    println!("redeem fee: {} bps ({}%)", state.fee_bps.get(), state.fee_pct);

    if let Some(acct) = &state.account {
        let entry = &state.entry_asset;
        let peg = &state.peg_asset;
        println!("account:    {}", acct.address);
        println!(
            "  {:<6} {} (allowance {})",
            entry.symbol,
            format_amount(acct.entry_balance, entry.decimals),
            format_amount(acct.entry_allowance, entry.decimals)
        );
        println!(
            "  {:<6} {} (allowance {})",
            peg.symbol,
            format_amount(acct.peg_balance, peg.decimals),
            format_amount(acct.peg_allowance, peg.decimals)
        );
    }
    Ok(())
}

/// Print gross, fee and net for a human-readable amount
pub async fn quote(config: &AppConfig, direction: Direction, amount: &str) -> anyhow::Result<()> {
    let (_, controller, deployment) = connect(config).map_err(terminal)?;
    let (source, dest) = deployment.assets(direction);

    let fee = if direction.charges_fee() {
        fetch_fee_rate(&controller).await.map_err(terminal)?
    } else {
        FeeBps::ZERO
    };
    let (amount_in, quote) = quote_str(direction, amount, fee, source, dest).map_err(terminal)?;

    println!(
        "{} {} {} -> {}",
        direction,
        format_amount(amount_in, source.decimals),
        source.symbol,
        dest.symbol
    );
    println!("  gross: {}", format_amount(quote.gross_out, dest.decimals));
    println!(
        "  fee:   {} ({} bps)",
        format_amount(quote.fee, dest.decimals),
        fee.get()
    );
    println!("  net:   {}", format_amount(quote.net_out, dest.decimals));
    Ok(())
}

/// Run the full swap flow and print a terminal status line
pub async fn swap(
    config: &AppConfig,
    direction: Direction,
    amount: &str,
    account: Address,
) -> anyhow::Result<()> {
    let (ledger, controller, deployment) = connect(config).map_err(terminal)?;
    let (source, dest) = deployment.assets(direction);
    let (source, dest) = (source.clone(), dest.clone());
    let requested = pegswap::parse_amount(amount, source.decimals).map_err(terminal)?;

    let orchestrator = SwapOrchestrator::new(ledger, controller, deployment);
    match orchestrator.swap(account, requested, direction).await {
        Ok(outcome) => {
            if outcome.receipt.amount_in < requested {
                println!(
                    "amount clamped to {} {}",
                    format_amount(outcome.receipt.amount_in, source.decimals),
                    source.symbol
                );
            }
            if let Some(approval) = outcome.receipt.approval_tx {
                println!("approval:  {}", approval);
            }
            println!("swap:      {}", outcome.receipt.tx_hash);
            println!(
                "Swap confirmed in block {}: received {} {}",
                outcome.receipt.block_number,
                format_amount(outcome.quote.net_out, dest.decimals),
                dest.symbol
            );
            Ok(())
        }
        Err(err) if err.is_neutral() => {
            println!("{}", err.user_message());
            Ok(())
        }
        Err(err) => Err(terminal(err)),
    }
}
