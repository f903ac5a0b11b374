//! Node status command

use ledger_client::RpcLedger;
use peg_core::AppConfig;

/// Print the node probe result
pub async fn status(config: &AppConfig) -> anyhow::Result<()> {
    let ledger = RpcLedger::new(&config.node);
    let status = ledger.status().await;

    if !status.online {
        anyhow::bail!("node at {} is unreachable", config.node.url);
    }

    println!("node:     {}", config.node.url);
    println!("network:  {}", config.network);
    match status.chain_id {
        Some(id) => println!("chain id: {}", id),
        None => println!("chain id: unknown"),
    }
    println!("block:    {}", status.block_number);
    println!("syncing:  {}", status.syncing);
    if !status.is_ready() {
        tracing::warn!("node is still syncing; balances may be stale");
    }
    Ok(())
}
