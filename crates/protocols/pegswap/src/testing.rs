//! In-memory ledger and controller for tests

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use alloy_primitives::{address, Address, TxHash, U256};
use async_trait::async_trait;
use ledger_client::{
    Receipt, ReceiptWatcher, RedeemPreview, Result, SwapController, TokenLedger,
};
use peg_core::{LedgerError, Network};
use tokio::sync::Notify;

use crate::constants::Deployment;

pub(crate) const ALICE: Address = address!("a11ce00000000000000000000000000000000001");
pub(crate) const BOB: Address = address!("b0b0000000000000000000000000000000000002");

/// 10^(18 - 6), between the devnet assets' precisions
const PEG_TO_ENTRY: U256 = U256::from_limbs([1_000_000_000_000, 0, 0, 0]);

/// Write calls the fake has seen, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Approve {
        asset: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    },
    SwapMint {
        from: Address,
        amount: U256,
    },
    SwapRedeem {
        from: Address,
        amount: U256,
    },
}

#[derive(Default)]
struct ChainState {
    deployment: Option<Deployment>,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    fee_bps: U256,
    calls: Vec<Call>,
    reads: usize,
    fail_reads: bool,
    revert_approvals: bool,
    next_approve_error: Option<LedgerError>,
    next_swap_error: Option<LedgerError>,
    reverted: HashSet<TxHash>,
    next_tx: u64,
    block: u64,
}

impl ChainState {
    fn deployment(&self) -> &Deployment {
        self.deployment.as_ref().expect("fake chain has a deployment")
    }

    fn balance(&self, asset: Address, account: Address) -> U256 {
        self.balances.get(&(asset, account)).copied().unwrap_or_default()
    }

    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn tx_hash(&mut self) -> TxHash {
        self.next_tx += 1;
        TxHash::left_padding_from(&self.next_tx.to_be_bytes())
    }

    fn read(&mut self) -> Result<()> {
        self.reads += 1;
        if self.fail_reads {
            return Err(LedgerError::Unreachable {
                url: "fake://ledger".into(),
                message: "connection refused".into(),
            });
        }
        Ok(())
    }

    /// Pull `amount` of `asset` from `from` through the controller, like `transferFrom`
    fn pull(&mut self, asset: Address, from: Address, amount: U256) -> Result<()> {
        let spender = self.deployment().controller;
        let allowance = self.allowance(asset, from, spender);
        if allowance < amount {
            return Err(LedgerError::estimation(LedgerError::Rpc {
                code: 3,
                message: "execution reverted: ERC20: insufficient allowance".into(),
                data: None,
            }));
        }
        let balance = self.balance(asset, from);
        if balance < amount {
            return Err(LedgerError::estimation(LedgerError::Rpc {
                code: 3,
                message: "execution reverted: ERC20: transfer amount exceeds balance".into(),
                data: None,
            }));
        }
        if allowance != U256::MAX {
            self.allowances.insert((asset, from, spender), allowance - amount);
        }
        self.balances.insert((asset, from), balance - amount);
        Ok(())
    }

    fn credit(&mut self, asset: Address, to: Address, amount: U256) {
        let balance = self.balance(asset, to);
        self.balances.insert((asset, to), balance + amount);
    }
}

#[derive(Clone, Default)]
struct Shared {
    state: Arc<Mutex<ChainState>>,
    /// Receipts block until notified when set
    receipt_gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl Shared {
    fn with<T>(&self, f: impl FnOnce(&mut ChainState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    async fn wait_for_receipt(&self, tx: TxHash) -> Result<Receipt> {
        if let Some((entered, release)) = &self.receipt_gate {
            entered.notify_one();
            release.notified().await;
        }
        self.with(|s| {
            if s.reverted.contains(&tx) {
                return Err(LedgerError::Reverted { tx });
            }
            s.block += 1;
            Ok(Receipt {
                tx_hash: tx,
                block_number: s.block,
                gas_used: Some(50_000),
            })
        })
    }
}

#[derive(Clone)]
pub(crate) struct FakeLedger(Shared);

#[derive(Clone)]
pub(crate) struct FakeController(Shared);

/// Fake ledger and controller sharing one devnet state
pub(crate) fn fake_chain() -> (FakeLedger, FakeController, Deployment) {
    fake_chain_with(Shared::default())
}

/// Like [`fake_chain`], but every receipt wait signals `entered` and blocks until `release`
pub(crate) fn gated_fake_chain(
    entered: Arc<Notify>,
    release: Arc<Notify>,
) -> (FakeLedger, FakeController, Deployment) {
    fake_chain_with(Shared {
        receipt_gate: Some((entered, release)),
        ..Shared::default()
    })
}

fn fake_chain_with(shared: Shared) -> (FakeLedger, FakeController, Deployment) {
    let deployment = Deployment::for_network(Network::Devnet).expect("devnet deployment");
    shared.with(|s| s.deployment = Some(deployment.clone()));
    (
        FakeLedger(shared.clone()),
        FakeController(shared),
        deployment,
    )
}

impl FakeLedger {
    pub(crate) fn set_balance(&self, asset: Address, account: Address, amount: U256) {
        self.0.with(|s| s.balances.insert((asset, account), amount));
    }

    pub(crate) fn set_allowance(&self, asset: Address, owner: Address, spender: Address, amount: U256) {
        self.0
            .with(|s| s.allowances.insert((asset, owner, spender), amount));
    }

    pub(crate) fn stored_balance(&self, asset: Address, account: Address) -> U256 {
        self.0.with(|s| s.balance(asset, account))
    }

    pub(crate) fn stored_allowance(&self, asset: Address, owner: Address, spender: Address) -> U256 {
        self.0.with(|s| s.allowance(asset, owner, spender))
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.with(|s| s.calls.clone())
    }

    pub(crate) fn reads(&self) -> usize {
        self.0.with(|s| s.reads)
    }

    pub(crate) fn fail_reads(&self) {
        self.0.with(|s| s.fail_reads = true);
    }

    pub(crate) fn revert_approvals(&self) {
        self.0.with(|s| s.revert_approvals = true);
    }

    pub(crate) fn fail_next_approve(&self, err: LedgerError) {
        self.0.with(|s| s.next_approve_error = Some(err));
    }
}

impl FakeController {
    pub(crate) fn set_fee(&self, bps: U256) {
        self.0.with(|s| s.fee_bps = bps);
    }

    pub(crate) fn fail_next_swap(&self, err: LedgerError) {
        self.0.with(|s| s.next_swap_error = Some(err));
    }
}

#[async_trait]
impl ReceiptWatcher for FakeLedger {
    async fn wait_for_receipt(&self, tx: TxHash) -> Result<Receipt> {
        self.0.wait_for_receipt(tx).await
    }
}

#[async_trait]
impl TokenLedger for FakeLedger {
    async fn decimals(&self, asset: Address) -> Result<u8> {
        self.0.with(|s| {
            s.read()?;
            let d = s.deployment();
            if asset == d.entry_asset.address {
                Ok(18)
            } else if asset == d.peg_asset.address {
                Ok(6)
            } else {
                Err(LedgerError::Abi("no code at address".into()))
            }
        })
    }

    async fn balance_of(&self, asset: Address, account: Address) -> Result<U256> {
        self.0.with(|s| {
            s.read()?;
            Ok(s.balance(asset, account))
        })
    }

    async fn allowance(&self, asset: Address, owner: Address, spender: Address) -> Result<U256> {
        self.0.with(|s| {
            s.read()?;
            Ok(s.allowance(asset, owner, spender))
        })
    }

    async fn approve(
        &self,
        asset: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash> {
        self.0.with(|s| {
            s.calls.push(Call::Approve {
                asset,
                owner,
                spender,
                amount,
            });
            if let Some(err) = s.next_approve_error.take() {
                return Err(err);
            }
            let tx = s.tx_hash();
            if s.revert_approvals {
                s.reverted.insert(tx);
            } else {
                s.allowances.insert((asset, owner, spender), amount);
            }
            Ok(tx)
        })
    }
}

#[async_trait]
impl ReceiptWatcher for FakeController {
    async fn wait_for_receipt(&self, tx: TxHash) -> Result<Receipt> {
        self.0.wait_for_receipt(tx).await
    }
}

#[async_trait]
impl SwapController for FakeController {
    async fn swap_fee_bps(&self) -> Result<U256> {
        self.0.with(|s| {
            s.read()?;
            Ok(s.fee_bps)
        })
    }

    async fn preview_swap_redeem_like(&self, amount_in: U256) -> Result<RedeemPreview> {
        self.0.with(|s| {
            s.read()?;
            let gross_out = amount_in * PEG_TO_ENTRY;
            let fee = gross_out * s.fee_bps / U256::from(10_000u64);
            Ok(RedeemPreview {
                net_out: gross_out - fee,
                fee,
                gross_out,
            })
        })
    }

    async fn swap_mint_like(&self, from: Address, amount_in: U256) -> Result<TxHash> {
        self.0.with(|s| {
            s.calls.push(Call::SwapMint {
                from,
                amount: amount_in,
            });
            if let Some(err) = s.next_swap_error.take() {
                return Err(err);
            }
            let (entry, peg) = {
                let d = s.deployment();
                (d.entry_asset.address, d.peg_asset.address)
            };
            s.pull(entry, from, amount_in)?;
            s.credit(peg, from, amount_in / PEG_TO_ENTRY);
            Ok(s.tx_hash())
        })
    }

    async fn swap_redeem_like(&self, from: Address, amount_in: U256) -> Result<TxHash> {
        self.0.with(|s| {
            s.calls.push(Call::SwapRedeem {
                from,
                amount: amount_in,
            });
            if let Some(err) = s.next_swap_error.take() {
                return Err(err);
            }
            let (entry, peg) = {
                let d = s.deployment();
                (d.entry_asset.address, d.peg_asset.address)
            };
            s.pull(peg, from, amount_in)?;
            let gross = amount_in * PEG_TO_ENTRY;
            let fee = gross * s.fee_bps / U256::from(10_000u64);
            s.credit(entry, from, gross - fee);
            Ok(s.tx_hash())
        })
    }

    fn address(&self) -> Address {
        self.0.with(|s| s.deployment().controller)
    }
}
