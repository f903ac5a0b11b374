//! Peg Swap Protocol Constants
//!
//! Contract addresses and protocol parameters per network.

use alloy_primitives::{address, Address};
use peg_core::{AppConfig, Asset, DeploymentConfig, Direction, Network, SwapError};
use serde::{Deserialize, Serialize};

/// Local devnet deployment (first three contracts of the default dev account)
pub mod devnet {
    use super::*;

    /// Entry stable asset (deposited on mint)
    pub const ENTRY_ASSET: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");

    /// Peg asset (minted 1:1, redeemed with fee)
    pub const PEG_ASSET: Address = address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512");

    /// StableController
    pub const CONTROLLER: Address = address!("9fe46736679d2d9a65f0992f2272de9f3c7fa6e0");

    pub const ENTRY_SYMBOL: &str = "USDC";
    pub const PEG_SYMBOL: &str = "USDK";
}

/// Protocol parameters
pub mod params {
    /// One basis point is 1/10000
    pub const BPS_DENOMINATOR: u16 = 10_000;

    /// Highest fee rate the controller can report (100%)
    pub const MAX_FEE_BPS: u16 = 10_000;

    /// Base units of the peg asset left unspent on redeem
    pub const REDEEM_RESERVE_UNITS: u64 = 1;

    /// Entry asset precision in the reference deployment
    pub const ENTRY_DECIMALS: u8 = 18;

    /// Peg asset precision in the reference deployment
    pub const PEG_DECIMALS: u8 = 6;
}

/// Contract set for a specific network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub entry_asset: Asset,
    pub peg_asset: Asset,
    pub controller: Address,
}

impl Deployment {
    /// Built-in deployment for a network
    pub fn for_network(network: Network) -> Option<Self> {
        match network {
            Network::Devnet => Some(Self {
                entry_asset: Asset::new(
                    devnet::ENTRY_ASSET,
                    devnet::ENTRY_SYMBOL,
                    params::ENTRY_DECIMALS,
                ),
                peg_asset: Asset::new(devnet::PEG_ASSET, devnet::PEG_SYMBOL, params::PEG_DECIMALS),
                controller: devnet::CONTROLLER,
            }),
            // Public deployments are supplied through configuration
            Network::Mainnet | Network::Testnet => None,
        }
    }

    /// Deployment from config, falling back to the network's built-in one
    pub fn resolve(config: &AppConfig) -> Result<Self, SwapError> {
        if let Some(explicit) = &config.deployment {
            return Ok(explicit.clone().into());
        }
        Self::for_network(config.network).ok_or_else(|| SwapError::StateUnavailable {
            reason: format!("no deployment configured for {}", config.network),
        })
    }

    /// `(source, destination)` assets of a swap direction
    pub fn assets(&self, direction: Direction) -> (&Asset, &Asset) {
        match direction {
            Direction::MintLike => (&self.entry_asset, &self.peg_asset),
            Direction::RedeemLike => (&self.peg_asset, &self.entry_asset),
        }
    }
}

impl From<DeploymentConfig> for Deployment {
    fn from(config: DeploymentConfig) -> Self {
        Self {
            entry_asset: config.entry_asset,
            peg_asset: config.peg_asset,
            controller: config.controller,
        }
    }
}
