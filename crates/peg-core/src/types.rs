//! Core type definitions for the peg swap service

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use alloy_primitives::{Address, TxHash, U256};

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

/// Conversion direction between the entry asset and the peg asset.
///
/// `MintLike` turns the entry stable asset into the peg asset at 1:1 with no fee.
/// `RedeemLike` turns the peg asset back into the entry asset and pays the swap fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "mint", alias = "mint_like")]
    MintLike,
    #[serde(rename = "redeem", alias = "redeem_like")]
    RedeemLike,
}

/// Error returned when parsing a `Direction` from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionParseError;

impl fmt::Display for DirectionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid swap direction (expected 'mint' or 'redeem')")
    }
}

impl std::error::Error for DirectionParseError {}

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mint" | "mint_like" => Ok(Self::MintLike),
            "redeem" | "redeem_like" => Ok(Self::RedeemLike),
            _ => Err(DirectionParseError),
        }
    }
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MintLike => "mint",
            Self::RedeemLike => "redeem",
        }
    }

    /// Whether the swap fee applies in this direction
    pub fn charges_fee(&self) -> bool {
        matches!(self, Self::RedeemLike)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fungible token on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl Asset {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.address)
    }
}

/// Block number
pub type BlockNumber = u64;

/// Constants
pub mod constants {
    use super::U256;

    /// Allowance granted by an infinite approval
    pub const MAX_APPROVAL: U256 = U256::MAX;
}
