//! Peg Swap Calculator
//!
//! Pure math functions for quoting swaps through the stable controller.
//! No I/O, no async - just deterministic calculations.
//!
//! # Units
//!
//! - All amounts are base units (`U256`), scaled by each asset's decimals
//! - Fee rates are basis points, 10000 = 100%
//! - Rescaling to fewer decimals truncates; nothing ever rounds up

use alloy_primitives::U256;
use peg_core::{Asset, Direction, SwapError};
use serde::{Deserialize, Serialize};

use crate::params;

/// Largest power of ten representable in a U256
const MAX_POW10: u8 = 77;

/// Validated fee rate in basis points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeBps(u16);

impl FeeBps {
    pub const ZERO: FeeBps = FeeBps(0);

    pub fn new(bps: u32) -> Result<Self, SwapError> {
        if bps > params::MAX_FEE_BPS as u32 {
            return Err(SwapError::InvalidFeeRate {
                bps: bps.to_string(),
            });
        }
        Ok(Self(bps as u16))
    }

    /// Validate a raw `uint256` read from the controller
    pub fn from_ledger(raw: U256) -> Result<Self, SwapError> {
        if raw > U256::from(params::MAX_FEE_BPS) {
            return Err(SwapError::InvalidFeeRate {
                bps: raw.to_string(),
            });
        }
        Ok(Self(raw.to::<u16>()))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Percentage for display only
    pub fn as_pct(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// A single conversion the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub direction: Direction,
    pub amount_in: U256,
    pub source: Asset,
    pub dest: Asset,
}

impl ConversionRequest {
    pub fn new(direction: Direction, amount_in: U256, source: &Asset, dest: &Asset) -> Self {
        Self {
            direction,
            amount_in,
            source: source.clone(),
            dest: dest.clone(),
        }
    }
}

/// Output of a quote, in destination base units.
///
/// `gross_out == net_out + fee` always holds, and `fee` is zero in the mint direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionQuote {
    #[serde(with = "crate::serde_amount")]
    pub gross_out: U256,
    #[serde(with = "crate::serde_amount")]
    pub fee: U256,
    #[serde(with = "crate::serde_amount")]
    pub net_out: U256,
}

impl ConversionQuote {
    pub fn zero() -> Self {
        Self {
            gross_out: U256::ZERO,
            fee: U256::ZERO,
            net_out: U256::ZERO,
        }
    }
}

/// `10^exp`, failing past the U256 range
pub fn pow10(exp: u8) -> Result<U256, SwapError> {
    if exp > MAX_POW10 {
        return Err(SwapError::invalid_amount(format!(
            "10^{} exceeds the amount range",
            exp
        )));
    }
    Ok(U256::from(10u64).pow(U256::from(exp)))
}

/// Rescale `amount` between decimal precisions.
///
/// Scaling up is checked; scaling down truncates toward zero.
pub fn rescale(amount: U256, from_decimals: u8, to_decimals: u8) -> Result<U256, SwapError> {
    if amount.is_zero() || from_decimals == to_decimals {
        return Ok(amount);
    }
    if to_decimals > from_decimals {
        let factor = pow10(to_decimals - from_decimals)?;
        amount
            .checked_mul(factor)
            .ok_or_else(|| SwapError::invalid_amount("amount overflows after rescaling"))
    } else {
        // A factor past the U256 range would divide everything to zero anyway
        match pow10(from_decimals - to_decimals) {
            Ok(factor) => Ok(amount / factor),
            Err(_) => Ok(U256::ZERO),
        }
    }
}

/// `floor(gross * bps / 10000)` without overflow for any U256.
///
/// Splitting `gross = q * 10000 + r` gives `q * bps + floor(r * bps / 10000)`,
/// and neither term can exceed `gross`.
fn fee_for(gross: U256, fee: FeeBps) -> U256 {
    let denom = U256::from(params::BPS_DENOMINATOR);
    let bps = U256::from(fee.get());
    (gross / denom) * bps + (gross % denom) * bps / denom
}

/// Quote a mint-direction conversion: 1:1 value, no fee
pub fn quote_mint_like(
    amount_in: U256,
    source_decimals: u8,
    dest_decimals: u8,
) -> Result<ConversionQuote, SwapError> {
    let out = rescale(amount_in, source_decimals, dest_decimals)?;
    Ok(ConversionQuote {
        gross_out: out,
        fee: U256::ZERO,
        net_out: out,
    })
}

/// Quote a redeem-direction conversion, taking the fee from the gross output
pub fn quote_redeem_like(
    amount_in: U256,
    fee_bps: u32,
    source_decimals: u8,
    dest_decimals: u8,
) -> Result<ConversionQuote, SwapError> {
    let fee = FeeBps::new(fee_bps)?;
    redeem_with_fee(amount_in, fee, source_decimals, dest_decimals)
}

fn redeem_with_fee(
    amount_in: U256,
    fee: FeeBps,
    source_decimals: u8,
    dest_decimals: u8,
) -> Result<ConversionQuote, SwapError> {
    let gross_out = rescale(amount_in, source_decimals, dest_decimals)?;
    let fee = fee_for(gross_out, fee);
    Ok(ConversionQuote {
        gross_out,
        fee,
        net_out: gross_out - fee,
    })
}

/// Quote either direction; the fee rate is ignored when minting
pub fn quote(
    direction: Direction,
    amount_in: U256,
    fee: FeeBps,
    source_decimals: u8,
    dest_decimals: u8,
) -> Result<ConversionQuote, SwapError> {
    match direction {
        Direction::MintLike => quote_mint_like(amount_in, source_decimals, dest_decimals),
        Direction::RedeemLike => redeem_with_fee(amount_in, fee, source_decimals, dest_decimals),
    }
}

/// Quote a full request
pub fn quote_request(request: &ConversionRequest, fee: FeeBps) -> Result<ConversionQuote, SwapError> {
    quote(
        request.direction,
        request.amount_in,
        fee,
        request.source.decimals,
        request.dest.decimals,
    )
}

/// Parse user text such as `"100"`, `"99.75"` or `".5"` into base units
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, SwapError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SwapError::invalid_amount("amount is empty"));
    }
    if input.starts_with('-') {
        return Err(SwapError::invalid_amount("amount must not be negative"));
    }

    let (int_part, frac_part) = match input.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (input, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(SwapError::invalid_amount(format!("'{}' is not a number", input)));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(SwapError::invalid_amount(format!("'{}' is not a number", input)));
    }
    if frac_part.len() > decimals as usize {
        return Err(SwapError::invalid_amount(format!(
            "at most {} decimal places allowed",
            decimals
        )));
    }

    let overflow = || SwapError::invalid_amount("amount is too large");
    let parse_digits = |s: &str| -> Result<U256, SwapError> {
        if s.is_empty() {
            return Ok(U256::ZERO);
        }
        U256::from_str_radix(s, 10).map_err(|_| overflow())
    };

    let whole = parse_digits(int_part)?
        .checked_mul(pow10(decimals)?)
        .ok_or_else(overflow)?;
    let frac = parse_digits(frac_part)?
        .checked_mul(pow10(decimals - frac_part.len() as u8)?)
        .ok_or_else(overflow)?;

    whole.checked_add(frac).ok_or_else(overflow)
}

/// Render base units as a decimal string, trimming trailing zeros
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let Ok(unit) = pow10(decimals) else {
        return amount.to_string();
    };
    let whole = amount / unit;
    let frac = amount % unit;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Parse user text in the source asset's precision and quote it
pub fn quote_str(
    direction: Direction,
    input: &str,
    fee: FeeBps,
    source: &Asset,
    dest: &Asset,
) -> Result<(U256, ConversionQuote), SwapError> {
    let amount_in = parse_amount(input, source.decimals)?;
    let request = ConversionRequest::new(direction, amount_in, source, dest);
    Ok((amount_in, quote_request(&request, fee)?))
}
