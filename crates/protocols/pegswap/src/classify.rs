//! Ledger error classification
//!
//! The one place raw RPC failures become [`SwapError`] variants. Revert data is
//! matched by selector first, then by reason text; anything unrecognised falls
//! into `UnknownFailure` with the original text kept for logs.

use ledger_client::abi::{
    decode_revert_data, revert_reason, revert_selector, INSUFFICIENT_ALLOWANCE_SELECTOR,
    INSUFFICIENT_BALANCE_SELECTOR,
};
use peg_core::{LedgerError, SwapError};

/// EIP-1193 "user rejected request"
const USER_REJECTED_CODE: i64 = 4001;

/// Geth's code for `execution reverted`
const EXECUTION_REVERTED_CODE: i64 = 3;

/// Map a ledger failure to the swap error taxonomy
pub fn classify(err: &LedgerError) -> SwapError {
    match err {
        LedgerError::Rpc {
            code,
            message,
            data,
        } => classify_rpc(*code, message, data.as_deref()),
        LedgerError::EstimationFailed { source } => match classify(source) {
            SwapError::UnknownFailure { detail } => SwapError::TransactionWouldFail { reason: detail },
            known => known,
        },
        LedgerError::Reverted { tx } => SwapError::TransactionWouldFail {
            reason: format!("transaction {} reverted on-chain", tx),
        },
        LedgerError::Unreachable { .. }
        | LedgerError::Timeout { .. }
        | LedgerError::ParseError(_)
        | LedgerError::Abi(_) => SwapError::UnknownFailure {
            detail: err.to_string(),
        },
    }
}

fn classify_rpc(code: i64, message: &str, data: Option<&str>) -> SwapError {
    let lowered = message.to_ascii_lowercase();

    if code == USER_REJECTED_CODE
        || lowered.contains("user rejected")
        || lowered.contains("user denied")
    {
        return SwapError::UserRejected;
    }

    let payload = data.and_then(decode_revert_data);
    let reason = payload.as_deref().and_then(revert_reason);
    let selector = payload.as_deref().and_then(revert_selector);

    // Reverts carry their reason either in the decoded payload or inlined in the message
    let text = match &reason {
        Some(r) => format!("{} {}", lowered, r.to_ascii_lowercase()),
        None => lowered.clone(),
    };

    if selector == Some(INSUFFICIENT_BALANCE_SELECTOR)
        || text.contains("exceeds balance")
        || text.contains("insufficient balance")
    {
        return SwapError::InsufficientBalance {
            reason: reason.unwrap_or_else(|| message.to_string()),
        };
    }

    if selector == Some(INSUFFICIENT_ALLOWANCE_SELECTOR) || text.contains("insufficient allowance")
    {
        return SwapError::InsufficientAllowance {
            reason: reason.unwrap_or_else(|| message.to_string()),
        };
    }

    if code == EXECUTION_REVERTED_CODE || lowered.contains("execution reverted") {
        return SwapError::TransactionWouldFail {
            reason: reason.unwrap_or_else(|| message.to_string()),
        };
    }

    SwapError::UnknownFailure {
        detail: format!("RPC error {}: {}", code, message),
    }
}
