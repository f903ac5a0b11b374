//! Error types for the peg swap service

use thiserror::Error;

use crate::TxHash;

/// Core errors that can occur in the service
#[derive(Debug, Error)]
pub enum Error {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Swap error: {0}")]
    Swap(#[from] SwapError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Node transport and RPC errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Node unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        /// Hex-encoded revert data, when the node returns it
        data: Option<String>,
    },

    #[error("Gas estimation failed: {source}")]
    EstimationFailed {
        #[source]
        source: Box<LedgerError>,
    },

    #[error("Transaction {tx} reverted")]
    Reverted { tx: TxHash },

    #[error("Timed out waiting for {what}")]
    Timeout { what: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("ABI decoding failed: {0}")]
    Abi(String),
}

impl LedgerError {
    /// Wrap an error raised while estimating gas for a write
    pub fn estimation(source: LedgerError) -> Self {
        Self::EstimationFailed {
            source: Box::new(source),
        }
    }
}

/// Swap flow errors, the closed taxonomy every ledger failure is classified into
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Fee rate {bps} bps is outside [0, 10000]")]
    InvalidFeeRate { bps: String },

    #[error("Insufficient balance: {reason}")]
    InsufficientBalance { reason: String },

    #[error("Insufficient allowance: {reason}")]
    InsufficientAllowance { reason: String },

    #[error("Transaction rejected by user")]
    UserRejected,

    #[error("Transaction would fail: {reason}")]
    TransactionWouldFail { reason: String },

    #[error("Swap failed: {detail}")]
    UnknownFailure { detail: String },

    #[error("Another swap is already in flight")]
    SwapInProgress,

    #[error("Swap state unavailable: {reason}")]
    StateUnavailable { reason: String },

    #[error("Quote mismatch: local {local}, ledger {ledger}")]
    QuoteMismatch { local: String, ledger: String },
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

impl SwapError {
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }

    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InvalidFeeRate { .. } => "invalid_fee_rate",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::InsufficientAllowance { .. } => "insufficient_allowance",
            Self::UserRejected => "user_rejected",
            Self::TransactionWouldFail { .. } => "transaction_would_fail",
            Self::UnknownFailure { .. } => "swap_failed",
            Self::SwapInProgress => "swap_in_progress",
            Self::StateUnavailable { .. } => "state_unavailable",
            Self::QuoteMismatch { .. } => "quote_mismatch",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } => 400,
            Self::InsufficientBalance { .. } | Self::InsufficientAllowance { .. } => 422,
            Self::TransactionWouldFail { .. } | Self::QuoteMismatch { .. } => 422,
            Self::UserRejected | Self::SwapInProgress => 409,
            Self::StateUnavailable { .. } => 503,
            Self::InvalidFeeRate { .. } | Self::UnknownFailure { .. } => 502,
        }
    }

    /// The single message shown to the user for this class.
    ///
    /// Never includes transport details; those stay in the `Display` output for logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidAmount { message } => format!("Invalid amount: {}", message),
            Self::InsufficientBalance { .. } => "Insufficient balance".to_string(),
            Self::InsufficientAllowance { .. } => {
                "Token approval was not confirmed. Please retry the swap.".to_string()
            }
            Self::UserRejected => "Transaction cancelled".to_string(),
            Self::TransactionWouldFail { .. } => "Transaction would fail".to_string(),
            Self::SwapInProgress => "A swap is already in progress".to_string(),
            Self::StateUnavailable { .. } => "Swap is temporarily unavailable".to_string(),
            Self::QuoteMismatch { .. } => {
                "The quote changed. Please review and try again.".to_string()
            }
            Self::InvalidFeeRate { .. } | Self::UnknownFailure { .. } => "Swap failed".to_string(),
        }
    }

    /// Neutral outcomes end the flow without counting as failures
    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::UserRejected | Self::SwapInProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_error_codes() {
        let err = SwapError::invalid_amount("empty input");
        assert_eq!(err.error_code(), "invalid_amount");
        assert_eq!(err.status_code(), 400);

        let err = SwapError::InsufficientBalance {
            reason: "balance is zero".into(),
        };
        assert_eq!(err.error_code(), "insufficient_balance");
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_unknown_failure_hides_detail() {
        let err = SwapError::UnknownFailure {
            detail: "connection reset by peer".into(),
        };
        assert_eq!(err.user_message(), "Swap failed");
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_user_rejected_is_neutral() {
        assert!(SwapError::UserRejected.is_neutral());
        assert!(!SwapError::TransactionWouldFail {
            reason: "revert".into()
        }
        .is_neutral());
    }

    #[test]
    fn test_estimation_wraps_source() {
        let err = LedgerError::estimation(LedgerError::Rpc {
            code: 3,
            message: "execution reverted".into(),
            data: None,
        });
        assert!(err.to_string().starts_with("Gas estimation failed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
