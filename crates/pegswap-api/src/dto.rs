//! Data Transfer Objects for API requests and responses

use axum::{http::StatusCode, Json};
use peg_core::{Asset, Direction, SwapError};
use pegswap::{ConversionQuote, SwapOutcome, SwapPreview};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Node status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStatusResponse {
    pub connected: bool,
    pub url: String,
    pub network: String,
    pub chain_id: Option<u64>,
    pub block_number: u64,
    pub syncing: bool,
}

/// Query for `GET /swap/state`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateQuery {
    pub account: Option<String>,
}

/// Quote request; `amount` is human-readable in the source asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub direction: String,
    pub amount: String,
}

/// Quote response, amounts in base units plus a display value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub direction: Direction,
    pub source: Asset,
    pub dest: Asset,
    pub fee_bps: u16,
    #[serde(with = "pegswap::serde_amount")]
    pub amount_in: alloy_primitives::U256,
    #[serde(flatten)]
    pub quote: ConversionQuote,
    /// `net_out` formatted in the destination precision
    pub net_out_display: String,
}

/// Preview and submit request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    pub direction: String,
    pub amount: String,
    pub account: String,
}

/// Preview response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    #[serde(flatten)]
    pub preview: SwapPreview,
    pub warnings: Vec<String>,
}

/// Submit response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: SwapOutcome,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Error half of every handler result
pub type ErrorResponse = (StatusCode, Json<ApiError>);

/// Render a swap error with its class status and user-facing message
pub fn swap_error(err: SwapError) -> ErrorResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiError::new(err.error_code(), err.user_message())),
    )
}
