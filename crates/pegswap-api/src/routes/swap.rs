//! Peg swap endpoints

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use peg_core::Direction;
use pegswap::{
    fetch_fee_rate, fetch_swap_state, format_amount, parse_amount, quote_str, FeeBps, SwapState,
};

use crate::dto::{
    swap_error, ApiError, ErrorResponse, PreviewResponse, QuoteRequest, QuoteResponse, StateQuery,
    SubmitResponse, SwapRequest,
};
use crate::AppState;

/// Create swap routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state))
        .route("/quote", post(quote))
        .route("/preview", post(preview))
        .route("/submit", post(submit))
}

fn parse_direction(raw: &str) -> Result<Direction, ErrorResponse> {
    Direction::from_str(raw).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("invalid_direction", e.to_string())),
        )
    })
}

fn parse_account(raw: &str) -> Result<Address, ErrorResponse> {
    Address::from_str(raw.trim()).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                "invalid_account",
                format!("'{}' is not a 20-byte hex address", raw),
            )),
        )
    })
}

/// Validated direction, base-unit amount and account of a swap request
fn parse_swap_request(
    state: &AppState,
    request: &SwapRequest,
) -> Result<(Direction, U256, Address), ErrorResponse> {
    let direction = parse_direction(&request.direction)?;
    let account = parse_account(&request.account)?;
    let (source, _) = state.deployment().assets(direction);
    let amount = parse_amount(&request.amount, source.decimals).map_err(swap_error)?;
    Ok((direction, amount, account))
}

/// GET /swap/state - Fee rate, assets and optionally one account's holdings
pub async fn get_state(
    State(state): State<AppState>,
    Query(query): Query<StateQuery>,
) -> Result<Json<SwapState>, ErrorResponse> {
    let account = query.account.as_deref().map(parse_account).transpose()?;
    let orchestrator = state.orchestrator();

    let swap_state = fetch_swap_state(
        orchestrator.ledger(),
        orchestrator.controller(),
        orchestrator.deployment(),
        account,
    )
    .await
    .map_err(swap_error)?;

    Ok(Json(swap_state))
}

/// POST /swap/quote - Quote a human-readable amount
///
/// Only redeems read the ledger, for the fee rate.
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ErrorResponse> {
    let direction = parse_direction(&request.direction)?;
    let (source, dest) = state.deployment().assets(direction);

    let fee = if direction.charges_fee() {
        fetch_fee_rate(state.orchestrator().controller())
            .await
            .map_err(swap_error)?
    } else {
        FeeBps::ZERO
    };

    let (amount_in, quote) =
        quote_str(direction, &request.amount, fee, source, dest).map_err(swap_error)?;

    Ok(Json(QuoteResponse {
        direction,
        source: source.clone(),
        dest: dest.clone(),
        fee_bps: fee.get(),
        amount_in,
        net_out_display: format_amount(quote.net_out, dest.decimals),
        quote,
    }))
}

/// POST /swap/preview - Clamp and quote against live balances
pub async fn preview(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> Result<Json<PreviewResponse>, ErrorResponse> {
    let (direction, amount, account) = parse_swap_request(&state, &request)?;
    let preview = state
        .orchestrator()
        .preview(account, amount, direction)
        .await
        .map_err(swap_error)?;

    let (source, _) = state.deployment().assets(direction);
    let mut warnings = Vec::new();
    if preview.safe_amount.is_zero() {
        warnings.push(format!("No {} available to swap", source.symbol));
    } else if preview.is_clamped() {
        warnings.push(format!(
            "Amount reduced to {} {} to fit your balance",
            format_amount(preview.safe_amount, source.decimals),
            source.symbol
        ));
    }
    if preview.needs_approval {
        warnings.push(format!(
            "An approval for {} will be sent before the swap",
            source.symbol
        ));
    }

    Ok(Json(PreviewResponse { preview, warnings }))
}

/// POST /swap/submit - Run the full swap flow
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SwapRequest>,
) -> Result<Json<SubmitResponse>, ErrorResponse> {
    let (direction, amount, account) = parse_swap_request(&state, &request)?;
    let outcome = state
        .orchestrator()
        .swap(account, amount, direction)
        .await
        .map_err(swap_error)?;

    Ok(Json(SubmitResponse {
        message: format!("Swap confirmed in block {}", outcome.receipt.block_number),
        outcome,
    }))
}
