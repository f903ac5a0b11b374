//! pegswap-api: HTTP API layer for the peg swap service
//!
//! Exposes quotes, previews and swap submission to the frontend.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{AppState, Orchestrator};
