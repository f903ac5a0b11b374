//! Command handlers

pub mod node;
pub mod serve;
pub mod swap;
