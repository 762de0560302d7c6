//! Error handling for the arbitrage core

pub mod arb_error;

pub use arb_error::*;
