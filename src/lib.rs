//! CQT Cross-Chain Arbitrage Bot - Orchestration core
//!
//! Monitors CQT liquidity pools on Polygon and Base, detects price
//! divergences between them, and drives profitable ones through a
//! sell / bridge / rebuy execution sequence with full ledger tracking.

pub mod config;
pub mod types;
pub mod errors;
pub mod contracts;
pub mod network;
pub mod pools;
pub mod arbitrage;
pub mod execution;
pub mod storage;
pub mod monitor;
pub mod utils;

// Re-export commonly used items
pub use config::Config;
pub use errors::{ArbError, ArbResult};
pub use types::*;

// Type alias for our concrete provider
pub type ConcreteProvider = alloy::providers::RootProvider<alloy::transports::BoxTransport>;
