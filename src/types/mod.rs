//! Core data types and structures

pub mod network;
pub mod pools;
pub mod arbitrage;
pub mod bridge;
pub mod execution;
pub mod metrics;

pub use network::*;
pub use pools::*;
pub use arbitrage::*;
pub use bridge::*;
pub use execution::*;
pub use metrics::*;
