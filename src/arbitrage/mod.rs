//! Arbitrage detection and confidence scoring

pub mod detector;
pub mod scorer;

pub use detector::*;
pub use scorer::*;
