//! Pool state tracking

pub mod oracle;

pub use oracle::*;
