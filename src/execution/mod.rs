//! Trade execution engine

pub mod executor;

pub use executor::*;
