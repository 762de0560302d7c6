//! Chain clients and connection management

pub mod client;
pub mod retry;
pub mod rpc;

#[cfg(test)]
pub mod mock;

pub use client::*;
pub use retry::*;
pub use rpc::*;
