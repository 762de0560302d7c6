//! Custom error types for the bot

use rust_decimal::Decimal;
use thiserror::Error;
use crate::types::Network;

#[derive(Error, Debug)]
pub enum ArbError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Insufficient {token} balance on {network}: need {required}, have {available}")]
    InsufficientBalance {
        network: Network,
        token: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("Trade execution failed on {network} pool {pool}: {message}")]
    TradeExecution {
        network: Network,
        pool: String,
        message: String,
    },

    #[error("Bridge submission failed ({source_network} -> {target_network}): {message}")]
    BridgeSubmission {
        source_network: Network,
        target_network: Network,
        message: String,
    },

    #[error("Bridge transfer {tx_hash} not confirmed after {waited_secs}s")]
    BridgeTimeout { tx_hash: String, waited_secs: u64 },

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type ArbResult<T> = Result<T, ArbError>;
