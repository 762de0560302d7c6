//! Bridge transfer tracking types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BridgeStatus {
    Pending,
    Confirmed,
    Failed,
}

/// One cross-chain transfer, recorded in the ledger the moment it is
/// submitted so a crash mid-flight leaves a durable in-flight record.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeTransaction {
    pub tx_hash: String,
    pub source_network: Network,
    pub target_network: Network,
    pub amount: Decimal,
    pub status: BridgeStatus,
    pub submitted_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmation_secs: Option<u64>,
    pub gas_used: u64,
}

impl BridgeTransaction {
    pub fn pending(
        tx_hash: String,
        source_network: Network,
        target_network: Network,
        amount: Decimal,
    ) -> Self {
        Self {
            tx_hash,
            source_network,
            target_network,
            amount,
            status: BridgeStatus::Pending,
            submitted_at: Utc::now(),
            confirmed_at: None,
            confirmation_secs: None,
            gas_used: 0,
        }
    }
}
