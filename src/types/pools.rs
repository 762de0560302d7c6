//! Pool configuration and snapshot types

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use super::Network;

/// A pool the bot is configured to monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    pub address: Address,
    pub network: Network,
    pub token0: String,
    pub token1: String,
    #[serde(default = "default_fee_tier")]
    pub fee_tier: u32,
}

fn default_fee_tier() -> u32 {
    3000
}

/// Point-in-time observation of one pool. Immutable once created; a fresh
/// snapshot for the same address supersedes the previous one.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSnapshot {
    pub address: Address,
    pub network: Network,
    pub token0: String,
    pub token1: String,
    pub fee_tier: u32,
    pub liquidity: u128,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl PoolSnapshot {
    /// Two pools quote the same market when they sit on the same network and
    /// reference the same ordered token pair. Comparing those would only
    /// produce self-arbitrage noise.
    pub fn same_market(&self, other: &PoolSnapshot) -> bool {
        self.network == other.network
            && self.token0 == other.token0
            && self.token1 == other.token1
    }
}
