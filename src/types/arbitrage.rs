//! Arbitrage opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::PoolSnapshot;

/// A profitable price divergence between two pools, sized and costed.
///
/// Invariants held by construction: `source_pool.price >= target_pool.price`
/// (sell where the asset is overpriced, buy where it is underpriced) and
/// `net_profit = gross_profit - execution_cost > 0`.
#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageOpportunity {
    pub id: String,
    pub detected_at: DateTime<Utc>,
    pub source_pool: PoolSnapshot,
    pub target_pool: PoolSnapshot,
    pub profit_potential_pct: Decimal,
    pub required_amount: Decimal,
    pub execution_cost: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
    pub confidence: Decimal,
}

impl ArbitrageOpportunity {
    pub fn is_cross_network(&self) -> bool {
        self.source_pool.network != self.target_pool.network
    }
}
