//! Process-lifetime execution metrics

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::ExecutionOutcome;

/// Aggregate counters, monotonically updated after every execution attempt.
/// Persisted periodically for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionMetrics {
    pub total_arbitrages: u64,
    pub successful_arbitrages: u64,
    pub partial_failures: u64,
    pub total_profit: Decimal,
    pub total_gas_cost: Decimal,
    pub uptime_start: DateTime<Utc>,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            total_arbitrages: 0,
            successful_arbitrages: 0,
            partial_failures: 0,
            total_profit: Decimal::ZERO,
            total_gas_cost: Decimal::ZERO,
            uptime_start: Utc::now(),
        }
    }

    pub fn record(&mut self, outcome: &ExecutionOutcome) {
        self.total_arbitrages += 1;
        if outcome.success {
            self.successful_arbitrages += 1;
        }
        if outcome.partial_failure {
            self.partial_failures += 1;
        }
        self.total_profit += outcome.profit;
        self.total_gas_cost += outcome.gas_cost;
    }

    pub fn success_rate_pct(&self) -> f64 {
        if self.total_arbitrages == 0 {
            return 0.0;
        }
        self.successful_arbitrages as f64 / self.total_arbitrages as f64 * 100.0
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}
