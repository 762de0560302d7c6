//! In-memory ledger of bridge transfers and running metrics

use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, warn};
use crate::types::{BridgeStatus, BridgeTransaction, ExecutionMetrics, ExecutionOutcome};

/// Tracks every bridge transfer from submission to its terminal state.
/// A transfer lives in exactly one of the pending or completed sets; failed
/// transfers stay visible in pending so stuck funds are never forgotten.
pub struct ExecutionLedger {
    pending: RwLock<HashMap<String, BridgeTransaction>>,
    completed: RwLock<Vec<BridgeTransaction>>,
    metrics: RwLock<ExecutionMetrics>,
}

impl ExecutionLedger {
    pub fn new() -> Self {
        Self {
            pending: RwLock::new(HashMap::new()),
            completed: RwLock::new(Vec::new()),
            metrics: RwLock::new(ExecutionMetrics::new()),
        }
    }

    pub async fn record_pending(&self, tx: BridgeTransaction) {
        let mut pending = self.pending.write().await;
        if pending.contains_key(&tx.tx_hash) {
            warn!("⚠️ Bridge transaction {} already tracked, ignoring", tx.tx_hash);
            return;
        }
        info!(
            "🌉 Tracking bridge transfer {} ({} -> {}, {} CQT)",
            tx.tx_hash, tx.source_network, tx.target_network, tx.amount
        );
        pending.insert(tx.tx_hash.clone(), tx);
    }

    /// Move a pending transfer to completed. Returns the confirmed record,
    /// or None when the hash was never tracked or already confirmed.
    pub async fn confirm(&self, tx_hash: &str) -> Option<BridgeTransaction> {
        let mut pending = self.pending.write().await;
        let Some(mut tx) = pending.remove(tx_hash) else {
            warn!("⚠️ Confirmation for unknown bridge transaction {}", tx_hash);
            return None;
        };
        drop(pending);

        let now = Utc::now();
        tx.status = BridgeStatus::Confirmed;
        tx.confirmed_at = Some(now);
        tx.confirmation_secs = Some((now - tx.submitted_at).num_seconds().max(0) as u64);

        info!(
            "✅ Bridge transfer {} confirmed after {}s",
            tx.tx_hash,
            tx.confirmation_secs.unwrap_or(0)
        );
        self.completed.write().await.push(tx.clone());
        Some(tx)
    }

    /// Mark a pending transfer failed. The record stays in the pending set;
    /// the funds it represents may still be in flight.
    pub async fn fail(&self, tx_hash: &str, reason: &str) {
        let mut pending = self.pending.write().await;
        match pending.get_mut(tx_hash) {
            Some(tx) => {
                tx.status = BridgeStatus::Failed;
                warn!(
                    "❌ Bridge transfer {} marked failed ({}), funds unresolved",
                    tx_hash, reason
                );
            }
            None => warn!("⚠️ Failure for unknown bridge transaction {}: {}", tx_hash, reason),
        }
    }

    pub async fn note_gas_used(&self, tx_hash: &str, gas_used: u64) {
        let mut pending = self.pending.write().await;
        if let Some(tx) = pending.get_mut(tx_hash) {
            tx.gas_used = gas_used;
        }
    }

    pub async fn get_pending(&self) -> Vec<BridgeTransaction> {
        self.pending.read().await.values().cloned().collect()
    }

    pub async fn get_completed(&self) -> Vec<BridgeTransaction> {
        self.completed.read().await.clone()
    }

    pub async fn update_metrics(&self, outcome: &ExecutionOutcome) {
        self.metrics.write().await.record(outcome);
    }

    pub async fn metrics(&self) -> ExecutionMetrics {
        self.metrics.read().await.clone()
    }
}

impl Default for ExecutionLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use crate::types::Network;

    fn bridge_tx(hash: &str) -> BridgeTransaction {
        BridgeTransaction::pending(
            hash.to_string(),
            Network::Polygon,
            Network::Base,
            dec!(1000),
        )
    }

    #[tokio::test]
    async fn confirm_moves_pending_to_completed() {
        let ledger = ExecutionLedger::new();
        ledger.record_pending(bridge_tx("0xabc")).await;
        assert_eq!(ledger.get_pending().await.len(), 1);
        assert!(ledger.get_completed().await.is_empty());

        let confirmed = ledger.confirm("0xabc").await.unwrap();
        assert_eq!(confirmed.status, BridgeStatus::Confirmed);
        assert!(confirmed.confirmed_at.is_some());
        assert!(confirmed.confirmation_secs.is_some());

        assert!(ledger.get_pending().await.is_empty());
        assert_eq!(ledger.get_completed().await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_and_unknown_hashes_are_ignored() {
        let ledger = ExecutionLedger::new();
        ledger.record_pending(bridge_tx("0xabc")).await;
        ledger.record_pending(bridge_tx("0xabc")).await;
        assert_eq!(ledger.get_pending().await.len(), 1);

        assert!(ledger.confirm("0xmissing").await.is_none());
        ledger.fail("0xmissing", "test").await;
        assert_eq!(ledger.get_pending().await.len(), 1);
        assert!(ledger.get_completed().await.is_empty());
    }

    #[tokio::test]
    async fn confirm_is_not_repeatable() {
        let ledger = ExecutionLedger::new();
        ledger.record_pending(bridge_tx("0xabc")).await;
        assert!(ledger.confirm("0xabc").await.is_some());
        assert!(ledger.confirm("0xabc").await.is_none());
        assert_eq!(ledger.get_completed().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_transfer_stays_visible_in_pending() {
        let ledger = ExecutionLedger::new();
        ledger.record_pending(bridge_tx("0xdead")).await;
        ledger.fail("0xdead", "bridge rejected").await;

        let pending = ledger.get_pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, BridgeStatus::Failed);
        assert!(ledger.get_completed().await.is_empty());
    }

    #[tokio::test]
    async fn gas_usage_is_recorded_on_pending_transfers() {
        let ledger = ExecutionLedger::new();
        ledger.record_pending(bridge_tx("0xabc")).await;
        ledger.note_gas_used("0xabc", 210_000).await;

        let confirmed = ledger.confirm("0xabc").await.unwrap();
        assert_eq!(confirmed.gas_used, 210_000);
    }

    #[tokio::test]
    async fn metrics_accumulate_outcomes() {
        let ledger = ExecutionLedger::new();
        ledger
            .update_metrics(&ExecutionOutcome {
                opportunity_id: "a".to_string(),
                success: true,
                partial_failure: false,
                profit: dec!(120),
                gas_cost: dec!(3),
            })
            .await;
        ledger
            .update_metrics(&ExecutionOutcome {
                opportunity_id: "b".to_string(),
                success: false,
                partial_failure: true,
                profit: dec!(0),
                gas_cost: dec!(2),
            })
            .await;

        let metrics = ledger.metrics().await;
        assert_eq!(metrics.total_arbitrages, 2);
        assert_eq!(metrics.successful_arbitrages, 1);
        assert_eq!(metrics.partial_failures, 1);
        assert_eq!(metrics.total_profit, dec!(120));
        assert_eq!(metrics.total_gas_cost, dec!(5));
        assert!((metrics.success_rate_pct() - 50.0).abs() < f64::EPSILON);
    }
}
