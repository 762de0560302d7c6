//! Continuous monitoring loop tying detection to execution

use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use crate::arbitrage::{ConfidenceScorer, detect};
use crate::config::Config;
use crate::execution::CrossChainExecutor;
use crate::pools::PoolOracle;
use crate::storage::{
    ExecutionLedger, save_execution_failure, save_execution_report, save_metrics,
    save_opportunity,
};
use crate::types::ExecutionOutcome;
use crate::utils::display::{print_execution_report, print_opportunity};
use crate::utils::math::from_wei;

/// Snapshot, detect, execute, repeat. One instance owns the whole cycle;
/// `stop` flips a flag the loop observes between cycles.
pub struct MonitoringLoop {
    oracle: Arc<PoolOracle>,
    scorer: Arc<dyn ConfidenceScorer>,
    executor: Arc<CrossChainExecutor>,
    ledger: Arc<ExecutionLedger>,
    config: Arc<Config>,
    running: AtomicBool,
}

impl MonitoringLoop {
    pub fn new(
        oracle: Arc<PoolOracle>,
        scorer: Arc<dyn ConfidenceScorer>,
        executor: Arc<CrossChainExecutor>,
        ledger: Arc<ExecutionLedger>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            oracle,
            scorer,
            executor,
            ledger,
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Idempotent; safe to call from a signal handler.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("🛑 Monitoring loop stop requested");
        }
    }

    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("⚠️ Monitoring loop already running");
            return;
        }
        info!(
            "🔄 Monitoring loop started ({}s interval, top {} opportunities)",
            self.config.monitoring_interval_secs, self.config.top_k_opportunities
        );

        while self.is_running() {
            self.run_cycle().await;
            tokio::time::sleep(Duration::from_secs(self.config.monitoring_interval_secs)).await;
        }
        info!("🛑 Monitoring loop stopped");
    }

    pub async fn run_cycle(&self) {
        let snapshots = self.oracle.snapshot_all().await;
        if snapshots.is_empty() {
            warn!("⚠️ No pool snapshots this cycle, skipping detection");
            return;
        }

        let opportunities = detect(&snapshots, &self.config, self.scorer.as_ref());
        if opportunities.is_empty() {
            debug!("No opportunities across {} pools", snapshots.len());
            return;
        }
        info!("🔍 Detected {} opportunities", opportunities.len());

        for opportunity in &opportunities {
            if let Err(e) = save_opportunity(opportunity) {
                error!("❌ Failed to persist opportunity {}: {}", opportunity.id, e);
            }
        }

        let mut executed = 0u32;
        for opportunity in opportunities.iter().take(self.config.top_k_opportunities) {
            if opportunity.confidence <= self.config.confidence_execution_threshold {
                debug!(
                    "Skipping {} at confidence {}",
                    opportunity.id, opportunity.confidence
                );
                continue;
            }

            // Executions within one cycle are spaced out to respect RPC rate limits.
            if executed > 0 {
                tokio::time::sleep(Duration::from_secs(self.config.inter_execution_pause_secs))
                    .await;
            }
            executed += 1;
            print_opportunity(opportunity);

            let outcome = match self.executor.execute(opportunity).await {
                Ok(report) => {
                    print_execution_report(&report);
                    if let Err(e) = save_execution_report(&report) {
                        error!("❌ Failed to persist execution report: {}", e);
                    }
                    ExecutionOutcome {
                        opportunity_id: opportunity.id.clone(),
                        success: true,
                        partial_failure: false,
                        profit: report.realized_profit,
                        gas_cost: from_wei(report.gas_spent_wei),
                    }
                }
                Err(failure) => {
                    if failure.funds_in_flight() {
                        error!(
                            "🚨 PARTIAL FAILURE executing {}: {} (funds need reconciliation)",
                            opportunity.id, failure
                        );
                    } else {
                        warn!("⚠️ Execution of {} aborted cleanly: {}", opportunity.id, failure);
                    }
                    if let Err(e) = save_execution_failure(&failure) {
                        error!("❌ Failed to persist execution failure: {}", e);
                    }
                    ExecutionOutcome {
                        opportunity_id: opportunity.id.clone(),
                        success: false,
                        partial_failure: failure.funds_in_flight(),
                        profit: Decimal::ZERO,
                        gas_cost: from_wei(failure.gas_spent_wei),
                    }
                }
            };
            self.ledger.update_metrics(&outcome).await;
        }

        let metrics = self.ledger.metrics().await;
        if let Err(e) = save_metrics(&metrics) {
            debug!("Metrics snapshot not persisted: {}", e);
        }
    }
}
