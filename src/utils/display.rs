//! Display and printing utilities

use chrono::Utc;
use tracing::info;
use crate::types::{ArbitrageOpportunity, ExecutionMetrics, ExecutionReport};

pub fn print_opportunity(opp: &ArbitrageOpportunity) {
    info!("\n💎 Arbitrage Opportunity {}", opp.id);
    info!(
        "   Source: {} pool {:?} @ {}",
        opp.source_pool.network, opp.source_pool.address, opp.source_pool.price
    );
    info!(
        "   Target: {} pool {:?} @ {}",
        opp.target_pool.network, opp.target_pool.address, opp.target_pool.price
    );
    info!("   Gap: {:.4}%", opp.profit_potential_pct);
    info!("   Size: {} CQT", opp.required_amount);
    info!(
        "   Gross {} - cost {} = net {}",
        opp.gross_profit, opp.execution_cost, opp.net_profit
    );
    info!("   Confidence: {}", opp.confidence);
}

pub fn print_execution_report(report: &ExecutionReport) {
    info!("\n🧾 Execution {} ({})", report.id, report.opportunity_id);
    info!("   Final state: {}", report.final_state);
    if let Some(hash) = &report.source_tx_hash {
        info!("   Source trade: {}", hash);
    }
    if let Some(hash) = &report.bridge_tx_hash {
        info!("   Bridge: {}", hash);
    }
    if let Some(hash) = &report.target_tx_hash {
        info!("   Target trade: {}", hash);
    }
    info!("   Gas spent: {} wei", report.gas_spent_wei);
    info!("   Realized profit: {}", report.realized_profit);
}

pub fn print_final_statistics(metrics: &ExecutionMetrics) {
    let uptime_mins = (Utc::now() - metrics.uptime_start).num_minutes();

    info!("\n📊 Final Statistics ({} minutes)", uptime_mins);
    info!("   Total arbitrages: {}", metrics.total_arbitrages);
    info!("   Successful: {}", metrics.successful_arbitrages);
    info!("   Partial failures: {}", metrics.partial_failures);
    info!("   Success rate: {:.1}%", metrics.success_rate_pct());
    info!("   Total profit: {} CQT", metrics.total_profit);
    info!("   Total gas cost: {}", metrics.total_gas_cost);
}
