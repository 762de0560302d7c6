//! Execution outcome storage

use anyhow::Result;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::info;
use crate::types::{ExecutionFailure, ExecutionMetrics, ExecutionReport};

pub fn save_execution_report(report: &ExecutionReport) -> Result<()> {
    let filename = format!("output/executions/arbitrage_{}.jsonl",
        Utc::now().format("%Y-%m-%d"));

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    writeln!(file, "{}", serde_json::to_string(report)?)?;

    info!(
        execution_id = %report.id,
        final_state = %report.final_state,
        realized_profit = %report.realized_profit,
        "Saved execution report"
    );

    Ok(())
}

pub fn save_execution_failure(failure: &ExecutionFailure) -> Result<()> {
    let filename = format!("output/executions/failures_{}.jsonl",
        Utc::now().format("%Y-%m-%d"));

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&filename)?;

    let record = serde_json::json!({
        "recorded_at": Utc::now(),
        "opportunity_id": failure.opportunity_id,
        "state_reached": failure.state_reached.to_string(),
        "funds_in_flight": failure.funds_in_flight(),
        "gas_spent_wei": failure.gas_spent_wei.to_string(),
        "error": failure.error.to_string(),
    });
    writeln!(file, "{}", record)?;

    info!(
        opportunity_id = %failure.opportunity_id,
        state_reached = %failure.state_reached,
        "Saved execution failure"
    );

    Ok(())
}

/// Metrics are a single rolling snapshot, overwritten on every cycle.
pub fn save_metrics(metrics: &ExecutionMetrics) -> Result<()> {
    std::fs::write(
        "output/metrics/metrics.json",
        serde_json::to_string_pretty(metrics)?,
    )?;
    Ok(())
}
