//! Execution state machine and outcome types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use crate::errors::ArbError;

/// States of one opportunity's execution. Strictly forward-moving; `Failed`
/// is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ExecutionState {
    Init,
    PrerequisitesChecked,
    SourceTraded,
    Bridged,
    BridgeConfirmed,
    TargetTraded,
    Done,
    Failed,
}

impl ExecutionState {
    /// Once the source trade confirms, funds have left their original form.
    /// A failure from here on is a partial failure that needs operator
    /// reconciliation, not a clean abort.
    pub fn funds_in_flight(&self) -> bool {
        matches!(
            self,
            ExecutionState::SourceTraded
                | ExecutionState::Bridged
                | ExecutionState::BridgeConfirmed
        )
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionState::Init => "Init",
            ExecutionState::PrerequisitesChecked => "PrerequisitesChecked",
            ExecutionState::SourceTraded => "SourceTraded",
            ExecutionState::Bridged => "Bridged",
            ExecutionState::BridgeConfirmed => "BridgeConfirmed",
            ExecutionState::TargetTraded => "TargetTraded",
            ExecutionState::Done => "Done",
            ExecutionState::Failed => "Failed",
        };
        write!(f, "{name}")
    }
}

/// Record of a completed execution.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub id: String,
    pub opportunity_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub final_state: ExecutionState,
    pub source_tx_hash: Option<String>,
    pub bridge_tx_hash: Option<String>,
    pub target_tx_hash: Option<String>,
    pub gas_spent_wei: u128,
    pub realized_profit: Decimal,
}

/// A failed execution, carrying the state the machine had reached so callers
/// can tell a clean abort from a partial failure with funds in transit.
#[derive(Debug)]
pub struct ExecutionFailure {
    pub opportunity_id: String,
    pub state_reached: ExecutionState,
    pub error: ArbError,
    pub gas_spent_wei: u128,
}

impl ExecutionFailure {
    pub fn funds_in_flight(&self) -> bool {
        self.state_reached.funds_in_flight()
    }
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "execution of {} failed at {}: {}",
            self.opportunity_id, self.state_reached, self.error
        )
    }
}

impl std::error::Error for ExecutionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Ledger-facing summary of one execution attempt.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub opportunity_id: String,
    pub success: bool,
    pub partial_failure: bool,
    pub profit: Decimal,
    pub gas_cost: Decimal,
}
