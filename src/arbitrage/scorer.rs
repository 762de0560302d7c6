//! Confidence scoring for detected price gaps

use alloy::primitives::Address;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;
use crate::types::PoolSnapshot;

/// How believable a price gap is, in [0, 1]. Implementations must be cheap;
/// the scorer runs inside the monitoring loop for every candidate pair.
pub trait ConfidenceScorer: Send + Sync {
    fn score(&self, source: &PoolSnapshot, target: &PoolSnapshot, amount: Decimal) -> Decimal;
}

/// Fixed score, for wiring tests and dry runs.
pub struct ConstantScorer(pub Decimal);

impl ConfidenceScorer for ConstantScorer {
    fn score(&self, _source: &PoolSnapshot, _target: &PoolSnapshot, _amount: Decimal) -> Decimal {
        self.0.clamp(Decimal::ZERO, Decimal::ONE)
    }
}

const HISTORY_WINDOW_MINUTES: i64 = 60;
const DEFAULT_VOLATILITY: Decimal = dec!(0.3);
const MIN_CONFIDENCE: Decimal = dec!(0.10);
const MAX_CONFIDENCE: Decimal = dec!(0.95);

/// Price-gap heuristic: a wider gap raises confidence, thin liquidity and
/// recent volatility pull it back down.
pub struct HeuristicScorer {
    price_history: Mutex<HashMap<Address, Vec<(DateTime<Utc>, Decimal)>>>,
}

impl HeuristicScorer {
    pub fn new() -> Self {
        Self {
            price_history: Mutex::new(HashMap::new()),
        }
    }

    fn record_and_measure_volatility(&self, snapshot: &PoolSnapshot) -> Decimal {
        let mut history = match self.price_history.lock() {
            Ok(history) => history,
            Err(poisoned) => poisoned.into_inner(),
        };
        let cutoff = Utc::now() - ChronoDuration::minutes(HISTORY_WINDOW_MINUTES);
        let series = history.entry(snapshot.address).or_default();
        series.retain(|(at, _)| *at >= cutoff);
        series.push((snapshot.observed_at, snapshot.price));

        if series.len() < 2 {
            return DEFAULT_VOLATILITY;
        }

        let mut total_move = Decimal::ZERO;
        let mut moves = 0u32;
        for pair in series.windows(2) {
            let (_, previous) = pair[0];
            let (_, current) = pair[1];
            if previous > Decimal::ZERO {
                total_move += ((current - previous) / previous).abs();
                moves += 1;
            }
        }
        if moves == 0 {
            return DEFAULT_VOLATILITY;
        }
        total_move / Decimal::from(moves)
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfidenceScorer for HeuristicScorer {
    fn score(&self, source: &PoolSnapshot, target: &PoolSnapshot, amount: Decimal) -> Decimal {
        if source.price <= Decimal::ZERO
            || target.price <= Decimal::ZERO
            || amount <= Decimal::ZERO
            || source.liquidity == 0
            || target.liquidity == 0
        {
            warn!(
                "⚠️ Degenerate scoring input for pools {:?}/{:?}, defaulting to 0.5",
                source.address, target.address
            );
            return dec!(0.5);
        }

        let price_gap = (source.price - target.price).abs() / source.price.max(target.price);

        let thinner = source.liquidity.min(target.liquidity);
        let thinner = Decimal::from_u128(thinner).unwrap_or(Decimal::MAX);
        let liquidity_score = (thinner / amount).min(Decimal::ONE);

        let source_volatility = self.record_and_measure_volatility(source);
        let target_volatility = self.record_and_measure_volatility(target);
        let volatility = source_volatility.max(target_volatility);
        let volatility_penalty = (Decimal::ONE - dec!(2) * volatility).max(Decimal::ZERO);

        let raw = price_gap * dec!(20) * liquidity_score * volatility_penalty;
        raw.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }
}
