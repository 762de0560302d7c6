//! Opportunity detection over pool snapshots

use chrono::Utc;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::debug;
use uuid::Uuid;
use crate::arbitrage::scorer::ConfidenceScorer;
use crate::config::Config;
use crate::types::{ArbitrageOpportunity, PoolSnapshot};

/// Share of the thinner pool's liquidity a single position may consume.
const POSITION_LIQUIDITY_FRACTION: Decimal = dec!(0.01);

/// Compare every pair of snapshots and return executable opportunities,
/// best net profit first. Pools quoting the same market on the same network
/// are never paired against each other.
pub fn detect(
    snapshots: &[PoolSnapshot],
    config: &Config,
    scorer: &dyn ConfidenceScorer,
) -> Vec<ArbitrageOpportunity> {
    let mut opportunities = Vec::new();

    for (i, a) in snapshots.iter().enumerate() {
        for b in snapshots.iter().skip(i + 1) {
            if a.same_market(b) {
                continue;
            }
            if let Some(opportunity) = evaluate_pair(a, b, config, scorer) {
                opportunities.push(opportunity);
            }
        }
    }

    opportunities.sort_by(|x, y| y.net_profit.cmp(&x.net_profit));
    opportunities
}

fn evaluate_pair(
    a: &PoolSnapshot,
    b: &PoolSnapshot,
    config: &Config,
    scorer: &dyn ConfidenceScorer,
) -> Option<ArbitrageOpportunity> {
    if a.price <= Decimal::ZERO || b.price <= Decimal::ZERO {
        return None;
    }

    let diff = (a.price - b.price).abs();
    let avg = (a.price + b.price) / dec!(2);
    let price_diff_pct = diff / avg * dec!(100);
    if price_diff_pct <= config.min_profit_threshold_pct {
        return None;
    }

    // Sell where CQT is dear, rebuy where it is cheap.
    let (source, target) = if a.price >= b.price { (a, b) } else { (b, a) };

    let thinner_liquidity = Decimal::from_u128(source.liquidity.min(target.liquidity))?;
    let required_amount =
        (thinner_liquidity * POSITION_LIQUIDITY_FRACTION).min(config.max_position_size);
    if required_amount <= Decimal::ZERO {
        return None;
    }

    let execution_cost = if source.network == target.network {
        config.swap_cost_estimate
    } else {
        config.swap_cost_estimate + config.bridge_cost_surcharge
    };

    let gross_profit = required_amount * (diff / avg);
    let net_profit = gross_profit - execution_cost;
    if net_profit <= Decimal::ZERO {
        debug!(
            "Gap of {:.4}% between {:?} and {:?} does not clear costs",
            price_diff_pct, source.address, target.address
        );
        return None;
    }

    let confidence = scorer.score(source, target, required_amount);

    Some(ArbitrageOpportunity {
        id: Uuid::new_v4().to_string(),
        detected_at: Utc::now(),
        source_pool: source.clone(),
        target_pool: target.clone(),
        profit_potential_pct: price_diff_pct,
        required_amount,
        execution_cost,
        gross_profit,
        net_profit,
        confidence,
    })
}
