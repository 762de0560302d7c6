//! Bot configuration loading and validation

use alloy::primitives::{Address, address};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;
use crate::errors::{ArbError, ArbResult};
use crate::types::{Network, PoolConfig};

/// Per-network connection and contract settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSettings {
    pub rpc_url: String,
    pub chain_id: u64,
    pub cqt_address: Address,
    #[serde(default)]
    pub bridge_address: Address,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Networks {
    #[serde(default = "default_polygon_settings")]
    pub polygon: NetworkSettings,
    #[serde(default = "default_base_settings")]
    pub base: NetworkSettings,
}

/// Every recognized option with its default. Unknown or malformed keys are
/// rejected at load time rather than silently ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Relative price gap below which a pair is not worth considering, in percent.
    #[serde(default = "default_min_profit_threshold_pct")]
    pub min_profit_threshold_pct: Decimal,
    /// Global ceiling on a single position, in CQT.
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,
    #[serde(default = "default_monitoring_interval_secs")]
    pub monitoring_interval_secs: u64,
    /// Pause between executions within one cycle, to go easy on the RPCs.
    #[serde(default = "default_inter_execution_pause_secs")]
    pub inter_execution_pause_secs: u64,
    /// Safety buffer applied to every gas estimate.
    #[serde(default = "default_gas_limit_multiplier")]
    pub gas_limit_multiplier: Decimal,
    /// Fee spikes above this are capped so they cannot consume the margin.
    #[serde(default = "default_max_gas_price_gwei")]
    pub max_gas_price_gwei: u64,
    #[serde(default = "default_bridge_confirmation_timeout_secs")]
    pub bridge_confirmation_timeout_secs: u64,
    #[serde(default = "default_bridge_poll_interval_secs")]
    pub bridge_poll_interval_secs: u64,
    #[serde(default = "default_confidence_execution_threshold")]
    pub confidence_execution_threshold: Decimal,
    #[serde(default = "default_top_k_opportunities")]
    pub top_k_opportunities: usize,
    /// Gas-token floor required on the source network before any step runs.
    #[serde(default = "default_min_gas_balance_wei")]
    pub min_gas_balance_wei: u128,
    /// Flat cost model: a local swap, and the extra a bridge hop adds.
    #[serde(default = "default_swap_cost_estimate")]
    pub swap_cost_estimate: Decimal,
    #[serde(default = "default_bridge_cost_surcharge")]
    pub bridge_cost_surcharge: Decimal,
    /// How long to wait for any single transaction receipt.
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
    /// The signing account the chain clients operate on behalf of.
    #[serde(default)]
    pub account_address: Address,
    #[serde(default = "default_networks")]
    pub networks: Networks,
    #[serde(default = "default_pools")]
    pub pools: Vec<PoolConfig>,
}

fn default_min_profit_threshold_pct() -> Decimal {
    dec!(0.5)
}

fn default_max_position_size() -> Decimal {
    dec!(1_000_000)
}

fn default_monitoring_interval_secs() -> u64 {
    30
}

fn default_inter_execution_pause_secs() -> u64 {
    5
}

fn default_gas_limit_multiplier() -> Decimal {
    dec!(1.2)
}

fn default_max_gas_price_gwei() -> u64 {
    100
}

fn default_bridge_confirmation_timeout_secs() -> u64 {
    600
}

fn default_bridge_poll_interval_secs() -> u64 {
    10
}

fn default_confidence_execution_threshold() -> Decimal {
    dec!(0.7)
}

fn default_top_k_opportunities() -> usize {
    3
}

fn default_min_gas_balance_wei() -> u128 {
    // 0.01 of the native gas token
    10_000_000_000_000_000
}

fn default_swap_cost_estimate() -> Decimal {
    dec!(5.0)
}

fn default_bridge_cost_surcharge() -> Decimal {
    dec!(45.0)
}

fn default_receipt_timeout_secs() -> u64 {
    300
}

fn default_polygon_settings() -> NetworkSettings {
    NetworkSettings {
        rpc_url: "https://polygon-rpc.com".to_string(),
        chain_id: 137,
        cqt_address: address!("94ef57abfbff1ad70bd00a921e1d2437f31c1665"),
        bridge_address: Address::ZERO,
    }
}

fn default_base_settings() -> NetworkSettings {
    NetworkSettings {
        rpc_url: "https://mainnet.base.org".to_string(),
        chain_id: 8453,
        cqt_address: address!("9d1075b41cd80ab08179f36bc17a7ff8708748ba"),
        bridge_address: Address::ZERO,
    }
}

fn default_networks() -> Networks {
    Networks {
        polygon: default_polygon_settings(),
        base: default_base_settings(),
    }
}

fn default_pools() -> Vec<PoolConfig> {
    vec![
        PoolConfig {
            address: address!("b1e0b26c31a2e8c3eebd6d5ff0e386a9c073d24f"),
            network: Network::Polygon,
            token0: "CQT".to_string(),
            token1: "WETH".to_string(),
            fee_tier: 3000,
        },
        PoolConfig {
            address: address!("0b3cd8a65c5c3c4d6b5a7e8b2f8d9e9c2b8a5d3f"),
            network: Network::Polygon,
            token0: "CQT".to_string(),
            token1: "WMATIC".to_string(),
            fee_tier: 3000,
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_profit_threshold_pct: default_min_profit_threshold_pct(),
            max_position_size: default_max_position_size(),
            monitoring_interval_secs: default_monitoring_interval_secs(),
            inter_execution_pause_secs: default_inter_execution_pause_secs(),
            gas_limit_multiplier: default_gas_limit_multiplier(),
            max_gas_price_gwei: default_max_gas_price_gwei(),
            bridge_confirmation_timeout_secs: default_bridge_confirmation_timeout_secs(),
            bridge_poll_interval_secs: default_bridge_poll_interval_secs(),
            confidence_execution_threshold: default_confidence_execution_threshold(),
            top_k_opportunities: default_top_k_opportunities(),
            min_gas_balance_wei: default_min_gas_balance_wei(),
            swap_cost_estimate: default_swap_cost_estimate(),
            bridge_cost_surcharge: default_bridge_cost_surcharge(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
            account_address: Address::ZERO,
            networks: default_networks(),
            pools: default_pools(),
        }
    }
}

impl Config {
    /// Load from a JSON file, apply environment overrides, validate.
    /// A missing file means run on defaults; a malformed one is fatal.
    pub fn load(path: &str) -> ArbResult<Self> {
        let mut config = if Path::new(path).exists() {
            let raw = fs::read_to_string(path).map_err(|e| ArbError::Configuration {
                message: format!("cannot read {path}: {e}"),
            })?;
            serde_json::from_str::<Config>(&raw).map_err(|e| ArbError::Configuration {
                message: format!("invalid configuration in {path}: {e}"),
            })?
        } else {
            warn!("⚠️ No configuration file at {}, using defaults", path);
            Config::default()
        };

        if let Ok(url) = env::var("POLYGON_RPC_URL") {
            config.networks.polygon.rpc_url = url;
        }
        if let Ok(url) = env::var("BASE_RPC_URL") {
            config.networks.base.rpc_url = url;
        }
        if let Ok(account) = env::var("ACCOUNT_ADDRESS") {
            config.account_address =
                Address::from_str(&account).map_err(|e| ArbError::Configuration {
                    message: format!("ACCOUNT_ADDRESS is not a valid address: {e}"),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn network(&self, network: Network) -> &NetworkSettings {
        match network {
            Network::Polygon => &self.networks.polygon,
            Network::Base => &self.networks.base,
        }
    }

    pub fn validate(&self) -> ArbResult<()> {
        fn fail(message: String) -> ArbResult<()> {
            Err(ArbError::Configuration { message })
        }

        if self.min_profit_threshold_pct < Decimal::ZERO {
            return fail("min_profit_threshold_pct must not be negative".to_string());
        }
        if self.max_position_size <= Decimal::ZERO {
            return fail("max_position_size must be positive".to_string());
        }
        if self.gas_limit_multiplier < Decimal::ONE {
            return fail("gas_limit_multiplier below 1.0 would underprice gas".to_string());
        }
        if self.max_gas_price_gwei == 0 {
            return fail("max_gas_price_gwei must be positive".to_string());
        }
        if self.monitoring_interval_secs == 0 {
            return fail("monitoring_interval_secs must be at least 1".to_string());
        }
        if self.bridge_confirmation_timeout_secs == 0 {
            return fail("bridge_confirmation_timeout_secs must be positive".to_string());
        }
        if self.top_k_opportunities == 0 {
            return fail("top_k_opportunities must be at least 1".to_string());
        }
        if self.confidence_execution_threshold < Decimal::ZERO
            || self.confidence_execution_threshold > Decimal::ONE
        {
            return fail("confidence_execution_threshold must lie in [0, 1]".to_string());
        }
        if self.account_address == Address::ZERO {
            return fail(
                "account_address is required (config key or ACCOUNT_ADDRESS env)".to_string(),
            );
        }
        if self.pools.is_empty() {
            return fail("at least one pool must be configured".to_string());
        }
        for pool in &self.pools {
            let expected = pool.network.chain_id();
            let configured = self.network(pool.network).chain_id;
            if configured != expected {
                return fail(format!(
                    "chain_id {configured} for {} does not match expected {expected}",
                    pool.network
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.min_profit_threshold_pct, dec!(0.5));
        assert_eq!(config.max_position_size, dec!(1_000_000));
        assert_eq!(config.monitoring_interval_secs, 30);
        assert_eq!(config.inter_execution_pause_secs, 5);
        assert_eq!(config.gas_limit_multiplier, dec!(1.2));
        assert_eq!(config.max_gas_price_gwei, 100);
        assert_eq!(config.bridge_confirmation_timeout_secs, 600);
        assert_eq!(config.confidence_execution_threshold, dec!(0.7));
        assert_eq!(config.top_k_opportunities, 3);
        assert_eq!(config.networks.polygon.chain_id, 137);
        assert_eq!(config.networks.base.chain_id, 8453);
        assert_eq!(config.pools.len(), 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_json::from_str::<Config>(r#"{"max_slipage_bps": 50}"#);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_values_are_rejected() {
        let result = serde_json::from_str::<Config>(r#"{"monitoring_interval_secs": "soon"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validation_requires_an_account() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ArbError::Configuration { .. })
        ));
    }

    #[test]
    fn validation_rejects_bad_ranges() {
        let mut config = Config {
            account_address: address!("00000000000000000000000000000000000000aa"),
            ..Config::default()
        };
        assert!(config.validate().is_ok());

        config.gas_limit_multiplier = dec!(0.8);
        assert!(config.validate().is_err());
        config.gas_limit_multiplier = dec!(1.2);

        config.confidence_execution_threshold = dec!(1.5);
        assert!(config.validate().is_err());
        config.confidence_execution_threshold = dec!(0.7);

        config.pools.clear();
        assert!(config.validate().is_err());
    }
}
