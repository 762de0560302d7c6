//! Cross-chain arbitrage execution state machine

use alloy::primitives::{B256, U256};
use anyhow::anyhow;
use chrono::Utc;
use rust_decimal::prelude::*;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;
use crate::config::Config;
use crate::contracts::{
    self, BridgeStatusCode, encode_allowance, encode_approve, encode_balance_of,
    encode_bridge_status, encode_bridge_token, encode_swap,
};
use crate::errors::{ArbError, ArbResult};
use crate::network::{ChainCall, ChainClient, NetworkClients, TxReceipt};
use crate::storage::ExecutionLedger;
use crate::types::{
    ArbitrageOpportunity, BridgeTransaction, ExecutionFailure, ExecutionReport, ExecutionState,
    Network, PoolSnapshot,
};
use crate::utils::math::{from_wei, gwei_to_wei, to_wei};

#[derive(Debug, Clone, Copy)]
enum TradeSide {
    /// Sell CQT (token0) into the counter token.
    Sell,
    /// Buy CQT back with the counter token.
    Buy,
}

impl TradeSide {
    fn zero_for_one(self) -> bool {
        matches!(self, TradeSide::Sell)
    }
}

/// Drives one opportunity through the sell / bridge / rebuy sequence.
/// Every step confirms on-chain before the next begins; there is no
/// rollback, only a recorded partial failure.
pub struct CrossChainExecutor {
    clients: NetworkClients,
    ledger: Arc<ExecutionLedger>,
    config: Arc<Config>,
}

impl CrossChainExecutor {
    pub fn new(clients: NetworkClients, ledger: Arc<ExecutionLedger>, config: Arc<Config>) -> Self {
        Self {
            clients,
            ledger,
            config,
        }
    }

    pub async fn execute(
        &self,
        opportunity: &ArbitrageOpportunity,
    ) -> Result<ExecutionReport, ExecutionFailure> {
        let started_at = Utc::now();
        let mut state = ExecutionState::Init;
        let mut gas_spent_wei: u128 = 0;

        info!(
            "🚀 Executing opportunity {} ({} -> {}, {} CQT, est. net {})",
            opportunity.id,
            opportunity.source_pool.network,
            opportunity.target_pool.network,
            opportunity.required_amount,
            opportunity.net_profit
        );

        match self
            .run(opportunity, &mut state, &mut gas_spent_wei, started_at)
            .await
        {
            Ok(report) => Ok(report),
            Err(error) => Err(ExecutionFailure {
                opportunity_id: opportunity.id.clone(),
                state_reached: state,
                error,
                gas_spent_wei,
            }),
        }
    }

    async fn run(
        &self,
        opportunity: &ArbitrageOpportunity,
        state: &mut ExecutionState,
        gas_spent_wei: &mut u128,
        started_at: chrono::DateTime<Utc>,
    ) -> ArbResult<ExecutionReport> {
        let source = &opportunity.source_pool;
        let target = &opportunity.target_pool;
        let amount_wei = to_wei(opportunity.required_amount).ok_or_else(|| {
            ArbError::DataParsing {
                context: format!("position size {} in wei", opportunity.required_amount),
                source: anyhow!("amount out of range"),
            }
        })?;

        self.check_prerequisites(source.network, amount_wei).await?;
        self.advance(state, ExecutionState::PrerequisitesChecked, &opportunity.id);

        let source_tx_hash = self
            .execute_trade(source, TradeSide::Sell, amount_wei, gas_spent_wei)
            .await?;
        self.advance(state, ExecutionState::SourceTraded, &opportunity.id);

        let bridge_tx_hash = if opportunity.is_cross_network() {
            let bridge_hash = self
                .bridge_tokens(source.network, target.network, opportunity, amount_wei, gas_spent_wei)
                .await?;
            self.advance(state, ExecutionState::Bridged, &opportunity.id);

            self.wait_for_bridge_confirmation(&bridge_hash, target.network)
                .await?;
            self.advance(state, ExecutionState::BridgeConfirmed, &opportunity.id);
            Some(bridge_hash)
        } else {
            None
        };

        let target_tx_hash = self
            .execute_trade(target, TradeSide::Buy, amount_wei, gas_spent_wei)
            .await?;
        self.advance(state, ExecutionState::TargetTraded, &opportunity.id);

        self.advance(state, ExecutionState::Done, &opportunity.id);
        info!(
            "💰 Opportunity {} completed, gas spent {} wei",
            opportunity.id, gas_spent_wei
        );

        Ok(ExecutionReport {
            id: Uuid::new_v4().to_string(),
            opportunity_id: opportunity.id.clone(),
            started_at,
            completed_at: Utc::now(),
            final_state: *state,
            source_tx_hash: Some(source_tx_hash),
            bridge_tx_hash,
            target_tx_hash: Some(target_tx_hash),
            gas_spent_wei: *gas_spent_wei,
            realized_profit: opportunity.net_profit,
        })
    }

    fn advance(&self, state: &mut ExecutionState, next: ExecutionState, opportunity_id: &str) {
        info!("➡️ {}: {} -> {}", opportunity_id, state, next);
        *state = next;
    }

    /// Gas funds and CQT inventory on the source network, checked before any
    /// transaction leaves the process.
    async fn check_prerequisites(&self, network: Network, amount_wei: U256) -> ArbResult<()> {
        let client = self.clients.get(network)?;
        let account = self.config.account_address;

        let native = client.get_balance(account).await?;
        if native < U256::from(self.config.min_gas_balance_wei) {
            return Err(ArbError::InsufficientBalance {
                network,
                token: "native".to_string(),
                required: from_wei(self.config.min_gas_balance_wei),
                available: from_wei(native.try_into().unwrap_or(u128::MAX)),
            });
        }

        let cqt = self.config.network(network).cqt_address;
        let raw = client
            .call_view(&ChainCall::new(cqt, encode_balance_of(account)))
            .await?;
        let balance = contracts::decode_uint(&raw)?;
        if balance < amount_wei {
            return Err(ArbError::InsufficientBalance {
                network,
                token: "CQT".to_string(),
                required: from_wei(amount_wei.try_into().unwrap_or(u128::MAX)),
                available: from_wei(balance.try_into().unwrap_or(u128::MAX)),
            });
        }
        Ok(())
    }

    async fn prepare_call(
        &self,
        client: &Arc<dyn ChainClient>,
        call: ChainCall,
    ) -> ArbResult<ChainCall> {
        let estimated = client.estimate_gas(&call).await?;
        let padded = (Decimal::from(estimated) * self.config.gas_limit_multiplier)
            .to_u64()
            .ok_or_else(|| ArbError::DataParsing {
                context: "padded gas limit".to_string(),
                source: anyhow!("estimate {estimated} does not fit after padding"),
            })?;
        let gas_price = client
            .get_gas_price()
            .await?
            .min(gwei_to_wei(self.config.max_gas_price_gwei));
        Ok(call.with_gas_limit(padded).with_gas_price(gas_price))
    }

    async fn broadcast_and_wait(
        &self,
        client: &Arc<dyn ChainClient>,
        call: ChainCall,
        gas_spent_wei: &mut u128,
    ) -> ArbResult<(String, TxReceipt)> {
        let call = self.prepare_call(client, call).await?;
        let gas_price = call.gas_price_wei.unwrap_or(0);
        let tx_hash = client.submit_transaction(&call).await?;
        let receipt = client
            .wait_for_receipt(&tx_hash, Duration::from_secs(self.config.receipt_timeout_secs))
            .await?;
        *gas_spent_wei += receipt.gas_used as u128 * gas_price;
        Ok((tx_hash, receipt))
    }

    async fn execute_trade(
        &self,
        pool: &PoolSnapshot,
        side: TradeSide,
        amount_wei: U256,
        gas_spent_wei: &mut u128,
    ) -> ArbResult<String> {
        let client = self.clients.get(pool.network)?;
        let data = encode_swap(
            self.config.account_address,
            side.zero_for_one(),
            amount_wei,
        );

        let call = self
            .prepare_call(client, ChainCall::new(pool.address, data))
            .await?;
        let gas_price = call.gas_price_wei.unwrap_or(0);
        let tx_hash = client.submit_transaction(&call).await?;

        // Past broadcast the swap may already be mined, so any confirmation
        // trouble is a trade failure, never a retryable network error.
        let receipt = client
            .wait_for_receipt(&tx_hash, Duration::from_secs(self.config.receipt_timeout_secs))
            .await
            .map_err(|e| ArbError::TradeExecution {
                network: pool.network,
                pool: format!("{:?}", pool.address),
                message: format!("confirmation of swap {} failed: {}", tx_hash, e),
            })?;
        *gas_spent_wei += receipt.gas_used as u128 * gas_price;

        if !receipt.status {
            return Err(ArbError::TradeExecution {
                network: pool.network,
                pool: format!("{:?}", pool.address),
                message: format!("swap {} reverted", tx_hash),
            });
        }
        info!(
            "📈 {:?} swap on {} pool {:?} confirmed: {}",
            side, pool.network, pool.address, tx_hash
        );
        Ok(tx_hash)
    }

    /// Approve the bridge if needed, submit the transfer, and track it in the
    /// ledger before waiting on the receipt.
    async fn bridge_tokens(
        &self,
        source: Network,
        target: Network,
        opportunity: &ArbitrageOpportunity,
        amount_wei: U256,
        gas_spent_wei: &mut u128,
    ) -> ArbResult<String> {
        let client = self.clients.get(source)?;
        let settings = self.config.network(source);
        let account = self.config.account_address;

        let raw = client
            .call_view(&ChainCall::new(
                settings.cqt_address,
                encode_allowance(account, settings.bridge_address),
            ))
            .await?;
        let allowance = contracts::decode_uint(&raw)?;
        if allowance < amount_wei {
            let (approve_hash, receipt) = self
                .broadcast_and_wait(
                    client,
                    ChainCall::new(
                        settings.cqt_address,
                        encode_approve(settings.bridge_address, amount_wei),
                    ),
                    gas_spent_wei,
                )
                .await?;
            if !receipt.status {
                return Err(ArbError::BridgeSubmission {
                    source_network: source,
                    target_network: target,
                    message: format!("bridge approval {} reverted", approve_hash),
                });
            }
            info!("🔓 Bridge allowance granted on {}: {}", source, approve_hash);
        }

        let data = encode_bridge_token(
            settings.cqt_address,
            amount_wei,
            target.chain_id(),
            account,
        );
        let call = self
            .prepare_call(client, ChainCall::new(settings.bridge_address, data))
            .await?;
        let gas_price = call.gas_price_wei.unwrap_or(0);

        let tx_hash = client.submit_transaction(&call).await?;
        // Track the transfer the moment it is broadcast. If the receipt wait
        // dies, the ledger still knows funds are in flight.
        self.ledger
            .record_pending(BridgeTransaction::pending(
                tx_hash.clone(),
                source,
                target,
                opportunity.required_amount,
            ))
            .await;

        let receipt = client
            .wait_for_receipt(&tx_hash, Duration::from_secs(self.config.receipt_timeout_secs))
            .await
            .map_err(|e| ArbError::BridgeSubmission {
                source_network: source,
                target_network: target,
                message: format!("receipt wait for {} failed: {}", tx_hash, e),
            })?;
        *gas_spent_wei += receipt.gas_used as u128 * gas_price;
        self.ledger.note_gas_used(&tx_hash, receipt.gas_used).await;

        if !receipt.status {
            self.ledger.fail(&tx_hash, "bridge transaction reverted").await;
            return Err(ArbError::BridgeSubmission {
                source_network: source,
                target_network: target,
                message: format!("bridge transaction {} reverted", tx_hash),
            });
        }
        info!("🌉 Bridge transfer submitted on {}: {}", source, tx_hash);
        Ok(tx_hash)
    }

    /// Poll the target-side bridge until the transfer keyed by the source
    /// transaction hash completes, fails, or the timeout lapses.
    async fn wait_for_bridge_confirmation(
        &self,
        bridge_tx_hash: &str,
        target: Network,
    ) -> ArbResult<()> {
        let client = self.clients.get(target)?;
        let bridge = self.config.network(target).bridge_address;
        let bridge_id = B256::from_str(bridge_tx_hash).map_err(|e| ArbError::DataParsing {
            context: format!("bridge id from hash {bridge_tx_hash}"),
            source: e.into(),
        })?;
        let status_call = ChainCall::new(bridge, encode_bridge_status(bridge_id));

        let started = tokio::time::Instant::now();
        let timeout = Duration::from_secs(self.config.bridge_confirmation_timeout_secs);
        let poll_interval = Duration::from_secs(self.config.bridge_poll_interval_secs);

        loop {
            // Only an explicit Failed code or the timeout fails the transfer;
            // a flaky or unreadable status read is retried on the next poll.
            match client.call_view(&status_call).await {
                Ok(raw) => match contracts::decode_bridge_status(&raw) {
                    Ok(BridgeStatusCode::Completed) => {
                        self.ledger.confirm(bridge_tx_hash).await;
                        return Ok(());
                    }
                    Ok(BridgeStatusCode::Failed) => {
                        self.ledger.fail(bridge_tx_hash, "bridge reported failure").await;
                        return Err(ArbError::BridgeSubmission {
                            source_network: target.counterpart(),
                            target_network: target,
                            message: format!("bridge rejected transfer {}", bridge_tx_hash),
                        });
                    }
                    Ok(BridgeStatusCode::Pending) => {}
                    Err(e) => warn!("⚠️ Bridge status response unreadable: {}", e),
                },
                Err(e) => warn!("⚠️ Bridge status poll failed: {}", e),
            }

            if started.elapsed() >= timeout {
                self.ledger.fail(bridge_tx_hash, "confirmation timeout").await;
                return Err(ArbError::BridgeTimeout {
                    tx_hash: bridge_tx_hash.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, address};
    use rust_decimal_macros::dec;
    use crate::network::mock::MockChainClient;
    use crate::types::BridgeStatus;

    const SOURCE_POOL: Address = address!("0000000000000000000000000000000000000051");
    const TARGET_POOL: Address = address!("0000000000000000000000000000000000000052");

    fn snapshot(addr: Address, network: Network, price: Decimal) -> PoolSnapshot {
        PoolSnapshot {
            address: addr,
            network,
            token0: "CQT".to_string(),
            token1: "WETH".to_string(),
            fee_tier: 3000,
            liquidity: 1_000_000,
            price,
            observed_at: Utc::now(),
        }
    }

    fn opportunity(source_net: Network, target_net: Network) -> ArbitrageOpportunity {
        ArbitrageOpportunity {
            id: "test-opportunity".to_string(),
            detected_at: Utc::now(),
            source_pool: snapshot(SOURCE_POOL, source_net, dec!(10.2)),
            target_pool: snapshot(TARGET_POOL, target_net, dec!(10.0)),
            profit_potential_pct: dec!(1.98),
            required_amount: dec!(1000),
            execution_cost: dec!(50),
            gross_profit: dec!(198),
            net_profit: dec!(148),
            confidence: dec!(0.9),
        }
    }

    fn test_config() -> Arc<Config> {
        let mut config = Config::default();
        config.account_address = address!("00000000000000000000000000000000000000aa");
        config.bridge_confirmation_timeout_secs = 1;
        config.bridge_poll_interval_secs = 0;
        Arc::new(config)
    }

    struct Harness {
        polygon: Arc<MockChainClient>,
        base: Arc<MockChainClient>,
        ledger: Arc<ExecutionLedger>,
        executor: CrossChainExecutor,
    }

    fn harness(polygon: MockChainClient, base: MockChainClient, config: Arc<Config>) -> Harness {
        let polygon = Arc::new(polygon);
        let base = Arc::new(base);
        let mut clients = NetworkClients::new();
        clients.insert(polygon.clone());
        clients.insert(base.clone());
        let ledger = Arc::new(ExecutionLedger::new());
        let executor = CrossChainExecutor::new(clients, ledger.clone(), config);
        Harness {
            polygon,
            base,
            ledger,
            executor,
        }
    }

    #[tokio::test]
    async fn same_network_execution_skips_the_bridge() {
        let h = harness(
            MockChainClient::new(Network::Polygon),
            MockChainClient::new(Network::Base),
            test_config(),
        );
        let opp = opportunity(Network::Polygon, Network::Polygon);

        let report = h.executor.execute(&opp).await.unwrap();
        assert_eq!(report.final_state, ExecutionState::Done);
        assert!(report.bridge_tx_hash.is_none());
        assert!(report.gas_spent_wei > 0);

        // Two swaps, both on the pool contracts, nothing touches the bridge.
        assert_eq!(h.polygon.submissions().len(), 2);
        assert_eq!(h.polygon.submissions_to(SOURCE_POOL).len(), 1);
        assert_eq!(h.polygon.submissions_to(TARGET_POOL).len(), 1);
        assert!(h.base.submissions().is_empty());
        assert!(h.ledger.get_pending().await.is_empty());
    }

    #[tokio::test]
    async fn cross_network_execution_bridges_and_confirms() {
        let h = harness(
            MockChainClient {
                allowance: U256::ZERO,
                ..MockChainClient::new(Network::Polygon)
            },
            MockChainClient::new(Network::Base),
            test_config(),
        );
        let opp = opportunity(Network::Polygon, Network::Base);

        let report = h.executor.execute(&opp).await.unwrap();
        assert_eq!(report.final_state, ExecutionState::Done);
        assert!(report.bridge_tx_hash.is_some());
        assert!(report.source_tx_hash.is_some());
        assert!(report.target_tx_hash.is_some());

        // Source side: swap, approve, bridgeToken. Target side: rebuy swap.
        assert_eq!(h.polygon.submissions().len(), 3);
        assert_eq!(h.base.submissions().len(), 1);

        let completed = h.ledger.get_completed().await;
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].status, BridgeStatus::Confirmed);
        assert_eq!(completed[0].amount, dec!(1000));
        assert!(h.ledger.get_pending().await.is_empty());
    }

    #[tokio::test]
    async fn existing_allowance_skips_the_approval() {
        let h = harness(
            MockChainClient::new(Network::Polygon),
            MockChainClient::new(Network::Base),
            test_config(),
        );
        let opp = opportunity(Network::Polygon, Network::Base);

        h.executor.execute(&opp).await.unwrap();
        // swap + bridgeToken only
        assert_eq!(h.polygon.submissions().len(), 2);
    }

    #[tokio::test]
    async fn insufficient_gas_aborts_before_any_transaction() {
        let h = harness(
            MockChainClient {
                native_balance: U256::ZERO,
                ..MockChainClient::new(Network::Polygon)
            },
            MockChainClient::new(Network::Base),
            test_config(),
        );
        let opp = opportunity(Network::Polygon, Network::Base);

        let failure = h.executor.execute(&opp).await.unwrap_err();
        assert_eq!(failure.state_reached, ExecutionState::Init);
        assert!(!failure.funds_in_flight());
        assert_eq!(failure.gas_spent_wei, 0);
        assert!(matches!(
            failure.error,
            ArbError::InsufficientBalance { ref token, .. } if token == "native"
        ));
        assert!(h.polygon.submissions().is_empty());
        assert!(h.base.submissions().is_empty());
    }

    #[tokio::test]
    async fn insufficient_inventory_aborts_cleanly() {
        let h = harness(
            MockChainClient {
                token_balance: U256::from(1u64),
                ..MockChainClient::new(Network::Polygon)
            },
            MockChainClient::new(Network::Base),
            test_config(),
        );
        let opp = opportunity(Network::Polygon, Network::Base);

        let failure = h.executor.execute(&opp).await.unwrap_err();
        assert_eq!(failure.state_reached, ExecutionState::Init);
        assert!(matches!(
            failure.error,
            ArbError::InsufficientBalance { ref token, .. } if token == "CQT"
        ));
        assert!(h.polygon.submissions().is_empty());
    }

    #[tokio::test]
    async fn reverted_source_swap_is_a_clean_failure() {
        let h = harness(
            MockChainClient {
                receipt_status: false,
                ..MockChainClient::new(Network::Polygon)
            },
            MockChainClient::new(Network::Base),
            test_config(),
        );
        let opp = opportunity(Network::Polygon, Network::Base);

        let failure = h.executor.execute(&opp).await.unwrap_err();
        assert_eq!(failure.state_reached, ExecutionState::PrerequisitesChecked);
        assert!(!failure.funds_in_flight());
        assert!(matches!(failure.error, ArbError::TradeExecution { .. }));
        assert!(h.ledger.get_pending().await.is_empty());
    }

    #[tokio::test]
    async fn unconfirmed_swap_surfaces_as_a_trade_failure() {
        let h = harness(
            MockChainClient {
                fail_receipts: true,
                ..MockChainClient::new(Network::Polygon)
            },
            MockChainClient::new(Network::Base),
            test_config(),
        );
        let opp = opportunity(Network::Polygon, Network::Base);

        let failure = h.executor.execute(&opp).await.unwrap_err();
        assert_eq!(failure.state_reached, ExecutionState::PrerequisitesChecked);
        assert!(!failure.funds_in_flight());
        // A swap that may already be mined must not look like a retryable
        // network error.
        assert!(matches!(failure.error, ArbError::TradeExecution { .. }));
        assert_eq!(h.polygon.submissions().len(), 1);
    }

    #[tokio::test]
    async fn malformed_status_read_does_not_abort_the_bridge_wait() {
        // First status poll returns unparseable data, second confirms.
        let h = harness(
            MockChainClient::new(Network::Polygon),
            MockChainClient {
                bridge_malformed_polls: 1,
                bridge_confirms_after: Some(2),
                ..MockChainClient::new(Network::Base)
            },
            test_config(),
        );
        let opp = opportunity(Network::Polygon, Network::Base);

        let report = h.executor.execute(&opp).await.unwrap();
        assert_eq!(report.final_state, ExecutionState::Done);
        assert_eq!(*h.base.bridge_polls.lock().unwrap(), 2);
        assert_eq!(h.ledger.get_completed().await.len(), 1);
        assert!(h.ledger.get_pending().await.is_empty());
    }

    #[tokio::test]
    async fn bridge_timeout_is_a_partial_failure_with_a_stuck_record() {
        let mut config = Config::default();
        config.account_address = address!("00000000000000000000000000000000000000aa");
        config.bridge_confirmation_timeout_secs = 0;
        config.bridge_poll_interval_secs = 0;

        let h = harness(
            MockChainClient::new(Network::Polygon),
            MockChainClient {
                bridge_confirms_after: None,
                ..MockChainClient::new(Network::Base)
            },
            Arc::new(config),
        );
        let opp = opportunity(Network::Polygon, Network::Base);

        let failure = h.executor.execute(&opp).await.unwrap_err();
        assert_eq!(failure.state_reached, ExecutionState::Bridged);
        assert!(failure.funds_in_flight());
        assert!(matches!(failure.error, ArbError::BridgeTimeout { .. }));

        // The transfer stays parked in pending, flagged failed, for an
        // operator to chase. Nothing moved to completed.
        let pending = h.ledger.get_pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, BridgeStatus::Failed);
        assert!(h.ledger.get_completed().await.is_empty());

        // The target-side rebuy never ran.
        assert!(h.base.submissions().is_empty());
    }
}
