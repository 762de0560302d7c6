//! Live JSON-RPC chain client built on alloy

use alloy::{
    primitives::{Address, B256, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::eth::TransactionRequest,
};
use anyhow::Context;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use crate::{
    errors::{ArbError, ArbResult},
    network::client::{ChainCall, ChainClient, TxReceipt},
    network::retry::{retry_with_backoff, RetryConfig},
    types::Network,
    ConcreteProvider,
};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// One network's RPC connection. Transactions are sent from `account`; the
/// node holds the key, custody never enters this process.
pub struct RpcChainClient {
    network: Network,
    provider: Arc<ConcreteProvider>,
    account: Address,
}

impl RpcChainClient {
    pub async fn connect(network: Network, rpc_url: &str, account: Address) -> ArbResult<Self> {
        let provider: Arc<ConcreteProvider> = Arc::new(
            ProviderBuilder::new()
                .on_http(rpc_url.parse().map_err(|e| ArbError::Configuration {
                    message: format!("invalid RPC url for {network}: {e}"),
                })?)
                .boxed(),
        );

        info!("🔗 Testing connection to {} network...", network);
        let block = retry_with_backoff(
            || async {
                provider
                    .get_block_number()
                    .await
                    .context("Failed to get block number")
            },
            &RetryConfig {
                max_attempts: 5,
                initial_delay_ms: 500,
                max_delay_ms: 10000,
                exponential_base: 2.0,
            },
            &format!("{network} network connection"),
        )
        .await?;
        info!("✅ Connected to {} at block {}", network, block);

        Ok(Self {
            network,
            provider,
            account,
        })
    }

    fn build_request(&self, call: &ChainCall) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .from(self.account)
            .to(call.to)
            .input(call.data.clone().into())
            .value(call.value);
        if let Some(gas_limit) = call.gas_limit {
            tx = tx.gas_limit(gas_limit);
        }
        if let Some(gas_price) = call.gas_price_wei {
            tx = tx
                .max_fee_per_gas(gas_price)
                .max_priority_fee_per_gas(gas_price.min(1_000_000_000));
        }
        tx
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn network(&self) -> Network {
        self.network
    }

    async fn get_balance(&self, address: Address) -> ArbResult<U256> {
        retry_with_backoff(
            || async {
                self.provider
                    .get_balance(address)
                    .await
                    .context("Failed to get balance")
            },
            &RetryConfig::default(),
            &format!("{} balance query", self.network),
        )
        .await
    }

    async fn get_gas_price(&self) -> ArbResult<u128> {
        retry_with_backoff(
            || async {
                self.provider
                    .get_gas_price()
                    .await
                    .context("Failed to get gas price")
            },
            &RetryConfig::default(),
            &format!("{} gas price query", self.network),
        )
        .await
    }

    async fn estimate_gas(&self, call: &ChainCall) -> ArbResult<u64> {
        let tx = self.build_request(call);
        retry_with_backoff(
            || async {
                self.provider
                    .estimate_gas(&tx)
                    .await
                    .context("Failed to estimate gas")
            },
            &RetryConfig::default(),
            &format!("{} gas estimate", self.network),
        )
        .await
    }

    async fn submit_transaction(&self, call: &ChainCall) -> ArbResult<String> {
        let tx = self.build_request(call);
        // No retry: the node may have accepted the broadcast even if the
        // response was lost.
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ArbError::Network {
                message: format!("{} transaction broadcast failed", self.network),
                source: Some(e.into()),
                retry_count: 0,
            })?;
        Ok(format!("{:?}", pending.tx_hash()))
    }

    async fn wait_for_receipt(&self, tx_hash: &str, timeout: Duration) -> ArbResult<TxReceipt> {
        let hash = B256::from_str(tx_hash).map_err(|e| ArbError::DataParsing {
            context: format!("transaction hash {tx_hash}"),
            source: e.into(),
        })?;

        let started = tokio::time::Instant::now();
        loop {
            // A transient receipt-query error is retried until the deadline;
            // only the timeout gives up on the transaction.
            match self.provider.get_transaction_receipt(hash).await {
                Ok(Some(receipt)) => {
                    return Ok(TxReceipt {
                        status: receipt.status(),
                        gas_used: receipt.gas_used as u64,
                    });
                }
                Ok(None) => {}
                Err(e) => warn!("⚠️ Receipt query for {} failed: {}", tx_hash, e),
            }
            if started.elapsed() >= timeout {
                return Err(ArbError::Network {
                    message: format!(
                        "{} transaction {} unconfirmed after {}s",
                        self.network,
                        tx_hash,
                        timeout.as_secs()
                    ),
                    source: None,
                    retry_count: 0,
                });
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }

    async fn call_view(&self, call: &ChainCall) -> ArbResult<Vec<u8>> {
        let tx = self.build_request(call);
        let bytes = retry_with_backoff(
            || async { self.provider.call(&tx).await.context("View call failed") },
            &RetryConfig::default(),
            &format!("{} view call", self.network),
        )
        .await?;
        Ok(bytes.to_vec())
    }
}
