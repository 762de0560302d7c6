//! Chain access trait shared by live RPC clients and the test doubles

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use crate::errors::{ArbError, ArbResult};
use crate::types::Network;

/// A transaction to submit, or a view call to execute, on one chain.
#[derive(Debug, Clone)]
pub struct ChainCall {
    pub to: Address,
    pub data: Vec<u8>,
    pub value: U256,
    pub gas_limit: Option<u64>,
    pub gas_price_wei: Option<u128>,
}

impl ChainCall {
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self {
            to,
            data,
            value: U256::ZERO,
            gas_limit: None,
            gas_price_wei: None,
        }
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_gas_price(mut self, gas_price_wei: u128) -> Self {
        self.gas_price_wei = Some(gas_price_wei);
        self
    }
}

/// What we need to know about a mined transaction.
#[derive(Debug, Clone, Copy)]
pub struct TxReceipt {
    pub status: bool,
    pub gas_used: u64,
}

/// One chain's read and submit surface.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn network(&self) -> Network;

    async fn get_balance(&self, address: Address) -> ArbResult<U256>;

    async fn get_gas_price(&self) -> ArbResult<u128>;

    async fn estimate_gas(&self, call: &ChainCall) -> ArbResult<u64>;

    /// Broadcast and return the transaction hash. No retry: a timeout after
    /// broadcast may mean the transaction is already in flight.
    async fn submit_transaction(&self, call: &ChainCall) -> ArbResult<String>;

    async fn wait_for_receipt(&self, tx_hash: &str, timeout: Duration) -> ArbResult<TxReceipt>;

    async fn call_view(&self, call: &ChainCall) -> ArbResult<Vec<u8>>;
}

/// Clients keyed by network. A missing network is a configuration error, not
/// a panic.
#[derive(Clone, Default)]
pub struct NetworkClients {
    clients: HashMap<Network, Arc<dyn ChainClient>>,
}

impl NetworkClients {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    pub fn insert(&mut self, client: Arc<dyn ChainClient>) {
        self.clients.insert(client.network(), client);
    }

    pub fn get(&self, network: Network) -> ArbResult<&Arc<dyn ChainClient>> {
        self.clients.get(&network).ok_or_else(|| ArbError::Configuration {
            message: format!("no chain client registered for {network}"),
        })
    }
}
