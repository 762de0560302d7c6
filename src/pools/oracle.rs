//! Pool state reads with a short-lived snapshot cache

use alloy::primitives::Address;
use chrono::Utc;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error};
use crate::contracts::{decode_sqrt_price, decode_uint, encode_liquidity, encode_slot0};
use crate::errors::{ArbError, ArbResult};
use crate::network::{ChainCall, NetworkClients};
use crate::types::{PoolConfig, PoolSnapshot};
use crate::utils::math::sqrt_price_x96_to_price;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

pub struct PoolOracle {
    clients: NetworkClients,
    pools: Vec<PoolConfig>,
    cache: RwLock<HashMap<Address, (PoolSnapshot, Instant)>>,
    cache_ttl: Duration,
}

impl PoolOracle {
    pub fn new(clients: NetworkClients, pools: Vec<PoolConfig>) -> Self {
        Self {
            clients,
            pools,
            cache: RwLock::new(HashMap::new()),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn pools(&self) -> &[PoolConfig] {
        &self.pools
    }

    /// Fresh-or-cached snapshots for every configured pool. A pool whose read
    /// fails is logged and skipped; one bad RPC must not blind the whole cycle.
    pub async fn snapshot_all(&self) -> Vec<PoolSnapshot> {
        let mut snapshots = Vec::with_capacity(self.pools.len());
        for pool in &self.pools {
            match self.snapshot(pool).await {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    error!(
                        "❌ Failed to snapshot pool {:?} on {}: {}",
                        pool.address, pool.network, e
                    );
                }
            }
        }
        snapshots
    }

    pub async fn snapshot(&self, pool: &PoolConfig) -> ArbResult<PoolSnapshot> {
        if let Some(cached) = self.cached(pool.address).await {
            debug!("Using cached snapshot for pool {:?}", pool.address);
            return Ok(cached);
        }

        let client = self.clients.get(pool.network)?;

        let slot0_raw = client
            .call_view(&ChainCall::new(pool.address, encode_slot0()))
            .await?;
        let sqrt_price_x96 = decode_sqrt_price(&slot0_raw)?;
        let price = sqrt_price_x96_to_price(sqrt_price_x96)?;

        let liquidity_raw = client
            .call_view(&ChainCall::new(pool.address, encode_liquidity()))
            .await?;
        let liquidity =
            u128::try_from(decode_uint(&liquidity_raw)?).map_err(|e| ArbError::DataParsing {
                context: format!("liquidity of pool {:?}", pool.address),
                source: e.into(),
            })?;

        let snapshot = PoolSnapshot {
            address: pool.address,
            network: pool.network,
            token0: pool.token0.clone(),
            token1: pool.token1.clone(),
            fee_tier: pool.fee_tier,
            liquidity,
            price,
            observed_at: Utc::now(),
        };

        self.cache
            .write()
            .await
            .insert(pool.address, (snapshot.clone(), Instant::now()));
        Ok(snapshot)
    }

    pub async fn cached(&self, address: Address) -> Option<PoolSnapshot> {
        let cache = self.cache.read().await;
        match cache.get(&address) {
            Some((snapshot, fetched_at)) if fetched_at.elapsed() < self.cache_ttl => {
                Some(snapshot.clone())
            }
            _ => None,
        }
    }
}
