//! In-memory chain client used by the test suite

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use crate::contracts::{
    self, SIG_ALLOWANCE, SIG_BALANCE_OF, SIG_BRIDGE_STATUS, SIG_LIQUIDITY, SIG_SLOT0,
};
use crate::errors::{ArbError, ArbResult};
use crate::network::client::{ChainCall, ChainClient, TxReceipt};
use crate::types::Network;

pub struct MockChainClient {
    pub network: Network,
    pub native_balance: U256,
    pub token_balance: U256,
    pub allowance: U256,
    pub gas_price_wei: u128,
    pub receipt_status: bool,
    /// Every receipt wait errors, as if the transaction never confirmed.
    pub fail_receipts: bool,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub fail_views: bool,
    /// None: the bridge never confirms. Some(n): confirmed on the nth status poll.
    pub bridge_confirms_after: Option<u32>,
    /// The first n status polls return unparseable (empty) data.
    pub bridge_malformed_polls: u32,
    pub bridge_polls: Mutex<u32>,
    pub submitted: Mutex<Vec<ChainCall>>,
    pub hash_counter: Mutex<u64>,
}

impl MockChainClient {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            native_balance: U256::from(10u128.pow(18)),
            token_balance: U256::from(10u128).pow(U256::from(24)),
            allowance: U256::MAX,
            gas_price_wei: 30_000_000_000,
            receipt_status: true,
            fail_receipts: false,
            sqrt_price_x96: U256::from(2u128).pow(U256::from(96)),
            liquidity: 1_000_000,
            fail_views: false,
            bridge_confirms_after: Some(1),
            bridge_malformed_polls: 0,
            bridge_polls: Mutex::new(0),
            submitted: Mutex::new(Vec::new()),
            hash_counter: Mutex::new(0),
        }
    }

    pub fn submissions(&self) -> Vec<ChainCall> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submissions_to(&self, to: Address) -> Vec<ChainCall> {
        self.submissions()
            .into_iter()
            .filter(|call| call.to == to)
            .collect()
    }

    fn word(value: U256) -> Vec<u8> {
        value.to_be_bytes::<32>().to_vec()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn network(&self) -> Network {
        self.network
    }

    async fn get_balance(&self, _address: Address) -> ArbResult<U256> {
        Ok(self.native_balance)
    }

    async fn get_gas_price(&self) -> ArbResult<u128> {
        Ok(self.gas_price_wei)
    }

    async fn estimate_gas(&self, _call: &ChainCall) -> ArbResult<u64> {
        Ok(150_000)
    }

    async fn submit_transaction(&self, call: &ChainCall) -> ArbResult<String> {
        self.submitted.lock().unwrap().push(call.clone());
        let mut counter = self.hash_counter.lock().unwrap();
        *counter += 1;
        Ok(format!("{:#066x}", *counter))
    }

    async fn wait_for_receipt(&self, tx_hash: &str, timeout: Duration) -> ArbResult<TxReceipt> {
        if self.fail_receipts {
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
        Ok(TxReceipt {
            status: self.receipt_status,
            gas_used: 120_000,
        })
    }

    async fn call_view(&self, call: &ChainCall) -> ArbResult<Vec<u8>> {
        if self.fail_views {
            return Err(ArbError::Network {
                message: format!("{} view call failed", self.network),
                source: None,
                retry_count: 0,
            });
        }

        let selector: [u8; 4] = match call.data.get(..4) {
            Some(bytes) => [bytes[0], bytes[1], bytes[2], bytes[3]],
            None => {
                return Err(ArbError::DataParsing {
                    context: "mock view call".to_string(),
                    source: anyhow::anyhow!("calldata shorter than a selector"),
                });
            }
        };

        if selector == contracts::selector(SIG_BALANCE_OF) {
            Ok(Self::word(self.token_balance))
        } else if selector == contracts::selector(SIG_ALLOWANCE) {
            Ok(Self::word(self.allowance))
        } else if selector == contracts::selector(SIG_SLOT0) {
            // sqrtPriceX96 plus six untouched words
            let mut out = Self::word(self.sqrt_price_x96);
            out.extend_from_slice(&[0u8; 32 * 6]);
            Ok(out)
        } else if selector == contracts::selector(SIG_LIQUIDITY) {
            Ok(Self::word(U256::from(self.liquidity)))
        } else if selector == contracts::selector(SIG_BRIDGE_STATUS) {
            let mut polls = self.bridge_polls.lock().unwrap();
            *polls += 1;
            if *polls <= self.bridge_malformed_polls {
                return Ok(Vec::new());
            }
            let code = match self.bridge_confirms_after {
                Some(n) if *polls >= n => 1u8,
                _ => 0u8,
            };
            Ok(Self::word(U256::from(code)))
        } else {
            Err(ArbError::DataParsing {
                context: "mock view call".to_string(),
                source: anyhow::anyhow!("unrecognized selector {selector:?}"),
            })
        }
    }
}
