//! Manual ABI encoding for the small contract surface the bot touches:
//! ERC20 reads/approvals, Uniswap V3 pool state and swaps, and the
//! AggLayer-style bridge.

use alloy::primitives::{Address, B256, U256, keccak256};
use anyhow::anyhow;
use crate::errors::{ArbError, ArbResult};

pub const SIG_BALANCE_OF: &str = "balanceOf(address)";
pub const SIG_ALLOWANCE: &str = "allowance(address,address)";
pub const SIG_APPROVE: &str = "approve(address,uint256)";
pub const SIG_SLOT0: &str = "slot0()";
pub const SIG_LIQUIDITY: &str = "liquidity()";
pub const SIG_SWAP: &str = "swap(address,bool,int256,uint160,bytes)";
pub const SIG_BRIDGE_TOKEN: &str = "bridgeToken(address,uint256,uint256,address)";
pub const SIG_BRIDGE_STATUS: &str = "getBridgeStatus(bytes32)";

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn push_address(out: &mut Vec<u8>, address: Address) {
    out.extend_from_slice(&[0u8; 12]);
    out.extend_from_slice(address.as_slice());
}

fn push_uint(out: &mut Vec<u8>, value: U256) {
    out.extend_from_slice(&value.to_be_bytes::<32>());
}

pub fn encode_balance_of(account: Address) -> Vec<u8> {
    let mut data = selector(SIG_BALANCE_OF).to_vec();
    push_address(&mut data, account);
    data
}

pub fn encode_allowance(owner: Address, spender: Address) -> Vec<u8> {
    let mut data = selector(SIG_ALLOWANCE).to_vec();
    push_address(&mut data, owner);
    push_address(&mut data, spender);
    data
}

pub fn encode_approve(spender: Address, amount: U256) -> Vec<u8> {
    let mut data = selector(SIG_APPROVE).to_vec();
    push_address(&mut data, spender);
    push_uint(&mut data, amount);
    data
}

pub fn encode_slot0() -> Vec<u8> {
    selector(SIG_SLOT0).to_vec()
}

pub fn encode_liquidity() -> Vec<u8> {
    selector(SIG_LIQUIDITY).to_vec()
}

/// Direct pool swap. `zero_for_one` sells token0 into token1; the price
/// limit is left open and the callback payload empty.
pub fn encode_swap(recipient: Address, zero_for_one: bool, amount: U256) -> Vec<u8> {
    let mut data = selector(SIG_SWAP).to_vec();
    push_address(&mut data, recipient);
    push_uint(&mut data, U256::from(zero_for_one as u8));
    push_uint(&mut data, amount);
    push_uint(&mut data, U256::ZERO);
    // dynamic `bytes` tail: offset to it, then zero length
    push_uint(&mut data, U256::from(160));
    push_uint(&mut data, U256::ZERO);
    data
}

pub fn encode_bridge_token(
    token: Address,
    amount: U256,
    target_chain_id: u64,
    recipient: Address,
) -> Vec<u8> {
    let mut data = selector(SIG_BRIDGE_TOKEN).to_vec();
    push_address(&mut data, token);
    push_uint(&mut data, amount);
    push_uint(&mut data, U256::from(target_chain_id));
    push_address(&mut data, recipient);
    data
}

/// The bridge keys transfers by the 32-byte source transaction hash.
pub fn encode_bridge_status(bridge_id: B256) -> Vec<u8> {
    let mut data = selector(SIG_BRIDGE_STATUS).to_vec();
    data.extend_from_slice(bridge_id.as_slice());
    data
}

/// Decode a single uint256 return value (balanceOf, allowance, liquidity).
pub fn decode_uint(data: &[u8]) -> ArbResult<U256> {
    if data.len() < 32 {
        return Err(ArbError::DataParsing {
            context: format!("expected a 32-byte word, got {} bytes", data.len()),
            source: anyhow!("short return data"),
        });
    }
    Ok(U256::from_be_slice(&data[..32]))
}

/// First word of slot0() is the packed sqrtPriceX96.
pub fn decode_sqrt_price(data: &[u8]) -> ArbResult<U256> {
    decode_uint(data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStatusCode {
    Pending,
    Completed,
    Failed,
}

/// getBridgeStatus returns (uint8 status, uint256 amount, address recipient);
/// only the status code matters here.
pub fn decode_bridge_status(data: &[u8]) -> ArbResult<BridgeStatusCode> {
    let word = decode_uint(data)?;
    match u8::try_from(word).map_err(|_| ArbError::DataParsing {
        context: "bridge status out of range".to_string(),
        source: anyhow!("status word {word}"),
    })? {
        0 => Ok(BridgeStatusCode::Pending),
        1 => Ok(BridgeStatusCode::Completed),
        2 => Ok(BridgeStatusCode::Failed),
        other => Err(ArbError::DataParsing {
            context: format!("unknown bridge status code {other}"),
            source: anyhow!("unexpected status"),
        }),
    }
}
