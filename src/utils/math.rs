//! Mathematical utility functions

use alloy::primitives::U256;
use anyhow::anyhow;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use crate::errors::{ArbError, ArbResult};

pub fn pow10(n: i32) -> Decimal {
    match n {
        0 => dec!(1),
        6 => dec!(1_000_000),
        18 => dec!(1_000_000_000_000_000_000),
        _ => {
            let mut result = dec!(1);
            if n > 0 {
                for _ in 0..n {
                    result *= dec!(10);
                }
            } else {
                for _ in 0..(-n) {
                    result /= dec!(10);
                }
            }
            result
        }
    }
}

/// Unpack a Uniswap V3 sqrtPriceX96 into a linear token1/token0 price.
/// A uint160 square exceeds what Decimal can hold, so the conversion goes
/// through f64 and only the final price is lifted back into Decimal.
pub fn sqrt_price_x96_to_price(sqrt_price_x96: U256) -> ArbResult<Decimal> {
    if sqrt_price_x96.is_zero() {
        return Err(ArbError::DataParsing {
            context: "pool reported a zero sqrt price".to_string(),
            source: anyhow!("sqrtPriceX96 = 0"),
        });
    }
    let sqrt: f64 = sqrt_price_x96
        .to_string()
        .parse()
        .map_err(|e| ArbError::DataParsing {
            context: "sqrtPriceX96 not representable".to_string(),
            source: anyhow!("{e}"),
        })?;
    let ratio = sqrt / 2f64.powi(96);
    Decimal::from_f64(ratio * ratio).ok_or_else(|| ArbError::DataParsing {
        context: "pool price out of Decimal range".to_string(),
        source: anyhow!("price = {}", ratio * ratio),
    })
}

/// Token amount in whole units to its 18-decimal wei representation.
/// None when the amount does not fit.
pub fn to_wei(amount: Decimal) -> Option<U256> {
    if amount.is_sign_negative() {
        return None;
    }
    (amount * pow10(18)).to_u128().map(U256::from)
}

/// Wei back to whole token units, saturating for amounts Decimal cannot hold.
pub fn from_wei(wei: u128) -> Decimal {
    Decimal::from_u128(wei)
        .map(|d| d / pow10(18))
        .unwrap_or(Decimal::MAX)
}

pub fn gwei_to_wei(gwei: u64) -> u128 {
    gwei as u128 * 1_000_000_000
}
