//! Monitored network definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two networks the bot arbitrages between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Polygon,
    Base,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Polygon => 137,
            Network::Base => 8453,
        }
    }

    /// Native token used to pay gas on this network.
    pub fn gas_token(&self) -> &'static str {
        match self {
            Network::Polygon => "MATIC",
            Network::Base => "ETH",
        }
    }

    pub fn counterpart(&self) -> Network {
        match self {
            Network::Polygon => Network::Base,
            Network::Base => Network::Polygon,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Polygon => write!(f, "polygon"),
            Network::Base => write!(f, "base"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "polygon" => Ok(Network::Polygon),
            "base" => Ok(Network::Base),
            other => Err(format!("unknown network: {other}")),
        }
    }
}
