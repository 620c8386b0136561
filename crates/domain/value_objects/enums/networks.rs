use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Ethereum,
    Polygon,
    Arbitrum,
    Optimism,
    Solana,
}

/// How a network's transactions are fetched and read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFamily {
    Evm,
    Solana,
}

impl Network {
    pub const ALL: [Network; 5] = [
        Network::Ethereum,
        Network::Polygon,
        Network::Arbitrum,
        Network::Optimism,
        Network::Solana,
    ];

    pub fn family(&self) -> NetworkFamily {
        match self {
            Network::Ethereum | Network::Polygon | Network::Arbitrum | Network::Optimism => {
                NetworkFamily::Evm
            }
            Network::Solana => NetworkFamily::Solana,
        }
    }

    /// Decimal places between the smallest unit (wei, lamports) and the native coin.
    pub fn native_decimals(&self) -> u32 {
        match self {
            Network::Ethereum | Network::Polygon | Network::Arbitrum | Network::Optimism => 18,
            Network::Solana => 9,
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let network = match self {
            Network::Ethereum => "ethereum",
            Network::Polygon => "polygon",
            Network::Arbitrum => "arbitrum",
            Network::Optimism => "optimism",
            Network::Solana => "solana",
        };
        write!(f, "{}", network)
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "ethereum" => Ok(Network::Ethereum),
            "polygon" => Ok(Network::Polygon),
            "arbitrum" => Ok(Network::Arbitrum),
            "optimism" => Ok(Network::Optimism),
            "solana" => Ok(Network::Solana),
            other => Err(format!("Unsupported network '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively_and_trims() {
        assert_eq!(" Polygon ".parse::<Network>(), Ok(Network::Polygon));
        assert_eq!("SOLANA".parse::<Network>(), Ok(Network::Solana));
    }

    #[test]
    fn rejects_unsupported_networks() {
        let err = "bitcoin".parse::<Network>().unwrap_err();
        assert!(err.contains("bitcoin"));
    }

    #[test]
    fn evm_networks_use_eighteen_decimals() {
        for network in Network::ALL {
            match network.family() {
                NetworkFamily::Evm => assert_eq!(network.native_decimals(), 18),
                NetworkFamily::Solana => assert_eq!(network.native_decimals(), 9),
            }
        }
    }
}
