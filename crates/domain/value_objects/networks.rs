use std::collections::HashMap;

use serde::Serialize;

use crate::domain::value_objects::enums::networks::Network;

pub const DEFAULT_EVM_WALLET: &str = "0x8A32985652a72B26FfA9bdb852Ed59b9977017F9";
pub const DEFAULT_SOLANA_WALLET: &str = "8nX9c66wJxh6cCoSiERU5UQQCEcypXM8v5XowFe3fFv8";

/// Project receiving wallet per network. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkWallets {
    wallets: HashMap<Network, String>,
}

impl NetworkWallets {
    pub fn new(wallets: HashMap<Network, String>) -> Self {
        let wallets = wallets
            .into_iter()
            .map(|(network, wallet)| (network, wallet.trim().to_string()))
            .filter(|(_, wallet)| !wallet.is_empty())
            .collect();

        Self { wallets }
    }

    /// Built-in wallets with per-network overrides applied on top.
    pub fn with_overrides(overrides: HashMap<Network, String>) -> Self {
        let mut wallets = Self::defaults().wallets;
        for (network, wallet) in overrides {
            let wallet = wallet.trim().to_string();
            if !wallet.is_empty() {
                wallets.insert(network, wallet);
            }
        }

        Self { wallets }
    }

    pub fn defaults() -> Self {
        let wallets = Network::ALL
            .into_iter()
            .map(|network| {
                let wallet = match network {
                    Network::Solana => DEFAULT_SOLANA_WALLET,
                    _ => DEFAULT_EVM_WALLET,
                };
                (network, wallet.to_string())
            })
            .collect();

        Self { wallets }
    }

    pub fn wallet_for(&self, network: Network) -> Option<&str> {
        self.wallets.get(&network).map(String::as_str)
    }

    /// Networks in their canonical order, each with its wallet when one is configured.
    pub fn listing(&self) -> Vec<NetworkDto> {
        Network::ALL
            .into_iter()
            .map(|network| NetworkDto {
                code: network,
                wallet: self.wallet_for(network).map(str::to_string),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NetworkDto {
    pub code: Network,
    pub wallet: Option<String>,
}
