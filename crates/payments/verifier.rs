use std::collections::HashMap;

use async_trait::async_trait;
use mockall::automock;
use serde_json::json;
use tracing::{info, warn};

use super::{
    evm,
    json_rpc::{DEFAULT_RPC_TIMEOUT, JsonRpcClient},
    solana,
};
use crate::domain::value_objects::enums::networks::{Network, NetworkFamily};

const MIN_TX_HASH_LEN: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no RPC endpoint configured for {0}")]
    MissingEndpoint(Network),
    #[error("transaction not found (pending or nonexistent)")]
    NotFound,
    #[error("transaction is not confirmed yet")]
    Pending,
    #[error("transaction recipient does not match the project wallet")]
    RecipientMismatch,
    #[error("transaction failed on chain")]
    FailedOnChain,
    #[error("transaction did not credit the project wallet")]
    NoTransfer,
    #[error("malformed RPC response: {0}")]
    MalformedResponse(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("RPC transport failure: {0}")]
    Transport(String),
}

/// What to do when a network has no RPC endpoint configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMissingEndpoint {
    /// Accept the payment as exactly the requested minimum, unverified.
    UseFallback,
    Fail,
}

impl OnMissingEndpoint {
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Fail } else { Self::UseFallback }
    }
}

#[automock]
#[async_trait]
pub trait ChainVerifier {
    /// Returns the confirmed native amount sent to `expected_recipient` by `tx_hash`.
    async fn verify_transaction(
        &self,
        network: Network,
        tx_hash: &str,
        expected_recipient: &str,
        minimum_amount: f64,
    ) -> Result<f64, VerificationError>;
}

pub struct RpcChainVerifier {
    rpc: JsonRpcClient,
    endpoints: HashMap<Network, String>,
    on_missing_endpoint: OnMissingEndpoint,
}

impl RpcChainVerifier {
    pub fn new(
        endpoints: HashMap<Network, String>,
        on_missing_endpoint: OnMissingEndpoint,
    ) -> anyhow::Result<Self> {
        let endpoints = endpoints
            .into_iter()
            .filter(|(_, url)| !url.trim().is_empty())
            .collect::<HashMap<_, _>>();

        info!(
            configured = endpoints.len(),
            on_missing_endpoint = ?on_missing_endpoint,
            "payments: chain verifier ready"
        );

        Ok(Self {
            rpc: JsonRpcClient::new(DEFAULT_RPC_TIMEOUT)?,
            endpoints,
            on_missing_endpoint,
        })
    }

    async fn verify_evm(
        &self,
        url: &str,
        network: Network,
        tx_hash: &str,
        expected_recipient: &str,
    ) -> Result<f64, VerificationError> {
        let tx = self
            .rpc
            .call(url, 1, evm::GET_TRANSACTION_METHOD, json!([tx_hash]))
            .await?;
        let amount = evm::transfer_amount(&tx, expected_recipient, network.native_decimals())?;

        let receipt = self
            .rpc
            .call(url, 2, evm::GET_RECEIPT_METHOD, json!([tx_hash]))
            .await?;
        evm::ensure_receipt_succeeded(&receipt)?;

        Ok(amount)
    }

    async fn verify_solana(
        &self,
        url: &str,
        network: Network,
        tx_hash: &str,
        expected_recipient: &str,
    ) -> Result<f64, VerificationError> {
        let tx = self
            .rpc
            .call(
                url,
                1,
                solana::GET_TRANSACTION_METHOD,
                solana::get_transaction_params(tx_hash),
            )
            .await?;

        solana::transfer_amount(&tx, expected_recipient, network.native_decimals())
    }
}

#[async_trait]
impl ChainVerifier for RpcChainVerifier {
    async fn verify_transaction(
        &self,
        network: Network,
        tx_hash: &str,
        expected_recipient: &str,
        minimum_amount: f64,
    ) -> Result<f64, VerificationError> {
        let tx_hash = tx_hash.trim();
        if tx_hash.len() < MIN_TX_HASH_LEN {
            return Err(VerificationError::InvalidInput(format!(
                "transaction hash must be at least {MIN_TX_HASH_LEN} characters"
            )));
        }
        if expected_recipient.trim().is_empty() {
            return Err(VerificationError::InvalidInput(
                "expected recipient is empty".to_string(),
            ));
        }

        let Some(url) = self.endpoints.get(&network) else {
            return match self.on_missing_endpoint {
                OnMissingEndpoint::UseFallback => {
                    warn!(
                        %network,
                        minimum_amount,
                        "payments: no RPC endpoint configured, accepting payment unverified"
                    );
                    Ok(minimum_amount)
                }
                OnMissingEndpoint::Fail => Err(VerificationError::MissingEndpoint(network)),
            };
        };

        match network.family() {
            NetworkFamily::Evm => {
                self.verify_evm(url, network, tx_hash, expected_recipient)
                    .await
            }
            NetworkFamily::Solana => {
                self.verify_solana(url, network, tx_hash, expected_recipient)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_stub::{CannedResponse, StubServer};

    const WALLET: &str = "0x8A32985652a72B26FfA9bdb852Ed59b9977017F9";
    const TX_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

    fn verifier(endpoints: HashMap<Network, String>, policy: OnMissingEndpoint) -> RpcChainVerifier {
        RpcChainVerifier::new(endpoints, policy).unwrap()
    }

    #[tokio::test]
    async fn fallback_returns_minimum_without_endpoint() {
        let verifier = verifier(HashMap::new(), OnMissingEndpoint::UseFallback);

        let amount = verifier
            .verify_transaction(Network::Polygon, TX_HASH, WALLET, 15.0)
            .await
            .unwrap();

        assert_eq!(amount, 15.0);
    }

    #[tokio::test]
    async fn strict_mode_rejects_missing_endpoint() {
        let verifier = verifier(HashMap::new(), OnMissingEndpoint::Fail);

        let result = verifier
            .verify_transaction(Network::Solana, TX_HASH, WALLET, 15.0)
            .await;

        assert!(matches!(
            result,
            Err(VerificationError::MissingEndpoint(Network::Solana))
        ));
    }

    #[tokio::test]
    async fn blank_endpoint_counts_as_missing() {
        let verifier = verifier(
            HashMap::from([(Network::Ethereum, "  ".to_string())]),
            OnMissingEndpoint::Fail,
        );

        let result = verifier
            .verify_transaction(Network::Ethereum, TX_HASH, WALLET, 15.0)
            .await;

        assert!(matches!(result, Err(VerificationError::MissingEndpoint(_))));
    }

    #[tokio::test]
    async fn short_hash_is_invalid_input() {
        let verifier = verifier(HashMap::new(), OnMissingEndpoint::UseFallback);

        let result = verifier
            .verify_transaction(Network::Polygon, "0x123", WALLET, 15.0)
            .await;

        assert!(matches!(result, Err(VerificationError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn empty_recipient_is_invalid_input() {
        let verifier = verifier(HashMap::new(), OnMissingEndpoint::UseFallback);

        let result = verifier
            .verify_transaction(Network::Polygon, TX_HASH, " ", 15.0)
            .await;

        assert!(matches!(result, Err(VerificationError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_failure() {
        // Port 9 (discard) is closed on loopback, so the connection is refused immediately.
        let verifier = verifier(
            HashMap::from([(Network::Polygon, "http://127.0.0.1:9".to_string())]),
            OnMissingEndpoint::UseFallback,
        );

        let result = verifier
            .verify_transaction(Network::Polygon, TX_HASH, WALLET, 15.0)
            .await;

        assert!(matches!(result, Err(VerificationError::Transport(_))));
    }

    fn evm_tx(to: &str) -> CannedResponse {
        CannedResponse::json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "hash": TX_HASH,
                "to": to,
                // 1.5 coins in wei
                "value": "0x14d1120d7b160000"
            }
        }))
    }

    fn receipt(result: serde_json::Value) -> CannedResponse {
        CannedResponse::json(json!({"jsonrpc": "2.0", "id": 2, "result": result}))
    }

    fn live(server: &StubServer, network: Network) -> RpcChainVerifier {
        verifier(
            HashMap::from([(network, server.url.clone())]),
            OnMissingEndpoint::Fail,
        )
    }

    #[tokio::test]
    async fn evm_payment_reads_transaction_then_receipt() {
        let server = StubServer::start(vec![
            evm_tx(&WALLET.to_lowercase()),
            receipt(json!({"status": "0x1"})),
        ])
        .await;
        let verifier = live(&server, Network::Polygon);

        let amount = verifier
            .verify_transaction(Network::Polygon, TX_HASH, WALLET, 15.0)
            .await
            .unwrap();
        assert_eq!(amount, 1.5);

        let requests = server.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].request_line, "POST / HTTP/1.1");
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        assert_eq!(
            requests[0].json(),
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "eth_getTransactionByHash",
                "params": [TX_HASH]
            })
        );
        assert_eq!(
            requests[1].json(),
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "eth_getTransactionReceipt",
                "params": [TX_HASH]
            })
        );
    }

    #[tokio::test]
    async fn reverted_receipt_is_failed_on_chain() {
        let server = StubServer::start(vec![evm_tx(WALLET), receipt(json!({"status": "0x0"}))]).await;
        let verifier = live(&server, Network::Ethereum);

        let result = verifier
            .verify_transaction(Network::Ethereum, TX_HASH, WALLET, 15.0)
            .await;

        assert!(matches!(result, Err(VerificationError::FailedOnChain)));
        assert_eq!(server.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn missing_receipt_is_pending() {
        let server = StubServer::start(vec![evm_tx(WALLET), receipt(serde_json::Value::Null)]).await;
        let verifier = live(&server, Network::Arbitrum);

        let result = verifier
            .verify_transaction(Network::Arbitrum, TX_HASH, WALLET, 15.0)
            .await;

        assert!(matches!(result, Err(VerificationError::Pending)));
    }

    #[tokio::test]
    async fn wrong_recipient_skips_the_receipt() {
        // Only one response is served; a second call would be refused.
        let server =
            StubServer::start(vec![evm_tx("0x0000000000000000000000000000000000000001")]).await;
        let verifier = live(&server, Network::Optimism);

        let result = verifier
            .verify_transaction(Network::Optimism, TX_HASH, WALLET, 15.0)
            .await;

        assert!(matches!(result, Err(VerificationError::RecipientMismatch)));
        let requests = server.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].json()["method"], "eth_getTransactionByHash");
    }

    #[tokio::test]
    async fn non_success_status_is_transport_failure() {
        let server = StubServer::start(vec![CannedResponse::text(503, "upstream unavailable")]).await;
        let verifier = live(&server, Network::Polygon);

        let result = verifier
            .verify_transaction(Network::Polygon, TX_HASH, WALLET, 15.0)
            .await;

        assert!(matches!(result, Err(VerificationError::Transport(message)) if message.contains("503")));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = StubServer::start(vec![CannedResponse::text(200, "<html>gateway</html>")]).await;
        let verifier = live(&server, Network::Polygon);

        let result = verifier
            .verify_transaction(Network::Polygon, TX_HASH, WALLET, 15.0)
            .await;

        assert!(matches!(result, Err(VerificationError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn solana_request_asks_for_confirmed_json() {
        let signature = "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";
        let server = StubServer::start(vec![CannedResponse::json(
            json!({"jsonrpc": "2.0", "id": 1, "result": null}),
        )])
        .await;
        let verifier = live(&server, Network::Solana);

        let result = verifier
            .verify_transaction(Network::Solana, signature, "SoLWallet1111111111111111111111111111111111", 0.1)
            .await;

        assert!(matches!(result, Err(VerificationError::NotFound)));
        let requests = server.requests().await;
        assert_eq!(
            requests[0].json(),
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getTransaction",
                "params": [signature, {"encoding": "json", "commitment": "confirmed"}]
            })
        );
    }
}
