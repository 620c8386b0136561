pub mod evm;
pub mod json_rpc;
pub mod solana;
pub mod verifier;

pub use verifier::{ChainVerifier, OnMissingEndpoint, RpcChainVerifier, VerificationError};
