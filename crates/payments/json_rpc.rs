use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use super::verifier::VerificationError;

pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimal JSON-RPC 2.0 client over reqwest. One request per call, no retries.
#[derive(Clone)]
pub struct JsonRpcClient {
    http: reqwest::Client,
}

impl JsonRpcClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Posts `{jsonrpc, id, method, params}` and returns the `result` member,
    /// which is `Value::Null` when the node has nothing to report.
    pub async fn call(
        &self,
        url: &str,
        id: u64,
        method: &str,
        params: Value,
    ) -> Result<Value, VerificationError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        // Endpoint URLs usually embed an API key, so they are stripped from errors.
        let resp = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| VerificationError::Transport(err.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(VerificationError::Transport(format!(
                "{method} returned HTTP {status}"
            )));
        }

        let body = resp
            .json::<Value>()
            .await
            .map_err(|err| VerificationError::MalformedResponse(err.without_url().to_string()))?;

        debug!(method, id, "payments: rpc call completed");

        parse_envelope(body)
    }
}

pub(crate) fn parse_envelope(mut body: Value) -> Result<Value, VerificationError> {
    if !body.is_object() {
        return Err(VerificationError::MalformedResponse(
            "rpc response is not a JSON object".to_string(),
        ));
    }

    let error = body["error"].take();
    if !error.is_null() {
        let message = error["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(VerificationError::Rpc(message));
    }

    Ok(body["result"].take())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_result_member() {
        let result = parse_envelope(json!({"jsonrpc": "2.0", "id": 1, "result": {"to": "0x1"}}));
        assert_eq!(result.unwrap(), json!({"to": "0x1"}));
    }

    #[test]
    fn missing_result_is_null() {
        let result = parse_envelope(json!({"jsonrpc": "2.0", "id": 1, "result": null}));
        assert!(result.unwrap().is_null());
    }

    #[test]
    fn error_member_becomes_rpc_error() {
        let result = parse_envelope(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "invalid params"}
        }));
        assert!(matches!(result, Err(VerificationError::Rpc(message)) if message == "invalid params"));
    }

    #[test]
    fn non_object_body_is_malformed() {
        let result = parse_envelope(json!([1, 2, 3]));
        assert!(matches!(result, Err(VerificationError::MalformedResponse(_))));
    }
}
