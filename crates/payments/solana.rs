use serde_json::{Value, json};

use super::verifier::VerificationError;

pub const GET_TRANSACTION_METHOD: &str = "getTransaction";

pub fn get_transaction_params(tx_hash: &str) -> Value {
    json!([tx_hash, {"encoding": "json", "commitment": "confirmed"}])
}

/// Reads how much `expected_recipient` gained in a `getTransaction` result,
/// from the pre/post balance delta at its account index.
pub fn transfer_amount(
    tx: &Value,
    expected_recipient: &str,
    decimals: u32,
) -> Result<f64, VerificationError> {
    if tx.is_null() {
        return Err(VerificationError::NotFound);
    }

    let meta = &tx["meta"];
    if !meta.is_object() {
        return Err(VerificationError::MalformedResponse(
            "transaction has no meta".to_string(),
        ));
    }
    if !meta["err"].is_null() {
        return Err(VerificationError::FailedOnChain);
    }

    let account_keys = tx["transaction"]["message"]["accountKeys"]
        .as_array()
        .ok_or_else(|| {
            VerificationError::MalformedResponse("transaction has no account keys".to_string())
        })?;

    let expected_recipient = expected_recipient.trim();
    let index = account_keys
        .iter()
        .position(|key| account_key(key) == Some(expected_recipient))
        .ok_or(VerificationError::RecipientMismatch)?;

    let pre = balance_at(&meta["preBalances"], index)?;
    let post = balance_at(&meta["postBalances"], index)?;

    let delta = i128::from(post) - i128::from(pre);
    if delta <= 0 {
        return Err(VerificationError::NoTransfer);
    }

    Ok(delta as f64 / 10f64.powi(decimals as i32))
}

// `json` encoding yields plain strings, `jsonParsed` yields `{pubkey, ...}` objects.
fn account_key(key: &Value) -> Option<&str> {
    key.as_str().or_else(|| key["pubkey"].as_str())
}

fn balance_at(balances: &Value, index: usize) -> Result<u64, VerificationError> {
    balances
        .as_array()
        .and_then(|values| values.get(index))
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            VerificationError::MalformedResponse(format!("no balance for account index {index}"))
        })
}
