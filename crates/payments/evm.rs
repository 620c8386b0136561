use serde_json::Value;

use super::verifier::VerificationError;

pub const GET_TRANSACTION_METHOD: &str = "eth_getTransactionByHash";
pub const GET_RECEIPT_METHOD: &str = "eth_getTransactionReceipt";
const SUCCESS_STATUS: &str = "0x1";

/// Reads the native value sent to `expected_recipient` from an `eth_getTransactionByHash` result.
pub fn transfer_amount(
    tx: &Value,
    expected_recipient: &str,
    decimals: u32,
) -> Result<f64, VerificationError> {
    if tx.is_null() {
        return Err(VerificationError::NotFound);
    }

    // Contract creations have no `to`.
    let to = tx["to"].as_str().unwrap_or_default();
    if to.is_empty() || !to.eq_ignore_ascii_case(expected_recipient.trim()) {
        return Err(VerificationError::RecipientMismatch);
    }

    let value = tx["value"].as_str().ok_or_else(|| {
        VerificationError::MalformedResponse("transaction has no value field".to_string())
    })?;
    let wei = parse_hex_quantity(value)?;

    Ok(wei as f64 / 10f64.powi(decimals as i32))
}

/// A receipt only exists once the transaction is mined.
pub fn ensure_receipt_succeeded(receipt: &Value) -> Result<(), VerificationError> {
    if receipt.is_null() {
        return Err(VerificationError::Pending);
    }

    match receipt["status"].as_str() {
        Some(status) if status.eq_ignore_ascii_case(SUCCESS_STATUS) => Ok(()),
        _ => Err(VerificationError::FailedOnChain),
    }
}

fn parse_hex_quantity(raw: &str) -> Result<u128, VerificationError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    if digits.is_empty() {
        return Ok(0);
    }

    u128::from_str_radix(digits, 16).map_err(|err| {
        VerificationError::MalformedResponse(format!("invalid hex quantity '{raw}': {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WALLET: &str = "0x8A32985652a72B26FfA9bdb852Ed59b9977017F9";

    #[test]
    fn converts_wei_to_native_units() {
        // 15 * 10^18 wei
        let tx = json!({"to": WALLET.to_lowercase(), "value": "0xd02ab486cedc0000"});
        let amount = transfer_amount(&tx, WALLET, 18).unwrap();
        assert!((amount - 15.0).abs() < 1e-9);
    }

    #[test]
    fn null_transaction_is_not_found() {
        assert!(matches!(
            transfer_amount(&Value::Null, WALLET, 18),
            Err(VerificationError::NotFound)
        ));
    }

    #[test]
    fn other_recipient_is_rejected() {
        let tx = json!({"to": "0x0000000000000000000000000000000000000001", "value": "0x1"});
        assert!(matches!(
            transfer_amount(&tx, WALLET, 18),
            Err(VerificationError::RecipientMismatch)
        ));
    }

    #[test]
    fn contract_creation_is_rejected() {
        let tx = json!({"to": null, "value": "0x1"});
        assert!(matches!(
            transfer_amount(&tx, WALLET, 18),
            Err(VerificationError::RecipientMismatch)
        ));
    }

    #[test]
    fn garbage_value_is_malformed() {
        let tx = json!({"to": WALLET, "value": "0xzz"});
        assert!(matches!(
            transfer_amount(&tx, WALLET, 18),
            Err(VerificationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn receipt_states() {
        assert!(matches!(
            ensure_receipt_succeeded(&Value::Null),
            Err(VerificationError::Pending)
        ));
        assert!(matches!(
            ensure_receipt_succeeded(&json!({"status": "0x0"})),
            Err(VerificationError::FailedOnChain)
        ));
        assert!(ensure_receipt_succeeded(&json!({"status": "0x1"})).is_ok());
    }
}
