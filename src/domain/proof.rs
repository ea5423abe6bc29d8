use crate::error::{FundgateError, Result};
use ethers::types::Address;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Caller-submitted evidence of payment, coerced from a loosely-typed request
/// body before any business logic runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof {
    /// Address the payment was made from
    pub payer: Address,
    /// Claimed payment amount in smallest ledger units
    pub amount: u128,
    /// Opaque proof token, verifiable against the ledger
    pub token: String,
    /// Route key the proof was issued for
    pub route: String,
}

impl PaymentProof {
    /// Build a proof from the protected-action body fields
    /// (`paymentAddress`, `paymentAmount`, `paymentProof`).
    pub fn from_body(body: &Value, route: &str) -> Result<Self> {
        let address = body
            .get("paymentAddress")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("paymentAddress"))?;
        let amount = body
            .get("paymentAmount")
            .ok_or_else(|| missing("paymentAmount"))?;
        let token = body
            .get("paymentProof")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("paymentProof"))?;

        Self::from_fields(address, amount, token, route)
    }

    /// Build a proof from already-extracted fields (the standalone verify
    /// surface uses `address`/`amount`/`proof` names).
    pub fn from_fields(address: &str, amount: &Value, token: &str, route: &str) -> Result<Self> {
        let payer = parse_address(address)?;
        let amount = parse_amount(amount).ok_or_else(|| {
            FundgateError::MalformedProof(format!("invalid payment amount: {amount}"))
        })?;
        let token = token.trim();
        if token.is_empty() {
            return Err(FundgateError::MalformedProof(
                "empty proof token".to_string(),
            ));
        }

        Ok(Self {
            payer,
            amount,
            token: token.to_string(),
            route: route.to_string(),
        })
    }

    /// Short stable fingerprint of the proof token, safe to log.
    pub fn token_fingerprint(&self) -> String {
        token_fingerprint(&self.token)
    }
}

/// SHA-256 fingerprint of a proof token, truncated for log lines. Raw tokens
/// never appear in logs.
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

fn missing(field: &str) -> FundgateError {
    FundgateError::MalformedProof(format!("missing field: {field}"))
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|_| FundgateError::MalformedProof(format!("invalid payer address: {raw}")))
}

/// Amounts arrive as JSON integers or as decimal strings; both map to the
/// exact base-unit integer. Floats are rejected.
fn parse_amount(value: &Value) -> Option<u128> {
    match value {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) => s.trim().parse::<u128>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::route::ROUTE_MODEL_INVEST;
    use serde_json::json;

    const PAYER: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn coerces_full_body() {
        let body = json!({
            "paymentAddress": PAYER,
            "paymentAmount": 1_000_000_000_000_000u64,
            "paymentProof": "tok1",
        });
        let proof = PaymentProof::from_body(&body, ROUTE_MODEL_INVEST).unwrap();
        assert_eq!(proof.amount, 1_000_000_000_000_000);
        assert_eq!(proof.token, "tok1");
        assert_eq!(proof.route, ROUTE_MODEL_INVEST);
    }

    #[test]
    fn accepts_string_amounts_without_precision_loss() {
        let body = json!({
            "paymentAddress": PAYER,
            "paymentAmount": "340282366920938463463374607431768211455",
            "paymentProof": "tok1",
        });
        let proof = PaymentProof::from_body(&body, ROUTE_MODEL_INVEST).unwrap();
        assert_eq!(proof.amount, u128::MAX);
    }

    #[test]
    fn rejects_missing_fields() {
        for field in ["paymentAddress", "paymentAmount", "paymentProof"] {
            let mut body = json!({
                "paymentAddress": PAYER,
                "paymentAmount": 100,
                "paymentProof": "tok1",
            });
            body.as_object_mut().unwrap().remove(field);
            let err = PaymentProof::from_body(&body, ROUTE_MODEL_INVEST).unwrap_err();
            assert!(
                matches!(err, FundgateError::MalformedProof(_)),
                "dropping {field} should be malformed, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_bad_address_and_float_amount() {
        let bad_addr = json!({
            "paymentAddress": "0xzz",
            "paymentAmount": 100,
            "paymentProof": "tok1",
        });
        assert!(PaymentProof::from_body(&bad_addr, ROUTE_MODEL_INVEST).is_err());

        let float_amount = json!({
            "paymentAddress": PAYER,
            "paymentAmount": 0.5,
            "paymentProof": "tok1",
        });
        assert!(PaymentProof::from_body(&float_amount, ROUTE_MODEL_INVEST).is_err());
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = token_fingerprint("tok1");
        let b = token_fingerprint("tok1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, token_fingerprint("tok2"));
    }
}
