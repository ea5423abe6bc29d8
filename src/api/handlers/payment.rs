use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;

use crate::api::{state::AppState, types::*};
use crate::domain::PaymentProof;

/// POST /payment/verify
///
/// Pre-checks a proof with the exact validation path the gate itself uses,
/// without consuming the token. 400 when a field is absent; 402 when the
/// proof does not hold up; 200 `{verified:true}` otherwise.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> std::result::Result<Json<VerifyOutcome>, (StatusCode, Json<VerifyOutcome>)> {
    let address = require_str(&body, "address")?;
    let amount = require_field(&body, "amount")?;
    let proof_token = require_str(&body, "proof")?;
    let route = require_str(&body, "route")?;

    // Fields present but unparseable are an invalid proof, not a bad request.
    let proof = match PaymentProof::from_fields(address, amount, proof_token, route) {
        Ok(proof) => proof,
        Err(e) => return Err(invalid(e.to_string())),
    };

    let decision = state.gate.verify(&proof).await;
    if decision.authorized {
        Ok(Json(VerifyOutcome {
            verified: true,
            error: None,
        }))
    } else {
        Err(invalid(
            decision.reason.unwrap_or_else(|| "invalid".to_string()),
        ))
    }
}

/// GET /payment/amounts
///
/// Read-only fee-schedule introspection. Output order and formatting are
/// fixed so repeated calls are byte-identical.
pub async fn get_payment_amounts(State(state): State<AppState>) -> Json<Vec<RouteAmount>> {
    let rows = state
        .gate
        .schedule()
        .routes()
        .iter()
        .map(|r| RouteAmount {
            route: r.key.clone(),
            description: r.description.clone(),
            amount: r.fee_display.to_string(),
            amount_base_units: r.fee_base_units.to_string(),
        })
        .collect();
    Json(rows)
}

fn invalid(error: String) -> (StatusCode, Json<VerifyOutcome>) {
    (
        StatusCode::PAYMENT_REQUIRED,
        Json(VerifyOutcome {
            verified: false,
            error: Some(error),
        }),
    )
}

fn missing(field: &str) -> (StatusCode, Json<VerifyOutcome>) {
    (
        StatusCode::BAD_REQUEST,
        Json(VerifyOutcome {
            verified: false,
            error: Some(format!("missing field: {field}")),
        }),
    )
}

fn require_str<'a>(
    body: &'a Value,
    field: &str,
) -> std::result::Result<&'a str, (StatusCode, Json<VerifyOutcome>)> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| missing(field))
}

fn require_field<'a>(
    body: &'a Value,
    field: &str,
) -> std::result::Result<&'a Value, (StatusCode, Json<VerifyOutcome>)> {
    match body.get(field) {
        Some(Value::Null) | None => Err(missing(field)),
        Some(value) => Ok(value),
    }
}
