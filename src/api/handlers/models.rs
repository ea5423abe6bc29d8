use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::api::{state::AppState, types::*};
use crate::domain::{ROUTE_MODEL_DETAILS, ROUTE_MODEL_INVEST};

/// GET /models/{id}/details
///
/// Payment fields travel as query parameters on this route
/// (`paymentAddress`, `paymentAmount`, `paymentProof`).
pub async fn get_model_details(
    State(state): State<AppState>,
    Path(model_id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
) -> std::result::Result<Json<ModelDetails>, (StatusCode, Json<PaymentRequired>)> {
    let body = json!({
        "paymentAddress": params.get("paymentAddress"),
        "paymentAmount": params.get("paymentAmount"),
        "paymentProof": params.get("paymentProof"),
    });
    let decision = state.gate.authorize_value(&body, ROUTE_MODEL_DETAILS).await;
    if !decision.authorized {
        return Err((
            StatusCode::PAYMENT_REQUIRED,
            Json(PaymentRequired::new(decision.reason)),
        ));
    }

    let owner = state.ledger.get_owner(model_id).await.map_err(internal)?;
    let total_assets = state
        .ledger
        .get_total_assets(model_id)
        .await
        .map_err(internal)?;

    Ok(Json(ModelDetails {
        model_id,
        owner: format!("{owner:?}"),
        total_assets: total_assets.to_string(),
    }))
}

/// POST /models/{id}/invest
pub async fn invest_in_model(
    State(state): State<AppState>,
    Path(model_id): Path<u64>,
    Json(body): Json<Value>,
) -> std::result::Result<Json<InvestAccepted>, (StatusCode, Json<PaymentRequired>)> {
    let decision = state.gate.authorize_value(&body, ROUTE_MODEL_INVEST).await;
    if !decision.authorized {
        return Err((
            StatusCode::PAYMENT_REQUIRED,
            Json(PaymentRequired::new(decision.reason)),
        ));
    }

    let amount = parse_amount_field(&body, "amount").ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(PaymentRequired {
                error: "missing or invalid amount".to_string(),
                requires_payment: false,
            }),
        )
    })?;

    Ok(Json(InvestAccepted {
        status: "accepted".to_string(),
        model_id,
        amount: amount.to_string(),
    }))
}

/// Investment amounts follow the same integer-or-string coercion as payment
/// amounts.
pub(super) fn parse_amount_field(body: &Value, field: &str) -> Option<u128> {
    match body.get(field)? {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) => s.trim().parse::<u128>().ok(),
        _ => None,
    }
}

fn internal(err: crate::error::FundgateError) -> (StatusCode, Json<PaymentRequired>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(PaymentRequired {
            error: err.to_string(),
            requires_payment: false,
        }),
    )
}
