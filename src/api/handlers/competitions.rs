use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::api::handlers::models::parse_amount_field;
use crate::api::{state::AppState, types::*};
use crate::domain::ROUTE_COMPETITION_ENTER;

/// POST /competitions/{id}/enter
pub async fn enter_competition(
    State(state): State<AppState>,
    Path(competition_id): Path<u64>,
    Json(body): Json<Value>,
) -> std::result::Result<Json<CompetitionEntry>, (StatusCode, Json<PaymentRequired>)> {
    let decision = state
        .gate
        .authorize_value(&body, ROUTE_COMPETITION_ENTER)
        .await;
    if !decision.authorized {
        return Err((
            StatusCode::PAYMENT_REQUIRED,
            Json(PaymentRequired::new(decision.reason)),
        ));
    }

    let model_id = body
        .get("modelId")
        .and_then(Value::as_u64)
        .ok_or_else(|| bad_request("missing or invalid modelId"))?;

    // The entry fee is advisory in the body; the gate already enforced the
    // route's tier.
    let _ = parse_amount_field(&body, "entryFee");

    Ok(Json(CompetitionEntry {
        status: "entered".to_string(),
        competition_id,
        model_id,
    }))
}

fn bad_request(message: &str) -> (StatusCode, Json<PaymentRequired>) {
    (
        StatusCode::BAD_REQUEST,
        Json(PaymentRequired {
            error: message.to_string(),
            requires_payment: false,
        }),
    )
}
