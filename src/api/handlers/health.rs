use axum::{extract::State, Json};

use crate::api::{state::AppState, types::HealthResponse};

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let agent = match &state.agent {
        Some(agent) if agent.is_running() => "running",
        Some(_) => "stopped",
        None => "disabled",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        agent: agent.to_string(),
    })
}
