use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Protected model actions
        .route("/models/:id/details", get(handlers::get_model_details))
        .route("/models/:id/invest", post(handlers::invest_in_model))
        // Protected competition actions
        .route("/competitions/:id/enter", post(handlers::enter_competition))
        // Payment endpoints
        .route("/payment/verify", post(handlers::verify_payment))
        .route("/payment/amounts", get(handlers::get_payment_amounts))
        // Health endpoint
        .route("/health", get(handlers::get_health))
        // Add state and CORS
        .with_state(state)
        .layer(cors)
}
