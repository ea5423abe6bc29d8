use serde::{Deserialize, Serialize};

// ============================================================================
// Payment Types
// ============================================================================

/// Body of every 402 denial on a protected action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    pub error: String,
    pub requires_payment: bool,
}

impl PaymentRequired {
    pub fn new(reason: Option<String>) -> Self {
        Self {
            error: reason.unwrap_or_else(|| "payment required".to_string()),
            requires_payment: true,
        }
    }
}

/// One fee-schedule row from `GET /payment/amounts`. The base-unit amount is
/// a string so no client-side float parsing can lose precision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAmount {
    pub route: String,
    pub description: String,
    pub amount: String,
    pub amount_base_units: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Model Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDetails {
    pub model_id: u64,
    pub owner: String,
    pub total_assets: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestAccepted {
    pub status: String,
    pub model_id: u64,
    pub amount: String,
}

// ============================================================================
// Competition Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionEntry {
    pub status: String,
    pub competition_id: u64,
    pub model_id: u64,
}

// ============================================================================
// Health Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: i64,
    pub agent: String,
}
