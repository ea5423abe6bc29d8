use rust_decimal::Decimal;

/// Canonical key for the model details route
pub const ROUTE_MODEL_DETAILS: &str = "GET /models/{id}/details";

/// Canonical key for the model invest route
pub const ROUTE_MODEL_INVEST: &str = "POST /models/{id}/invest";

/// Canonical key for the competition entry route
pub const ROUTE_COMPETITION_ENTER: &str = "POST /competitions/{id}/enter";

/// A protected action and the fee required to perform it.
///
/// The base-unit amount is authoritative for every comparison; the display
/// amount exists for presentation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Canonical key, exact-matched against `METHOD /path/pattern`
    pub key: String,
    /// Required fee in smallest ledger units
    pub fee_base_units: u128,
    /// Display form of the fee (whole-token units)
    pub fee_display: Decimal,
    /// Human-readable description of the action
    pub description: String,
}

impl RouteDescriptor {
    pub fn new(
        key: &str,
        fee_base_units: u128,
        fee_display: Decimal,
        description: &str,
    ) -> Self {
        Self {
            key: key.to_string(),
            fee_base_units,
            fee_display,
            description: description.to_string(),
        }
    }
}
