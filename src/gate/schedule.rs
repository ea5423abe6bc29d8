use crate::domain::route::{
    RouteDescriptor, ROUTE_COMPETITION_ENTER, ROUTE_MODEL_DETAILS, ROUTE_MODEL_INVEST,
};
use crate::error::{FundgateError, Result};
use rust_decimal_macros::dec;

/// Immutable fee table, built once at startup and injected into the gate.
///
/// Lookup is by exact route key. Order is fixed so introspection output is
/// deterministic.
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    routes: Vec<RouteDescriptor>,
}

impl FeeSchedule {
    /// Build a schedule from explicit descriptors, rejecting colliding keys.
    pub fn new(routes: Vec<RouteDescriptor>) -> Result<Self> {
        for (i, a) in routes.iter().enumerate() {
            if routes[..i].iter().any(|b| b.key == a.key) {
                return Err(FundgateError::Validation(format!(
                    "duplicate route key in fee schedule: {}",
                    a.key
                )));
            }
        }
        Ok(Self { routes })
    }

    /// The compiled-in production schedule.
    pub fn builtin() -> Self {
        Self {
            routes: vec![
                RouteDescriptor::new(
                    ROUTE_MODEL_DETAILS,
                    100_000_000_000_000,
                    dec!(0.0001),
                    "View model details",
                ),
                RouteDescriptor::new(
                    ROUTE_MODEL_INVEST,
                    1_000_000_000_000_000,
                    dec!(0.001),
                    "Deposit into a model",
                ),
                RouteDescriptor::new(
                    ROUTE_COMPETITION_ENTER,
                    5_000_000_000_000_000,
                    dec!(0.005),
                    "Enter a competition",
                ),
            ],
        }
    }

    /// Exact-key lookup; a miss means the action is not payable at all.
    pub fn lookup(&self, key: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.key == key)
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }
}
