use crate::agent::YieldAgent;
use crate::gate::PaymentGate;
use crate::ledger::LedgerClient;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Payment gate guarding the protected actions
    pub gate: Arc<PaymentGate>,

    /// Ledger reads for action payloads (model details)
    pub ledger: Arc<dyn LedgerClient>,

    /// Yield agent, when this process runs one
    pub agent: Option<Arc<YieldAgent>>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        gate: Arc<PaymentGate>,
        ledger: Arc<dyn LedgerClient>,
        agent: Option<Arc<YieldAgent>>,
    ) -> Self {
        Self {
            gate,
            ledger,
            agent,
            start_time: Utc::now(),
        }
    }

    /// Get system uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
