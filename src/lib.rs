pub mod agent;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod signing;

pub use agent::{strategy::FixedYield, strategy::YieldStrategy, AgentConfig, YieldAgent};
pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use domain::{
    ModelId, ModelState, PaymentProof, RouteDescriptor, RunOutcome, RunStep, SkipReason,
    ROUTE_COMPETITION_ENTER, ROUTE_MODEL_DETAILS, ROUTE_MODEL_INVEST,
};
pub use error::{FundgateError, Result};
pub use gate::{schedule::FeeSchedule, AuthorizationResult, PaymentGate};
pub use ledger::{ConfirmationStatus, LedgerClient, LedgerRpcClient, TxHandle};
pub use signing::Wallet;
