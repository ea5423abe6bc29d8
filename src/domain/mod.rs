pub mod model;
pub mod proof;
pub mod route;
pub mod run;

pub use model::{ModelId, ModelState};
pub use proof::PaymentProof;
pub use route::{
    RouteDescriptor, ROUTE_COMPETITION_ENTER, ROUTE_MODEL_DETAILS, ROUTE_MODEL_INVEST,
};
pub use run::{RunOutcome, RunStep, SkipReason};
