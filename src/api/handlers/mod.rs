mod competitions;
mod health;
mod models;
mod payment;

pub use competitions::enter_competition;
pub use health::get_health;
pub use models::{get_model_details, invest_in_model};
pub use payment::{get_payment_amounts, verify_payment};
