pub mod rpc;
pub mod traits;

pub use rpc::LedgerRpcClient;
pub use traits::{ConfirmationStatus, LedgerClient, TxHandle};

#[cfg(test)]
pub use traits::MockLedgerClient;
