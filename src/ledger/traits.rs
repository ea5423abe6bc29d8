use crate::domain::ModelId;
use crate::error::Result;
use async_trait::async_trait;
use ethers::types::Address;

/// Opaque handle to a submitted ledger transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxHandle(pub String);

impl TxHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Final inclusion signal for a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Confirmed,
    Failed,
}

/// Narrow read/write interface to the external ledger.
///
/// Every call is fallible; implementations must surface
/// `FundgateError::LedgerUnavailable` for unreachable/timeout conditions so
/// callers never conflate "could not ask" with "asked and was refused".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Current owner of the managed model. A model the registry does not
    /// know yet reads as the zero address.
    async fn get_owner(&self, model_id: ModelId) -> Result<Address>;

    /// Total managed assets of the model in smallest ledger units
    async fn get_total_assets(&self, model_id: ModelId) -> Result<u128>;

    /// Submit a value-bearing yield deposit against the model
    async fn submit_deposit(&self, model_id: ModelId, amount: u128) -> Result<TxHandle>;

    /// Wait for the ledger's inclusion/finality signal. Callers are expected
    /// to bound this with their own timeout.
    async fn await_confirmation(&self, tx: &TxHandle) -> Result<ConfirmationStatus>;

    /// Check that `proof` corresponds to a confirmed payment of at least
    /// `amount` from `payer` to the protocol fee collector, issued for
    /// `route`. `Ok(false)` means the ledger examined and rejected the proof.
    async fn verify_proof(
        &self,
        payer: Address,
        amount: u128,
        proof: &str,
        route: &str,
    ) -> Result<bool>;
}
