use ethers::types::Address;

/// On-ledger model identifier
pub type ModelId = u64;

/// Snapshot of a managed model as last observed on the ledger.
///
/// Never mutated in memory; the agent only re-reads after submitting
/// transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelState {
    pub id: ModelId,
    pub owner: Address,
    /// Total managed assets in smallest ledger units
    pub total_assets: u128,
}
