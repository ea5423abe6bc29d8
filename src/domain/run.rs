use std::fmt;

/// Steps of one yield-agent run, in the order they execute.
///
/// Ownership must be confirmed before assets are read, and assets before any
/// transaction is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStep {
    ConfigCheck,
    OwnershipCheck,
    AssetCheck,
    Execute,
    Confirm,
}

impl RunStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStep::ConfigCheck => "CONFIG_CHECK",
            RunStep::OwnershipCheck => "OWNERSHIP_CHECK",
            RunStep::AssetCheck => "ASSET_CHECK",
            RunStep::Execute => "EXECUTE",
            RunStep::Confirm => "CONFIRM",
        }
    }
}

impl fmt::Display for RunStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expected, non-error reasons a run ends without acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The agent wallet is not the model's current owner
    NotOwner,
    /// The model holds no assets yet
    NoAssets,
    /// The strategy proposed no deposit
    NoProposal,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotOwner => "not owner",
            SkipReason::NoAssets => "no assets",
            SkipReason::NoProposal => "no proposal",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal outcome of one agent run. Nothing survives the run in-process;
/// all accounting lives on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Deposit submitted and confirmed
    Done {
        deposited: u128,
        /// Total assets re-read after confirmation
        total_assets: u128,
    },
    /// Conditions not met; no transaction attempted
    Skip(SkipReason),
    /// A step failed; the next scheduled tick is the retry
    Failed { step: RunStep, reason: String },
}

impl RunOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Done { .. } => "DONE",
            RunOutcome::Skip(_) => "SKIP",
            RunOutcome::Failed { .. } => "FAILED",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_match_wire_form() {
        assert_eq!(RunStep::OwnershipCheck.as_str(), "OWNERSHIP_CHECK");
        assert_eq!(RunStep::Confirm.to_string(), "CONFIRM");
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(RunOutcome::Skip(SkipReason::NotOwner).label(), "SKIP");
        assert!(RunOutcome::Failed {
            step: RunStep::Execute,
            reason: "boom".into()
        }
        .is_failure());
        assert!(!RunOutcome::Skip(SkipReason::NoAssets).is_failure());
    }
}
