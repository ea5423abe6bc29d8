use crate::domain::ModelState;

/// Yield policy: maps observed model state to a proposed deposit.
///
/// Pure and synchronous so alternative policies can be substituted and
/// tested without the polling harness.
pub trait YieldStrategy: Send + Sync {
    /// Proposed deposit in smallest ledger units; zero means no action.
    fn propose(&self, state: &ModelState) -> u128;

    fn name(&self) -> &'static str;
}

/// Reference policy: a fixed deposit per run, from configuration.
#[derive(Debug, Clone)]
pub struct FixedYield {
    amount: u128,
}

impl FixedYield {
    pub fn new(amount: u128) -> Self {
        Self { amount }
    }
}

impl YieldStrategy for FixedYield {
    fn propose(&self, _state: &ModelState) -> u128 {
        self.amount
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Address;

    #[test]
    fn fixed_yield_ignores_state() {
        let strategy = FixedYield::new(42);
        let poor = ModelState {
            id: 1,
            owner: Address::zero(),
            total_assets: 1,
        };
        let rich = ModelState {
            id: 1,
            owner: Address::zero(),
            total_assets: u128::MAX,
        };
        assert_eq!(strategy.propose(&poor), 42);
        assert_eq!(strategy.propose(&rich), 42);
        assert_eq!(strategy.name(), "fixed");
    }
}
