//! Payment gate
//!
//! Decides, per inbound protected-action request, whether the caller's
//! payment proof satisfies the route's fee tier. Decisions fail closed: an
//! unknown route, a malformed proof, an unreachable ledger, and a replayed
//! token all deny. Internal error distinctions exist for logs only; callers
//! see a boolean plus a reason.

pub mod replay;
pub mod schedule;

use crate::domain::proof::PaymentProof;
use crate::error::{FundgateError, Result};
use crate::ledger::LedgerClient;
use replay::ReplayGuard;
use schedule::FeeSchedule;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Consumed proofs are retained well past any plausible confirmation window.
const REPLAY_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Outcome of a gate evaluation. Never partially authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResult {
    pub authorized: bool,
    pub reason: Option<String>,
}

impl AuthorizationResult {
    pub fn allow() -> Self {
        Self {
            authorized: true,
            reason: None,
        }
    }

    pub fn deny(reason: &str) -> Self {
        Self {
            authorized: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Payment-gated access control for protected actions
pub struct PaymentGate {
    schedule: FeeSchedule,
    ledger: Arc<dyn LedgerClient>,
    replay: ReplayGuard,
}

impl PaymentGate {
    pub fn new(schedule: FeeSchedule, ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            schedule,
            ledger,
            replay: ReplayGuard::new(REPLAY_RETENTION),
        }
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    /// Gate an action whose proof fields arrive in a loosely-typed body.
    /// Coercion failures deny with the same reason regardless of which
    /// field was missing or malformed.
    pub async fn authorize_value(&self, body: &Value, route_key: &str) -> AuthorizationResult {
        match PaymentProof::from_body(body, route_key) {
            Ok(proof) => self.authorize(&proof).await,
            Err(e) => {
                warn!(route = route_key, error = %e, "payment fields rejected at boundary");
                AuthorizationResult::deny("missing payment fields")
            }
        }
    }

    /// Gate an action with an already-typed proof. Consumes the proof token
    /// on success; a given route+token pair authorizes at most once.
    pub async fn authorize(&self, proof: &PaymentProof) -> AuthorizationResult {
        match self.evaluate(proof, true).await {
            Ok(()) => {
                debug!(
                    route = %proof.route,
                    token = %proof.token_fingerprint(),
                    "payment authorized"
                );
                AuthorizationResult::allow()
            }
            Err(e) => self.denied(proof, e),
        }
    }

    /// Pre-check a proof without consuming it. Identical fee-schedule and
    /// proof-validation logic as `authorize`, so the two can never diverge.
    pub async fn verify(&self, proof: &PaymentProof) -> AuthorizationResult {
        match self.evaluate(proof, false).await {
            Ok(()) => AuthorizationResult::allow(),
            Err(e) => self.denied(proof, e),
        }
    }

    async fn evaluate(&self, proof: &PaymentProof, consume: bool) -> Result<()> {
        let descriptor = self
            .schedule
            .lookup(&proof.route)
            .ok_or_else(|| FundgateError::UnknownRoute(proof.route.clone()))?;

        // Fee check gates proof verification; an underpaid proof is never
        // sent to the ledger.
        if proof.amount < descriptor.fee_base_units {
            return Err(FundgateError::InsufficientPayment {
                required: descriptor.fee_base_units,
                claimed: proof.amount,
            });
        }

        if self.replay.is_consumed(&proof.route, &proof.token) {
            return Err(FundgateError::ProofConsumed(proof.token_fingerprint()));
        }

        let valid = self
            .ledger
            .verify_proof(proof.payer, proof.amount, &proof.token, &proof.route)
            .await?;
        if !valid {
            return Err(FundgateError::ProofRejected(proof.token_fingerprint()));
        }

        if consume && !self.replay.try_consume(&proof.route, &proof.token) {
            // Lost a redemption race after verification.
            return Err(FundgateError::ProofConsumed(proof.token_fingerprint()));
        }

        Ok(())
    }

    fn denied(&self, proof: &PaymentProof, err: FundgateError) -> AuthorizationResult {
        let reason = denial_reason(&err);
        warn!(
            route = %proof.route,
            token = %proof.token_fingerprint(),
            error = %err,
            reason,
            "payment denied"
        );
        AuthorizationResult::deny(reason)
    }
}

/// Collapse the internal error taxonomy to the caller-visible reason. The
/// finer distinctions stay in the logs.
fn denial_reason(err: &FundgateError) -> &'static str {
    match err {
        FundgateError::UnknownRoute(_) => "unknown route",
        FundgateError::MalformedProof(_) => "missing payment fields",
        FundgateError::InsufficientPayment { .. } => "insufficient payment",
        FundgateError::ProofRejected(_) => "invalid payment proof",
        FundgateError::ProofConsumed(_) => "payment proof already used",
        _ => "verification unavailable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::route::ROUTE_MODEL_INVEST;
    use crate::ledger::MockLedgerClient;
    use ethers::types::Address;

    fn proof(amount: u128, token: &str, route: &str) -> PaymentProof {
        PaymentProof {
            payer: Address::repeat_byte(0xaa),
            amount,
            token: token.to_string(),
            route: route.to_string(),
        }
    }

    fn gate_with(ledger: MockLedgerClient) -> PaymentGate {
        PaymentGate::new(FeeSchedule::builtin(), Arc::new(ledger))
    }

    #[tokio::test]
    async fn unknown_route_fails_closed() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_verify_proof().never();
        let gate = gate_with(ledger);

        let result = gate
            .authorize(&proof(u128::MAX, "tok1", "DELETE /models/{id}"))
            .await;
        assert!(!result.authorized);
        assert_eq!(result.reason.as_deref(), Some("unknown route"));
    }

    #[tokio::test]
    async fn underpayment_denies_without_asking_the_ledger() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_verify_proof().never();
        let gate = gate_with(ledger);

        let result = gate
            .authorize(&proof(999_999_999_999_999, "tok1", ROUTE_MODEL_INVEST))
            .await;
        assert!(!result.authorized);
        assert_eq!(result.reason.as_deref(), Some("insufficient payment"));
    }

    #[tokio::test]
    async fn overpayment_is_valid() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_verify_proof()
            .times(1)
            .returning(|_, _, _, _| Ok(true));
        let gate = gate_with(ledger);

        let result = gate
            .authorize(&proof(2_000_000_000_000_000, "tok1", ROUTE_MODEL_INVEST))
            .await;
        assert!(result.authorized);
    }

    #[tokio::test]
    async fn replayed_token_is_denied_second_time() {
        let mut ledger = MockLedgerClient::new();
        // Only the first attempt reaches the ledger.
        ledger
            .expect_verify_proof()
            .times(1)
            .returning(|_, _, _, _| Ok(true));
        let gate = gate_with(ledger);
        let p = proof(1_000_000_000_000_000, "tok1", ROUTE_MODEL_INVEST);

        assert!(gate.authorize(&p).await.authorized);
        let second = gate.authorize(&p).await;
        assert!(!second.authorized);
        assert_eq!(second.reason.as_deref(), Some("payment proof already used"));
    }

    #[tokio::test]
    async fn ledger_rejection_and_outage_have_distinct_reasons() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_verify_proof()
            .times(1)
            .returning(|_, _, _, _| Ok(false));
        let gate = gate_with(ledger);
        let rejected = gate
            .authorize(&proof(1_000_000_000_000_000, "tok1", ROUTE_MODEL_INVEST))
            .await;
        assert_eq!(rejected.reason.as_deref(), Some("invalid payment proof"));

        let mut ledger = MockLedgerClient::new();
        ledger.expect_verify_proof().times(1).returning(|_, _, _, _| {
            Err(FundgateError::LedgerUnavailable("timeout".into()))
        });
        let gate = gate_with(ledger);
        let unavailable = gate
            .authorize(&proof(1_000_000_000_000_000, "tok2", ROUTE_MODEL_INVEST))
            .await;
        assert!(!unavailable.authorized, "outage must never fail open");
        assert_eq!(
            unavailable.reason.as_deref(),
            Some("verification unavailable")
        );
    }

    #[tokio::test]
    async fn verify_does_not_consume() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_verify_proof()
            .times(2)
            .returning(|_, _, _, _| Ok(true));
        let gate = gate_with(ledger);
        let p = proof(1_000_000_000_000_000, "tok1", ROUTE_MODEL_INVEST);

        assert!(gate.verify(&p).await.authorized);
        // The pre-check left the token unconsumed for the real action.
        assert!(gate.authorize(&p).await.authorized);
    }

    #[tokio::test]
    async fn malformed_body_denies_with_missing_fields_reason() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_verify_proof().never();
        let gate = gate_with(ledger);

        let body = serde_json::json!({ "paymentAmount": 1_000_000_000_000_000u64 });
        let result = gate.authorize_value(&body, ROUTE_MODEL_INVEST).await;
        assert!(!result.authorized);
        assert_eq!(result.reason.as_deref(), Some("missing payment fields"));
    }
}
