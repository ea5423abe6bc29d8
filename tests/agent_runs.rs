//! End-to-end yield-agent run tests against a scripted ledger.

use async_trait::async_trait;
use ethers::types::Address;
use fundgate::agent::{AgentConfig, YieldAgent};
use fundgate::error::{FundgateError, Result};
use fundgate::ledger::{ConfirmationStatus, LedgerClient, TxHandle};
use fundgate::{FixedYield, RunOutcome, RunStep, SkipReason, Wallet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

// Well-known throwaway key (hardhat account #0); never funded.
const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const MODEL_ID: u64 = 7;
const YIELD_AMOUNT: u128 = 250;

fn test_wallet() -> Arc<Wallet> {
    Arc::new(Wallet::from_private_key(TEST_KEY, 8453).expect("test key parses"))
}

/// Scripted ledger with call counters. `owner: None` simulates an
/// unreachable registry; `hold` parks confirmation until released.
struct ScriptedLedger {
    owner: Option<Address>,
    assets_before: u128,
    assets_after: u128,
    confirm_status: ConfirmationStatus,
    hold: Option<Arc<Notify>>,
    asset_reads: AtomicUsize,
    submits: AtomicUsize,
    confirms: AtomicUsize,
}

impl ScriptedLedger {
    fn owned_by(owner: Address) -> Self {
        Self {
            owner: Some(owner),
            assets_before: 10_000,
            assets_after: 10_000 + YIELD_AMOUNT,
            confirm_status: ConfirmationStatus::Confirmed,
            hold: None,
            asset_reads: AtomicUsize::new(0),
            submits: AtomicUsize::new(0),
            confirms: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn get_owner(&self, _model_id: u64) -> Result<Address> {
        self.owner
            .ok_or_else(|| FundgateError::LedgerUnavailable("registry timeout".into()))
    }

    async fn get_total_assets(&self, _model_id: u64) -> Result<u128> {
        let reads = self.asset_reads.fetch_add(1, Ordering::SeqCst);
        if reads == 0 {
            Ok(self.assets_before)
        } else {
            Ok(self.assets_after)
        }
    }

    async fn submit_deposit(&self, _model_id: u64, amount: u128) -> Result<TxHandle> {
        assert!(amount > 0, "agent must never submit a zero deposit");
        self.submits.fetch_add(1, Ordering::SeqCst);
        Ok(TxHandle("0xscripted".to_string()))
    }

    async fn await_confirmation(&self, _tx: &TxHandle) -> Result<ConfirmationStatus> {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        Ok(self.confirm_status)
    }

    async fn verify_proof(
        &self,
        _payer: Address,
        _amount: u128,
        _proof: &str,
        _route: &str,
    ) -> Result<bool> {
        Ok(true)
    }
}

fn agent_with(ledger: Arc<ScriptedLedger>, wallet: Option<Arc<Wallet>>) -> YieldAgent {
    YieldAgent::new(
        ledger,
        Arc::new(FixedYield::new(YIELD_AMOUNT)),
        wallet,
        AgentConfig {
            model_id: MODEL_ID,
            interval_secs: 60,
            confirm_timeout_secs: 30,
            registry: Some(Address::repeat_byte(0x42)),
        },
    )
}

#[tokio::test]
async fn owner_mismatch_skips_and_submits_nothing() {
    let ledger = Arc::new(ScriptedLedger::owned_by(Address::repeat_byte(0xcc)));
    let agent = agent_with(ledger.clone(), Some(test_wallet()));

    let outcome = agent.run_once().await;

    assert_eq!(outcome, RunOutcome::Skip(SkipReason::NotOwner));
    assert_eq!(ledger.submits.load(Ordering::SeqCst), 0);
    assert_eq!(ledger.confirms.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_assets_skips_and_submits_nothing() {
    let wallet = test_wallet();
    let mut ledger = ScriptedLedger::owned_by(wallet.address());
    ledger.assets_before = 0;
    let ledger = Arc::new(ledger);
    let agent = agent_with(ledger.clone(), Some(wallet));

    let outcome = agent.run_once().await;

    assert_eq!(outcome, RunOutcome::Skip(SkipReason::NoAssets));
    assert_eq!(ledger.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_run_submits_and_confirms_exactly_once() {
    let wallet = test_wallet();
    let ledger = Arc::new(ScriptedLedger::owned_by(wallet.address()));
    let agent = agent_with(ledger.clone(), Some(wallet));

    let outcome = agent.run_once().await;

    let RunOutcome::Done {
        deposited,
        total_assets,
    } = outcome
    else {
        panic!("expected Done, got {outcome:?}");
    };
    assert_eq!(deposited, YIELD_AMOUNT);
    assert!(
        total_assets >= 10_000,
        "post-run total must not be below the pre-run read"
    );
    assert_eq!(ledger.submits.load(Ordering::SeqCst), 1);
    assert_eq!(ledger.confirms.load(Ordering::SeqCst), 1);
    assert_eq!(
        ledger.asset_reads.load(Ordering::SeqCst),
        2,
        "one pre-check read and one post-confirmation read"
    );
}

#[tokio::test]
async fn unreachable_registry_fails_the_run_and_stays_schedulable() {
    let wallet = test_wallet();
    let owner = wallet.address();
    let mut ledger = ScriptedLedger::owned_by(owner);
    ledger.owner = None;
    let ledger = Arc::new(ledger);
    let agent = agent_with(ledger.clone(), Some(wallet));

    let outcome = agent.run_once().await;
    assert!(matches!(
        outcome,
        RunOutcome::Failed {
            step: RunStep::OwnershipCheck,
            ..
        }
    ));
    assert_eq!(ledger.submits.load(Ordering::SeqCst), 0);

    // The loop retries on the next tick; nothing in the agent is poisoned.
    let retry = agent.try_run().await;
    assert!(retry.is_some(), "agent must remain schedulable after a failure");
}

#[tokio::test]
async fn ledger_reported_failure_ends_the_run_as_failed() {
    let wallet = test_wallet();
    let mut ledger = ScriptedLedger::owned_by(wallet.address());
    ledger.confirm_status = ConfirmationStatus::Failed;
    let ledger = Arc::new(ledger);
    let agent = agent_with(ledger.clone(), Some(wallet));

    let outcome = agent.run_once().await;
    assert!(matches!(
        outcome,
        RunOutcome::Failed {
            step: RunStep::Confirm,
            ..
        }
    ));
    assert_eq!(ledger.submits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn stuck_confirmation_hits_the_cap() {
    let wallet = test_wallet();
    let mut ledger = ScriptedLedger::owned_by(wallet.address());
    // A hold that is never released: confirmation can only time out.
    ledger.hold = Some(Arc::new(Notify::new()));
    let ledger = Arc::new(ledger);
    let agent = agent_with(ledger.clone(), Some(wallet));

    let outcome = agent.run_once().await;
    assert_eq!(
        outcome,
        RunOutcome::Failed {
            step: RunStep::Confirm,
            reason: "confirmation timeout".to_string(),
        }
    );
}

#[tokio::test]
async fn missing_wallet_fails_config_check_each_run() {
    let ledger = Arc::new(ScriptedLedger::owned_by(Address::repeat_byte(0xcc)));
    let agent = agent_with(ledger.clone(), None);

    for _ in 0..2 {
        let outcome = agent.run_once().await;
        assert!(matches!(
            outcome,
            RunOutcome::Failed {
                step: RunStep::ConfigCheck,
                ..
            }
        ));
    }
    assert_eq!(ledger.submits.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn loop_runs_on_schedule_and_stops_cleanly() {
    let wallet = test_wallet();
    let ledger = Arc::new(ScriptedLedger::owned_by(wallet.address()));
    let agent = agent_with(ledger.clone(), Some(wallet));

    let handle = agent.start();
    assert!(agent.is_running());

    // One immediate run plus one at the 60s tick.
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(ledger.submits.load(Ordering::SeqCst), 2);

    agent.stop();
    handle.await.expect("loop task joins after stop");
    assert!(!agent.is_running());

    // A stopped loop schedules nothing further.
    let submits_at_stop = ledger.submits.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(180)).await;
    assert_eq!(ledger.submits.load(Ordering::SeqCst), submits_at_stop);
}

#[tokio::test]
async fn a_second_entry_while_in_flight_is_refused() {
    let wallet = test_wallet();
    let mut ledger = ScriptedLedger::owned_by(wallet.address());
    let hold = Arc::new(Notify::new());
    ledger.hold = Some(hold.clone());
    let ledger = Arc::new(ledger);
    let agent = Arc::new(agent_with(ledger.clone(), Some(wallet)));

    let first = {
        let agent = agent.clone();
        tokio::spawn(async move { agent.try_run().await })
    };

    // Wait until the first run is parked inside the confirmation wait.
    while ledger.confirms.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let second = agent.try_run().await;
    assert!(second.is_none(), "overlapping runs must be refused");

    hold.notify_one();
    let first = first.await.expect("first run task completes");
    assert!(matches!(first, Some(RunOutcome::Done { .. })));
    assert_eq!(ledger.submits.load(Ordering::SeqCst), 1);

    // With the first run terminal, the guard is released again.
    assert!(agent.try_run().await.is_some());
}
