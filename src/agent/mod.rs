//! Autonomous yield agent
//!
//! Periodically inspects a managed model's on-ledger state and, when the
//! agent wallet owns the model and the model holds assets, submits one yield
//! deposit and waits for confirmation. Each run is a fresh pass over ledger
//! state; nothing is carried between runs. A failed run ends quietly and the
//! next scheduled tick retries.

pub mod strategy;

use crate::domain::{ModelId, ModelState, RunOutcome, RunStep, SkipReason};
use crate::error::FundgateError;
use crate::ledger::{ConfirmationStatus, LedgerClient, TxHandle};
use crate::signing::Wallet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use strategy::YieldStrategy;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Runtime configuration for the yield agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Managed model the agent acts on
    pub model_id: ModelId,
    /// Seconds between runs, independent of run duration
    pub interval_secs: u64,
    /// Cap on the confirmation wait before a run fails
    pub confirm_timeout_secs: u64,
    /// Model registry identity; required before any run may act
    pub registry: Option<ethers::types::Address>,
}

/// Scheduled fiduciary agent for one managed model
#[derive(Clone)]
pub struct YieldAgent {
    ledger: Arc<dyn LedgerClient>,
    strategy: Arc<dyn YieldStrategy>,
    /// Missing credential fails each run's config check without killing the
    /// process; a restart with the credential present recovers.
    wallet: Option<Arc<Wallet>>,
    config: AgentConfig,
    running: Arc<AtomicBool>,
    in_flight: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl YieldAgent {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        strategy: Arc<dyn YieldStrategy>,
        wallet: Option<Arc<Wallet>>,
        config: AgentConfig,
    ) -> Self {
        Self {
            ledger,
            strategy,
            wallet,
            config,
            running: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the scheduling loop. Ticks fire on a fixed wall-clock interval;
    /// a tick that lands while a run is still in flight is skipped rather
    /// than queued.
    pub fn start(&self) -> JoinHandle<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("yield agent already running");
            return tokio::spawn(async {});
        }

        info!(
            model_id = self.config.model_id,
            interval_secs = self.config.interval_secs,
            strategy = self.strategy.name(),
            "starting yield agent"
        );

        let agent = self.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(agent.config.interval_secs));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                if !agent.running.load(Ordering::SeqCst) {
                    break;
                }
                match agent.try_run().await {
                    Some(outcome) => agent.log_outcome(&outcome),
                    None => warn!(
                        model_id = agent.config.model_id,
                        "previous run still in flight, skipping tick"
                    ),
                }

                tokio::select! {
                    _ = interval.tick() => {}
                    _ = agent.shutdown.notified() => break,
                }
            }

            info!(model_id = agent.config.model_id, "yield agent stopped");
        })
    }

    /// Stop scheduling new runs. An in-flight run finishes (or hits its
    /// confirmation timeout) before the loop task exits.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
        info!(model_id = self.config.model_id, "yield agent stop requested");
    }

    /// Single-flight entry point: runs unless another run is in flight.
    pub async fn try_run(&self) -> Option<RunOutcome> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return None;
        }
        let outcome = self.run_once().await;
        self.in_flight.store(false, Ordering::SeqCst);
        Some(outcome)
    }

    /// One full pass of the per-run state machine. Steps are strictly
    /// sequential: ownership is reconfirmed before assets are read, and
    /// assets before anything is submitted.
    pub async fn run_once(&self) -> RunOutcome {
        let model_id = self.config.model_id;

        // CONFIG_CHECK
        let Some(wallet) = self.wallet.as_deref() else {
            return RunOutcome::Failed {
                step: RunStep::ConfigCheck,
                reason: "wallet credential missing".to_string(),
            };
        };
        if self.config.registry.is_none() {
            return RunOutcome::Failed {
                step: RunStep::ConfigCheck,
                reason: "model registry address missing".to_string(),
            };
        }

        // OWNERSHIP_CHECK: ownership may change externally at any time.
        let owner = match self.ledger.get_owner(model_id).await {
            Ok(owner) => owner,
            Err(e) => return failed(RunStep::OwnershipCheck, e),
        };
        if owner != wallet.address() {
            return RunOutcome::Skip(SkipReason::NotOwner);
        }

        // ASSET_CHECK: an empty model is a valid transient state.
        let total_assets = match self.ledger.get_total_assets(model_id).await {
            Ok(assets) => assets,
            Err(e) => return failed(RunStep::AssetCheck, e),
        };
        if total_assets == 0 {
            return RunOutcome::Skip(SkipReason::NoAssets);
        }

        // EXECUTE
        let state = ModelState {
            id: model_id,
            owner,
            total_assets,
        };
        let amount = self.strategy.propose(&state);
        if amount == 0 {
            return RunOutcome::Skip(SkipReason::NoProposal);
        }
        let tx = match self.ledger.submit_deposit(model_id, amount).await {
            Ok(tx) => tx,
            Err(e) => return failed(RunStep::Execute, e),
        };

        // CONFIRM: bounded wait, never hangs the run open.
        self.confirm(model_id, &tx, amount, total_assets).await
    }

    async fn confirm(
        &self,
        model_id: ModelId,
        tx: &TxHandle,
        amount: u128,
        assets_before: u128,
    ) -> RunOutcome {
        let cap = Duration::from_secs(self.config.confirm_timeout_secs);
        let status = match tokio::time::timeout(cap, self.ledger.await_confirmation(tx)).await {
            Err(_) => {
                return RunOutcome::Failed {
                    step: RunStep::Confirm,
                    reason: "confirmation timeout".to_string(),
                }
            }
            Ok(Err(e)) => return failed(RunStep::Confirm, e),
            Ok(Ok(status)) => status,
        };
        if status == ConfirmationStatus::Failed {
            return RunOutcome::Failed {
                step: RunStep::Confirm,
                reason: format!("transaction {} failed on ledger", tx.as_str()),
            };
        }

        // Post-condition read is observability only; a failed re-read does
        // not undo a confirmed deposit.
        let total_assets = match self.ledger.get_total_assets(model_id).await {
            Ok(assets) => assets,
            Err(e) => {
                warn!(model_id, error = %e, "post-deposit asset read failed");
                assets_before.saturating_add(amount)
            }
        };

        RunOutcome::Done {
            deposited: amount,
            total_assets,
        }
    }

    fn log_outcome(&self, outcome: &RunOutcome) {
        let model_id = self.config.model_id;
        match outcome {
            RunOutcome::Done {
                deposited,
                total_assets,
            } => info!(
                model_id,
                deposited = %deposited,
                total_assets = %total_assets,
                "yield deposit confirmed"
            ),
            RunOutcome::Skip(reason) => {
                info!(model_id, reason = reason.as_str(), "run skipped")
            }
            RunOutcome::Failed { step, reason } => {
                error!(model_id, step = step.as_str(), reason = %reason, "run failed")
            }
        }
    }
}

fn failed(step: RunStep, err: FundgateError) -> RunOutcome {
    RunOutcome::Failed {
        step,
        reason: err.to_string(),
    }
}
