use clap::{Parser, Subcommand};
use ethers::types::Address;
use fundgate::agent::strategy::FixedYield;
use fundgate::agent::{AgentConfig, YieldAgent};
use fundgate::api::{create_router, AppState};
use fundgate::config::AppConfig;
use fundgate::domain::PaymentProof;
use fundgate::error::{FundgateError, Result};
use fundgate::gate::{schedule::FeeSchedule, PaymentGate};
use fundgate::ledger::{LedgerClient, LedgerRpcClient};
use fundgate::signing::Wallet;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fundgate", about = "Payment gate and yield agent service")]
struct Cli {
    /// Configuration directory
    #[arg(long, default_value = "config")]
    config_dir: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server and, when enabled, the yield agent
    Serve,
    /// Run only the yield agent loop
    Agent,
    /// Print the fee schedule
    Amounts,
    /// Pre-check a payment proof against the ledger
    Verify {
        /// Payer address
        #[arg(long)]
        address: String,
        /// Claimed amount in base units
        #[arg(long)]
        amount: String,
        /// Proof token
        #[arg(long)]
        proof: String,
        /// Route key the proof was issued for
        #[arg(long)]
        route: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = load_config(&cli.config_dir)?;
            init_logging(&config);
            run_serve(config).await
        }
        Commands::Agent => {
            let config = load_config(&cli.config_dir)?;
            init_logging(&config);
            run_agent(config).await
        }
        Commands::Amounts => {
            init_logging_simple();
            print_amounts()
        }
        Commands::Verify {
            address,
            amount,
            proof,
            route,
        } => {
            init_logging_simple();
            let config = load_config(&cli.config_dir)?;
            run_verify(config, &address, &amount, &proof, &route).await
        }
    }
}

fn load_config(config_dir: &str) -> Result<AppConfig> {
    let config = AppConfig::load_from(config_dir)?;
    if let Err(errors) = config.validate() {
        return Err(FundgateError::Validation(errors.join("; ")));
    }
    Ok(config)
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,fundgate={}", config.logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_logging_simple() {
    // Minimal logging for one-shot CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

fn build_ledger(config: &AppConfig) -> Result<Arc<LedgerRpcClient>> {
    let fee_collector = parse_address(&config.ledger.fee_collector, "ledger.fee_collector")?;
    let registry = parse_address(&config.agent.registry, "agent.registry")?;

    Ok(Arc::new(LedgerRpcClient::new(
        &config.ledger.endpoint,
        fee_collector,
        registry,
        Duration::from_millis(config.ledger.request_timeout_ms),
        Duration::from_millis(config.ledger.poll_interval_ms),
    )?))
}

fn parse_address(raw: &str, field: &str) -> Result<Address> {
    raw.parse::<Address>()
        .map_err(|_| FundgateError::AddressParsing(format!("{field}: {raw}")))
}

fn build_agent(config: &AppConfig, ledger: Arc<dyn LedgerClient>) -> YieldAgent {
    // A missing credential is loud but non-fatal: every run fails its config
    // check until the process is restarted with the key present.
    let wallet = match Wallet::from_env(config.ledger.chain_id) {
        Ok(wallet) => Some(Arc::new(wallet)),
        Err(e) => {
            error!(error = %e, "yield agent has no wallet credential; runs will fail until restart");
            None
        }
    };

    let registry = config.agent.registry.parse::<Address>().ok();

    YieldAgent::new(
        ledger,
        Arc::new(FixedYield::new(u128::from(config.agent.yield_amount_base_units))),
        wallet,
        AgentConfig {
            model_id: config.agent.model_id,
            interval_secs: config.agent.interval_secs,
            confirm_timeout_secs: config.agent.confirm_timeout_secs,
            registry,
        },
    )
}

async fn run_serve(config: AppConfig) -> Result<()> {
    let ledger: Arc<dyn LedgerClient> = build_ledger(&config)?;
    let gate = Arc::new(PaymentGate::new(FeeSchedule::builtin(), ledger.clone()));

    let agent = if config.agent.enabled {
        Some(Arc::new(build_agent(&config, ledger.clone())))
    } else {
        info!("yield agent disabled by configuration");
        None
    };
    let agent_handle = agent.as_ref().map(|a| a.start());

    let state = AppState::new(gate, ledger, agent.clone());
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Server drained; stop scheduling agent runs and let any in-flight run
    // reach a terminal state.
    if let Some(agent) = &agent {
        agent.stop();
    }
    if let Some(handle) = agent_handle {
        if let Err(e) = handle.await {
            warn!(error = %e, "agent task ended abnormally");
        }
    }

    info!("shutdown complete");
    Ok(())
}

async fn run_agent(config: AppConfig) -> Result<()> {
    let ledger: Arc<dyn LedgerClient> = build_ledger(&config)?;
    let agent = build_agent(&config, ledger);
    let handle = agent.start();

    shutdown_signal().await;
    agent.stop();
    if let Err(e) = handle.await {
        warn!(error = %e, "agent task ended abnormally");
    }

    info!("shutdown complete");
    Ok(())
}

fn print_amounts() -> Result<()> {
    let schedule = FeeSchedule::builtin();
    let rows: Vec<_> = schedule
        .routes()
        .iter()
        .map(|r| {
            json!({
                "route": r.key,
                "description": r.description,
                "amount": r.fee_display.to_string(),
                "amountBaseUnits": r.fee_base_units.to_string(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

async fn run_verify(
    config: AppConfig,
    address: &str,
    amount: &str,
    proof_token: &str,
    route: &str,
) -> Result<()> {
    let ledger: Arc<dyn LedgerClient> = build_ledger(&config)?;
    let gate = PaymentGate::new(FeeSchedule::builtin(), ledger);

    let proof = PaymentProof::from_fields(
        address,
        &serde_json::Value::String(amount.to_string()),
        proof_token,
        route,
    )?;
    let decision = gate.verify(&proof).await;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "verified": decision.authorized,
            "reason": decision.reason,
        }))?
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c"),
        _ = terminate => info!("received SIGTERM"),
    }
}
