use config::{Config, ConfigError, Environment, File};
use ethers::types::Address;
use std::path::Path;
use serde::Deserialize;
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub agent: AgentSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the API server
    #[serde(default = "default_host")]
    pub host: String,
    /// API server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8402
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Base URL of the ledger service
    pub endpoint: String,
    /// Fee-collection address payments must be addressed to
    pub fee_collector: String,
    /// Per-request timeout for ledger calls in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Poll interval while waiting for transaction confirmation, milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Chain ID the wallet signs for
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_chain_id() -> u64 {
    8453 // Base mainnet
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    /// Run the yield agent loop
    #[serde(default)]
    pub enabled: bool,
    /// Managed model ID the agent acts on
    pub model_id: u64,
    /// Model registry contract address
    pub registry: String,
    /// Seconds between agent runs
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Cap on the confirmation wait before a run fails
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
    /// Yield deposited per run by the fixed reference strategy, base units
    #[serde(default = "default_yield_amount")]
    pub yield_amount_base_units: u64,
}

fn default_interval_secs() -> u64 {
    60
}

fn default_confirm_timeout_secs() -> u64 {
    180
}

fn default_yield_amount() -> u64 {
    100_000_000_000_000 // 0.0001 in 18-decimal units
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8402i64)?
            .set_default("ledger.request_timeout_ms", 10_000i64)?
            .set_default("ledger.poll_interval_ms", 2_000i64)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("FUNDGATE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (FUNDGATE_LEDGER__ENDPOINT, etc.)
            .add_source(
                Environment::with_prefix("FUNDGATE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if Url::parse(&self.ledger.endpoint).is_err() {
            errors.push(format!(
                "ledger.endpoint is not a valid URL: {}",
                self.ledger.endpoint
            ));
        }

        if self.ledger.fee_collector.parse::<Address>().is_err() {
            errors.push(format!(
                "ledger.fee_collector is not a valid address: {}",
                self.ledger.fee_collector
            ));
        }

        if self.agent.registry.parse::<Address>().is_err() {
            errors.push(format!(
                "agent.registry is not a valid address: {}",
                self.agent.registry
            ));
        }

        if self.ledger.request_timeout_ms == 0 {
            errors.push("ledger.request_timeout_ms must be positive".to_string());
        }

        if self.agent.interval_secs == 0 {
            errors.push("agent.interval_secs must be positive".to_string());
        }

        if self.agent.confirm_timeout_secs == 0 {
            errors.push("agent.confirm_timeout_secs must be positive".to_string());
        }

        if self.agent.enabled && self.agent.yield_amount_base_units == 0 {
            errors.push(
                "agent.yield_amount_base_units must be positive when the agent is enabled"
                    .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
