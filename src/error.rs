use thiserror::Error;

/// Main error type for the fund gateway
#[derive(Error, Debug)]
pub enum FundgateError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Address parsing error: {0}")]
    AddressParsing(String),

    // Payment gate errors
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Malformed payment proof: {0}")]
    MalformedProof(String),

    #[error("Insufficient payment: required {required}, claimed {claimed}")]
    InsufficientPayment { required: u128, claimed: u128 },

    #[error("Payment proof rejected: {0}")]
    ProofRejected(String),

    #[error("Payment proof already used: {0}")]
    ProofConsumed(String),

    // Ledger errors
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl FundgateError {
    /// True when the ledger could not be reached at all, as opposed to the
    /// ledger reaching a decision against the caller.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FundgateError::LedgerUnavailable(_))
    }
}

/// Result type alias for FundgateError
pub type Result<T> = std::result::Result<T, FundgateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_payment_formats_both_amounts() {
        let err = FundgateError::InsufficientPayment {
            required: 1_000_000_000_000_000,
            claimed: 42,
        };
        let msg = err.to_string();
        assert!(msg.contains("1000000000000000"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn unavailable_is_distinguishable_from_rejection() {
        assert!(FundgateError::LedgerUnavailable("timeout".into()).is_unavailable());
        assert!(!FundgateError::ProofRejected("bad sig".into()).is_unavailable());
    }
}
