use crate::error::{FundgateError, Result};
use ethers::signers::{LocalWallet, Signer as EthersSigner};
use ethers::types::Address;
use tracing::info;
use zeroize::Zeroize;

/// Agent wallet identity
///
/// # Security
/// The private key hex is zeroized from memory immediately after the signer
/// is constructed; only the derived signer and address remain.
#[derive(Clone)]
pub struct Wallet {
    inner: LocalWallet,
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a private key hex string
    pub fn from_private_key(private_key: &str, chain_id: u64) -> Result<Self> {
        let key_hex = private_key.trim_start_matches("0x");

        let mut secure_key = key_hex.to_string();

        let wallet = secure_key
            .parse::<LocalWallet>()
            .map_err(|e| FundgateError::Wallet(format!("Invalid private key: {}", e)))?
            .with_chain_id(chain_id);

        secure_key.zeroize();

        info!(
            "Wallet initialized: {:?} (private key zeroized from memory)",
            wallet.address()
        );

        Ok(Self {
            inner: wallet,
            chain_id,
        })
    }

    /// Create a wallet from the `FUNDGATE_WALLET_KEY` environment variable
    /// (falls back to `PRIVATE_KEY`).
    pub fn from_env(chain_id: u64) -> Result<Self> {
        let mut private_key = std::env::var("FUNDGATE_WALLET_KEY")
            .or_else(|_| std::env::var("PRIVATE_KEY"))
            .map_err(|_| {
                FundgateError::Wallet(
                    "FUNDGATE_WALLET_KEY or PRIVATE_KEY environment variable not set".to_string(),
                )
            })?;

        let result = Self::from_private_key(&private_key, chain_id);

        private_key.zeroize();

        result
    }

    /// Get the wallet address
    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// Get the chain ID
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known throwaway key (hardhat account #0); never funded.
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn derives_expected_address() {
        let wallet = Wallet::from_private_key(TEST_KEY, 8453).unwrap();
        assert_eq!(
            format!("{:?}", wallet.address()),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(wallet.chain_id(), 8453);
    }

    #[test]
    fn rejects_garbage_key() {
        assert!(Wallet::from_private_key("0xnotakey", 8453).is_err());
    }
}
