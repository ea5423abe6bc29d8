//! JSON-over-HTTP ledger client
//!
//! The ledger is an external service reached through a small REST surface.
//! Transport failures (timeout, refused connection) map to
//! `LedgerUnavailable`; a reachable ledger that declines a request maps to
//! the matching rejection variant.

use crate::domain::ModelId;
use crate::error::{FundgateError, Result};
use crate::ledger::traits::{ConfirmationStatus, LedgerClient, TxHandle};
use async_trait::async_trait;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Ledger service client over HTTP
pub struct LedgerRpcClient {
    http: reqwest::Client,
    base_url: String,
    /// Fee-collection address payment proofs must name
    fee_collector: Address,
    /// Model registry the owner/asset reads are scoped to
    registry: Address,
    poll_interval: Duration,
}

impl LedgerRpcClient {
    pub fn new(
        endpoint: &str,
        fee_collector: Address,
        registry: Address,
        request_timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: endpoint.trim_end_matches('/').to_string(),
            fee_collector,
            registry,
            poll_interval,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn addr_hex(addr: &Address) -> String {
    format!("{addr:?}")
}

/// Transport-level failures are "could not ask", everything else surfaces as
/// a plain HTTP error.
fn map_transport(e: reqwest::Error) -> FundgateError {
    if e.is_timeout() || e.is_connect() {
        FundgateError::LedgerUnavailable(e.to_string())
    } else {
        FundgateError::Http(e)
    }
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    owner: Address,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetsResponse {
    total_assets: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DepositRequest {
    model_id: ModelId,
    amount: String,
    registry: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DepositResponse {
    tx_hash: String,
}

#[derive(Debug, Deserialize)]
struct TxStatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
struct VerifyRequest {
    payer: String,
    amount: String,
    proof: String,
    route: String,
    collector: String,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    valid: bool,
}

#[async_trait]
impl LedgerClient for LedgerRpcClient {
    async fn get_owner(&self, model_id: ModelId) -> Result<Address> {
        let url = self.url(&format!(
            "/registries/{}/models/{}/owner",
            addr_hex(&self.registry),
            model_id
        ));
        let resp = self.http.get(&url).send().await.map_err(map_transport)?;

        // An unminted model has no owner row yet; the zero address keeps the
        // caller on its normal not-owner path.
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Address::zero());
        }
        if !resp.status().is_success() {
            return Err(FundgateError::LedgerUnavailable(format!(
                "owner read returned {}",
                resp.status()
            )));
        }

        let body: OwnerResponse = resp.json().await.map_err(map_transport)?;
        debug!(model_id, owner = ?body.owner, "owner read");
        Ok(body.owner)
    }

    async fn get_total_assets(&self, model_id: ModelId) -> Result<u128> {
        let url = self.url(&format!(
            "/registries/{}/models/{}/assets",
            addr_hex(&self.registry),
            model_id
        ));
        let resp = self.http.get(&url).send().await.map_err(map_transport)?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(0);
        }
        if !resp.status().is_success() {
            return Err(FundgateError::LedgerUnavailable(format!(
                "asset read returned {}",
                resp.status()
            )));
        }

        let body: AssetsResponse = resp.json().await.map_err(map_transport)?;
        body.total_assets.parse::<u128>().map_err(|_| {
            FundgateError::Internal(format!(
                "ledger returned non-integer asset total: {}",
                body.total_assets
            ))
        })
    }

    async fn submit_deposit(&self, model_id: ModelId, amount: u128) -> Result<TxHandle> {
        let payload = DepositRequest {
            model_id,
            amount: amount.to_string(),
            registry: addr_hex(&self.registry),
        };
        let resp = self
            .http
            .post(self.url("/transactions/deposit"))
            .json(&payload)
            .send()
            .await
            .map_err(map_transport)?;

        let status = resp.status();
        if status.is_server_error() {
            return Err(FundgateError::LedgerUnavailable(format!(
                "deposit submission returned {status}"
            )));
        }
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(FundgateError::Transaction(format!(
                "deposit rejected ({status}): {detail}"
            )));
        }

        let body: DepositResponse = resp.json().await.map_err(map_transport)?;
        debug!(model_id, tx = %body.tx_hash, "deposit submitted");
        Ok(TxHandle(body.tx_hash))
    }

    async fn await_confirmation(&self, tx: &TxHandle) -> Result<ConfirmationStatus> {
        // Polls until the ledger reports a terminal status. The caller owns
        // the overall deadline.
        loop {
            let url = self.url(&format!("/transactions/{}", tx.as_str()));
            let resp = self.http.get(&url).send().await.map_err(map_transport)?;

            if !resp.status().is_success() {
                return Err(FundgateError::LedgerUnavailable(format!(
                    "confirmation poll returned {}",
                    resp.status()
                )));
            }

            let body: TxStatusResponse = resp.json().await.map_err(map_transport)?;
            match body.status.as_str() {
                "confirmed" => return Ok(ConfirmationStatus::Confirmed),
                "failed" | "reverted" => return Ok(ConfirmationStatus::Failed),
                "pending" | "submitted" => {}
                other => {
                    warn!(tx = %tx.as_str(), status = other, "unrecognized transaction status");
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn verify_proof(
        &self,
        payer: Address,
        amount: u128,
        proof: &str,
        route: &str,
    ) -> Result<bool> {
        let payload = VerifyRequest {
            payer: addr_hex(&payer),
            amount: amount.to_string(),
            proof: proof.to_string(),
            route: route.to_string(),
            collector: addr_hex(&self.fee_collector),
        };
        let resp = self
            .http
            .post(self.url("/payments/verify"))
            .json(&payload)
            .send()
            .await
            .map_err(map_transport)?;

        let status = resp.status();
        if status.is_server_error() {
            return Err(FundgateError::LedgerUnavailable(format!(
                "proof verification returned {status}"
            )));
        }
        // The ledger examined the proof and refused it.
        if status.is_client_error() {
            return Ok(false);
        }

        let body: VerifyResponse = resp.json().await.map_err(map_transport)?;
        Ok(body.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_hex_is_full_lowercase() {
        let addr = Address::repeat_byte(0xab);
        let hex = addr_hex(&addr);
        assert_eq!(hex, format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = LedgerRpcClient::new(
            "http://localhost:9545/",
            Address::zero(),
            Address::zero(),
            Duration::from_secs(5),
            Duration::from_millis(100),
        )
        .unwrap();
        assert_eq!(client.url("/health"), "http://localhost:9545/health");
    }
}
