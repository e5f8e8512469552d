//! Ledger API client.
//!
//! # Responsibilities
//! - Look up account state (balances, sequence number)
//! - Fetch the network base fee
//! - Submit signed envelopes and surface rejections verbatim
//!
//! [`LedgerApi`] is the seam; [`HorizonClient`] talks HTTP to a Horizon server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::blockchain::transaction::SignedEnvelope;
use crate::blockchain::types::{
    AccountId, AccountSnapshot, Balance, SubmissionResult, WalletError, WalletResult,
};

/// Remote ledger operations used by the workflow.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Fetch balances and sequence number. `AccountNotFound` for unfunded addresses.
    async fn account(&self, address: &str) -> WalletResult<AccountSnapshot>;

    /// Current balances of an address.
    async fn balances(&self, address: &str) -> WalletResult<Vec<Balance>> {
        Ok(self.account(address).await?.balances)
    }

    /// Per-operation base fee of the last closed ledger, in stroops.
    async fn base_fee(&self) -> WalletResult<u32>;

    /// Submit a signed envelope. Rejections map to `SubmissionRejected`.
    async fn submit(&self, envelope: &SignedEnvelope) -> WalletResult<SubmissionResult>;
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    account_id: String,
    sequence: String,
    #[serde(default)]
    balances: Vec<BalanceResponse>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: String,
    asset_type: String,
    asset_code: Option<String>,
    asset_issuer: Option<String>,
}

impl From<BalanceResponse> for Balance {
    fn from(b: BalanceResponse) -> Self {
        Balance {
            amount: b.balance,
            asset_type: b.asset_type,
            asset_code: b.asset_code,
            asset_issuer: b.asset_issuer,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeeStatsResponse {
    last_ledger_base_fee: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    hash: String,
    ledger: u32,
    #[serde(default = "default_successful")]
    successful: bool,
}

fn default_successful() -> bool {
    true
}

/// Horizon problem document returned on errors.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Problem {
    title: Option<String>,
    detail: Option<String>,
    extras: Option<ProblemExtras>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProblemExtras {
    result_codes: Option<ResultCodes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResultCodes {
    transaction: Option<String>,
    operations: Vec<String>,
}

impl Problem {
    /// Result codes as a single reason string, e.g. `tx_failed [op_underfunded]`.
    fn result_reason(&self) -> Option<String> {
        let codes = self.extras.as_ref()?.result_codes.as_ref()?;
        let tx = codes.transaction.clone()?;
        if codes.operations.is_empty() {
            Some(tx)
        } else {
            Some(format!("{} [{}]", tx, codes.operations.join(", ")))
        }
    }

    fn summary(&self) -> Option<String> {
        self.detail.clone().or_else(|| self.title.clone())
    }
}

fn network_error(context: impl Into<String>, reason: impl std::fmt::Display) -> WalletError {
    WalletError::Network {
        context: context.into(),
        reason: reason.to_string(),
    }
}

/// HTTP client for a Horizon server.
#[derive(Clone)]
pub struct HorizonClient {
    http: reqwest::Client,
    base_url: String,
}

impl HorizonClient {
    /// Create a client with its own connection pool.
    ///
    /// # Arguments
    /// * `base_url` - Horizon root, e.g. `https://horizon-testnet.stellar.org`
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> WalletResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| network_error("HTTP client setup", e))?;
        Self::with_http_client(base_url, http)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> WalletResult<Self> {
        let parsed = url::Url::parse(base_url).map_err(|e| WalletError::InvalidEndpoint {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(horizon_url = %parsed, "Horizon client initialized");

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LedgerApi for HorizonClient {
    async fn account(&self, address: &str) -> WalletResult<AccountSnapshot> {
        // reject malformed addresses before they reach the URL path
        AccountId::parse(address)?;

        let context = format!("account lookup for {}", address);
        let response = self
            .http
            .get(format!("{}/accounts/{}", self.base_url, address))
            .send()
            .await
            .map_err(|e| network_error(&context, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(address = %address, "Account not found");
            return Err(WalletError::AccountNotFound(address.to_string()));
        }
        if !status.is_success() {
            return Err(network_error(&context, format!("HTTP {}", status)));
        }

        let body: AccountResponse = response
            .json()
            .await
            .map_err(|e| network_error(&context, format!("malformed response: {}", e)))?;

        let sequence = body.sequence.parse::<i64>().map_err(|e| {
            network_error(&context, format!("malformed sequence '{}': {}", body.sequence, e))
        })?;

        tracing::debug!(
            address = %body.account_id,
            sequence = sequence,
            balances = body.balances.len(),
            "Fetched account"
        );

        Ok(AccountSnapshot {
            address: body.account_id,
            sequence,
            balances: body.balances.into_iter().map(Balance::from).collect(),
        })
    }

    async fn base_fee(&self) -> WalletResult<u32> {
        let context = "fee stats lookup";
        let response = self
            .http
            .get(format!("{}/fee_stats", self.base_url))
            .send()
            .await
            .map_err(|e| network_error(context, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(network_error(context, format!("HTTP {}", status)));
        }

        let body: FeeStatsResponse = response
            .json()
            .await
            .map_err(|e| network_error(context, format!("malformed response: {}", e)))?;

        body.last_ledger_base_fee.parse::<u32>().map_err(|e| {
            network_error(
                context,
                format!("malformed base fee '{}': {}", body.last_ledger_base_fee, e),
            )
        })
    }

    async fn submit(&self, envelope: &SignedEnvelope) -> WalletResult<SubmissionResult> {
        let context = format!("submission of {}", envelope.hash_hex());
        let response = self
            .http
            .post(format!("{}/transactions", self.base_url))
            .form(&[("tx", envelope.to_base64())])
            .send()
            .await
            .map_err(|e| network_error(&context, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| network_error(&context, e))?;

        if status.is_success() {
            let body: SubmitResponse = serde_json::from_str(&text)
                .map_err(|e| network_error(&context, format!("malformed response: {}", e)))?;
            return Ok(SubmissionResult {
                success: body.successful,
                hash: body.hash,
                ledger: body.ledger,
            });
        }

        let problem: Problem = serde_json::from_str(&text).unwrap_or_default();
        if let Some(reason) = problem.result_reason() {
            return Err(WalletError::SubmissionRejected { reason });
        }
        if status.is_client_error() {
            let reason = match problem.summary() {
                Some(summary) => format!("HTTP {}: {}", status, summary),
                None => format!("HTTP {}", status),
            };
            return Err(WalletError::SubmissionRejected { reason });
        }

        Err(network_error(&context, format!("HTTP {}", status)))
    }
}

impl std::fmt::Debug for HorizonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HorizonClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url() {
        let result = HorizonClient::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(WalletError::InvalidEndpoint { .. })));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            HorizonClient::new("https://horizon-testnet.stellar.org/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.base_url(), "https://horizon-testnet.stellar.org");
    }

    #[tokio::test]
    async fn test_malformed_address_rejected_locally() {
        let client = HorizonClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let result = client.account("GBAD").await;
        assert!(matches!(result, Err(WalletError::InvalidAddress { .. })));
    }

    #[test]
    fn test_problem_reason() {
        let problem: Problem = serde_json::from_str(
            r#"{
                "title": "Transaction Failed",
                "status": 400,
                "extras": {
                    "result_codes": {
                        "transaction": "tx_failed",
                        "operations": ["op_underfunded"]
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            problem.result_reason().as_deref(),
            Some("tx_failed [op_underfunded]")
        );

        let bare: Problem =
            serde_json::from_str(r#"{"extras":{"result_codes":{"transaction":"tx_bad_seq"}}}"#)
                .unwrap();
        assert_eq!(bare.result_reason().as_deref(), Some("tx_bad_seq"));
        assert_eq!(Problem::default().result_reason(), None);
    }
}
