//! Testnet faucet (friendbot) client.
//!
//! No retries: any failure is terminal for the current attempt.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::blockchain::types::{WalletError, WalletResult};

/// Source of test funds.
#[async_trait]
pub trait Faucet: Send + Sync {
    /// Credit `address` with test funds. `FundingFailed` on any failure.
    async fn request_funding(&self, address: &str) -> WalletResult<()>;
}

/// Friendbot reply. Success bodies are transaction records, failures are
/// problem documents; only the fields below are read.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FundingResponse {
    hash: Option<String>,
    ledger: Option<u32>,
    successful: Option<bool>,
    title: Option<String>,
    detail: Option<String>,
}

/// HTTP client for a friendbot endpoint (`GET {endpoint}?addr=...`).
#[derive(Clone)]
pub struct FriendbotClient {
    http: reqwest::Client,
    endpoint: url::Url,
}

impl FriendbotClient {
    pub fn new(endpoint: &str, timeout: Duration) -> WalletResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::Network {
                context: "HTTP client setup".to_string(),
                reason: e.to_string(),
            })?;
        Self::with_http_client(endpoint, http)
    }

    pub fn with_http_client(endpoint: &str, http: reqwest::Client) -> WalletResult<Self> {
        let endpoint = url::Url::parse(endpoint).map_err(|e| WalletError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { http, endpoint })
    }

    fn funding_url(&self, address: &str) -> url::Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("addr", address);
        url
    }
}

#[async_trait]
impl Faucet for FriendbotClient {
    async fn request_funding(&self, address: &str) -> WalletResult<()> {
        let failed = |reason: String| WalletError::FundingFailed {
            address: address.to_string(),
            reason,
        };

        tracing::info!(address = %address, endpoint = %self.endpoint, "Requesting faucet funding");

        let response = self
            .http
            .get(self.funding_url(address))
            .send()
            .await
            .map_err(|e| failed(format!("transport error: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| failed(format!("transport error: {}", e)))?;
        // a non-JSON body is tolerated; the status decides
        let body: FundingResponse = serde_json::from_str(&text).unwrap_or_default();

        if !status.is_success() {
            let reason = match body.detail.or(body.title) {
                Some(detail) => format!("HTTP {}: {}", status, detail),
                None => format!("HTTP {}", status),
            };
            tracing::warn!(address = %address, reason = %reason, "Faucet rejected funding request");
            return Err(failed(reason));
        }

        if body.successful == Some(false) {
            return Err(failed("faucet reported an unsuccessful transaction".to_string()));
        }

        tracing::info!(
            address = %address,
            hash = body.hash.as_deref().unwrap_or("-"),
            ledger = body.ledger,
            "Account funded by faucet"
        );
        Ok(())
    }
}

impl std::fmt::Debug for FriendbotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FriendbotClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}
