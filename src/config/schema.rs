//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Every
//! section has defaults targeting the public testnet, so an empty file (or
//! no file) is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Endpoints and network identity.
    pub network: NetworkConfig,

    /// Fee and validity window policy.
    pub transaction: TransactionConfig,

    /// Credential file location.
    pub credentials: CredentialsConfig,

    /// HTTP client settings.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Horizon (ledger API) root URL.
    pub horizon_url: String,

    /// Faucet endpoint; the address is sent as the `addr` query parameter.
    pub friendbot_url: String,

    /// Network passphrase; signatures are bound to its hash.
    pub passphrase: String,
}

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            horizon_url: "https://horizon-testnet.stellar.org".to_string(),
            friendbot_url: "https://friendbot.stellar.org".to_string(),
            passphrase: TESTNET_PASSPHRASE.to_string(),
        }
    }
}

/// How the per-operation fee is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeePolicy {
    /// Always use `base_fee`.
    Fixed,
    /// Use the last ledger's base fee as reported by the ledger API.
    NetworkMinimum,
}

/// Transaction construction policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    pub fee_policy: FeePolicy,

    /// Per-operation fee in stroops (used by the `fixed` policy).
    pub base_fee: u32,

    /// Validity window from construction time, in seconds.
    pub timeout_secs: u64,

    /// Build transactions without an expiry. Test environments only.
    pub no_expiry: bool,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            fee_policy: FeePolicy::Fixed,
            base_fee: 100,
            timeout_secs: 300,
            no_expiry: false,
        }
    }
}

/// Credential storage.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Path of the seed file.
    pub path: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: "account.seed".to_string(),
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
