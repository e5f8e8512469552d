//! Ledger-facing types and error definitions.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::strkey;

/// Number of base units (stroops) in one unit of the native asset.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Maximum number of fractional digits an amount may carry.
const AMOUNT_SCALE: u32 = 7;

/// Errors that can occur during account and transaction operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The OS random source could not produce key material.
    #[error("Entropy source failure: {0}")]
    EntropyFailure(String),

    /// A stored seed could not be parsed. Never auto-repaired.
    #[error("Invalid credential in {path}: {reason}")]
    InvalidCredential { path: String, reason: String },

    /// Reading or writing the credential file failed.
    #[error("Credential file error at {path}: {source}")]
    CredentialIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The faucet rejected the request or could not be reached.
    #[error("Funding failed for {address}: {reason}")]
    FundingFailed { address: String, reason: String },

    #[error("Account {0} not found on ledger")]
    AccountNotFound(String),

    #[error("Source account {0} not found on ledger (not yet funded?)")]
    SourceAccountNotFound(String),

    #[error("Destination account {0} not found on ledger")]
    DestinationNotFound(String),

    /// Transport-level failure on a remote call.
    #[error("Network error during {context}: {reason}")]
    Network { context: String, reason: String },

    /// Ledger-side validation failure, reason carried verbatim.
    #[error("Transaction rejected: {reason}")]
    SubmissionRejected { reason: String },

    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Validity window does not fit a unix timestamp.
    #[error("Validity window of {0} seconds is out of range")]
    InvalidTimeBounds(u64),

    #[error("Sequence number overflow for {0}")]
    SequenceOverflow(String),
}

impl WalletError {
    /// Process exit code for this failure kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            WalletError::EntropyFailure(_)
            | WalletError::InvalidCredential { .. }
            | WalletError::CredentialIo { .. } => 3,
            WalletError::FundingFailed { .. } => 4,
            WalletError::AccountNotFound(_)
            | WalletError::SourceAccountNotFound(_)
            | WalletError::DestinationNotFound(_) => 5,
            WalletError::Network { .. } => 6,
            WalletError::SubmissionRejected { .. } | WalletError::SequenceOverflow(_) => 7,
            WalletError::InvalidAddress { .. }
            | WalletError::InvalidAmount { .. }
            | WalletError::InvalidEndpoint { .. }
            | WalletError::InvalidTimeBounds(_) => 8,
        }
    }
}

/// Result type for account and transaction operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// An ed25519 account identifier on the ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId([u8; 32]);

impl AccountId {
    pub fn from_public_key(key: [u8; 32]) -> Self {
        Self(key)
    }

    /// Parse a `G...` address.
    pub fn parse(address: &str) -> WalletResult<Self> {
        strkey::decode_account_id(address)
            .map(Self)
            .map_err(|e| WalletError::InvalidAddress {
                address: address.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&strkey::encode_account_id(&self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self)
    }
}

/// A positive native-asset amount, held in stroops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    /// Parse a decimal string such as `"50"` or `"0.0000001"`.
    pub fn parse(input: &str) -> WalletResult<Self> {
        let invalid = |reason: String| WalletError::InvalidAmount {
            amount: input.to_string(),
            reason,
        };

        let value = Decimal::from_str(input.trim()).map_err(|e| invalid(e.to_string()))?;
        if value.normalize().scale() > AMOUNT_SCALE {
            return Err(invalid(format!(
                "more than {} fractional digits",
                AMOUNT_SCALE
            )));
        }
        if value <= Decimal::ZERO {
            return Err(invalid("must be greater than zero".to_string()));
        }

        value
            .checked_mul(Decimal::from(STROOPS_PER_UNIT))
            .and_then(|stroops| stroops.to_i64())
            .map(Self)
            .ok_or_else(|| invalid("out of range".to_string()))
    }

    pub fn from_stroops(stroops: i64) -> Self {
        Self(stroops)
    }

    pub fn stroops(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Decimal::new(self.0, AMOUNT_SCALE).normalize())
    }
}

/// One balance line of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Decimal string as reported by the ledger.
    pub amount: String,
    /// `native`, `credit_alphanum4`, `credit_alphanum12`, ...
    pub asset_type: String,
    pub asset_code: Option<String>,
    pub asset_issuer: Option<String>,
}

impl Balance {
    pub fn native(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            asset_type: "native".to_string(),
            asset_code: None,
            asset_issuer: None,
        }
    }

    pub fn is_native(&self) -> bool {
        self.asset_type == "native"
    }
}

/// Queried state of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub address: String,
    /// Last sequence number consumed by this account.
    pub sequence: i64,
    pub balances: Vec<Balance>,
}

impl AccountSnapshot {
    /// Sequence number the next transaction from this account must carry.
    pub fn next_sequence(&self) -> WalletResult<i64> {
        self.sequence
            .checked_add(1)
            .ok_or_else(|| WalletError::SequenceOverflow(self.address.clone()))
    }
}

/// Outcome of an accepted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
    /// Hex-encoded transaction hash.
    pub hash: String,
    /// Ledger sequence the transaction was included in.
    pub ledger: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parsing() {
        assert_eq!(Amount::parse("50").unwrap().stroops(), 500_000_000);
        assert_eq!(Amount::parse("0.0000001").unwrap().stroops(), 1);
        assert_eq!(Amount::parse(" 1.5 ").unwrap().stroops(), 15_000_000);
        // trailing zeros beyond the seventh digit carry no value
        assert_eq!(Amount::parse("2.500000000").unwrap().stroops(), 25_000_000);
    }

    #[test]
    fn test_amount_rejects_invalid() {
        assert!(Amount::parse("0").is_err());
        assert!(Amount::parse("-5").is_err());
        assert!(Amount::parse("0.00000001").is_err());
        assert!(Amount::parse("abc").is_err());
        assert!(Amount::parse("922337203686").is_err());

        let err = Amount::parse("1.123456789").unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount { .. }));
        assert!(err.to_string().contains("fractional digits"));
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_stroops(500_000_000).to_string(), "50");
        assert_eq!(Amount::from_stroops(15_000_001).to_string(), "1.5000001");
    }

    #[test]
    fn test_next_sequence() {
        let snapshot = AccountSnapshot {
            address: "GTEST".to_string(),
            sequence: 41,
            balances: vec![Balance::native("10000")],
        };
        assert_eq!(snapshot.next_sequence().unwrap(), 42);

        let exhausted = AccountSnapshot {
            sequence: i64::MAX,
            ..snapshot
        };
        assert!(matches!(
            exhausted.next_sequence(),
            Err(WalletError::SequenceOverflow(_))
        ));
    }

    #[test]
    fn test_account_id_roundtrip() {
        let id = AccountId::from_public_key([7u8; 32]);
        let parsed = AccountId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
        assert!(AccountId::parse("GNOTANADDRESS").is_err());
    }

    #[test]
    fn test_exit_codes() {
        let err = WalletError::SubmissionRejected {
            reason: "tx_bad_seq".to_string(),
        };
        assert_eq!(err.exit_code(), 7);
        assert_eq!(err.to_string(), "Transaction rejected: tx_bad_seq");

        let err = WalletError::FundingFailed {
            address: "GABC".to_string(),
            reason: "HTTP 400 Bad Request".to_string(),
        };
        assert_eq!(err.exit_code(), 4);
        assert_eq!(WalletError::DestinationNotFound("G".into()).exit_code(), 5);
        // malformed input never reaches the faucet
        assert_eq!(AccountId::parse("GNOTANADDRESS").unwrap_err().exit_code(), 8);
    }
}
