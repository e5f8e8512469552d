//! Transaction building, signing, and submission.
//!
//! # Responsibilities
//! - Check preconditions (destination exists, source funded)
//! - Embed the source account's next sequence number
//! - Apply the configured fee and validity window policies
//! - Sign over the network-bound transaction hash and submit
//!
//! Nothing is signed until every precondition query has succeeded, and a
//! rejected submission is returned as-is without retry.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::blockchain::client::LedgerApi;
use crate::blockchain::types::{
    AccountId, Amount, SubmissionResult, WalletError, WalletResult,
};
use crate::blockchain::wallet::Identity;
use crate::blockchain::xdr::{self, DecoratedSignature};
use crate::config::schema::{FeePolicy, TransactionConfig};

/// A single ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create and fund a brand-new account.
    CreateAccount {
        destination: AccountId,
        starting_balance: Amount,
    },
    /// Send native asset to an existing account.
    Payment {
        destination: AccountId,
        amount: Amount,
    },
}

/// Ledger-side acceptance window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Valid between two unix timestamps (0 = unbounded on that side).
    Bounded { min_time: u64, max_time: u64 },
    /// Valid until consumed or superseded. Test environments only.
    NoExpiry,
}

/// Unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub source: AccountId,
    /// Total fee in stroops.
    pub fee: u32,
    pub sequence: i64,
    pub validity: Validity,
    pub operations: Vec<Operation>,
}

/// A signed transaction ready for submission.
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    transaction: Transaction,
    hash: [u8; 32],
    signatures: Vec<DecoratedSignature>,
    bytes: Vec<u8>,
}

impl SignedEnvelope {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        &self.signatures
    }

    /// Encoded envelope bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Base64 form accepted by the submission endpoint.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Builds, signs and submits transactions against a ledger.
pub struct TxBuilder {
    ledger: Arc<dyn LedgerApi>,
    config: TransactionConfig,
    network_id: [u8; 32],
}

impl TxBuilder {
    /// Create a new transaction builder.
    ///
    /// # Arguments
    /// * `ledger` - Ledger API used for queries and submission
    /// * `config` - Fee and validity window policy
    /// * `passphrase` - Network passphrase signatures are bound to
    pub fn new(ledger: Arc<dyn LedgerApi>, config: TransactionConfig, passphrase: &str) -> Self {
        Self {
            ledger,
            config,
            network_id: xdr::network_id(passphrase),
        }
    }

    /// Send a native-asset payment to an existing account.
    pub async fn submit_payment(
        &self,
        source: &Identity,
        destination: &str,
        amount: &str,
    ) -> WalletResult<SubmissionResult> {
        let destination_id = AccountId::parse(destination)?;
        let amount = Amount::parse(amount)?;

        // payments never create the destination implicitly
        match self.ledger.account(destination).await {
            Ok(_) => {}
            Err(WalletError::AccountNotFound(address)) => {
                return Err(WalletError::DestinationNotFound(address));
            }
            Err(e) => return Err(e),
        }

        let operation = Operation::Payment {
            destination: destination_id,
            amount,
        };
        let envelope = self.prepare(source, operation).await?;

        tracing::info!(
            source = %source.address(),
            destination = %destination,
            amount = %amount,
            sequence = envelope.transaction().sequence,
            "Submitting payment"
        );
        self.submit(envelope).await
    }

    /// Create and fund a new account from `funder`.
    pub async fn create_funded_account(
        &self,
        funder: &Identity,
        new_address: &str,
        starting_balance: &str,
    ) -> WalletResult<SubmissionResult> {
        let destination = AccountId::parse(new_address)?;
        let starting_balance = Amount::parse(starting_balance)?;

        let operation = Operation::CreateAccount {
            destination,
            starting_balance,
        };
        let envelope = self.prepare(funder, operation).await?;

        tracing::info!(
            funder = %funder.address(),
            destination = %new_address,
            starting_balance = %starting_balance,
            sequence = envelope.transaction().sequence,
            "Submitting account creation"
        );
        self.submit(envelope).await
    }

    /// Query the source account and build a signed envelope for `operation`.
    pub async fn prepare(
        &self,
        source: &Identity,
        operation: Operation,
    ) -> WalletResult<SignedEnvelope> {
        let address = source.address();
        let snapshot = match self.ledger.account(&address).await {
            Ok(snapshot) => snapshot,
            Err(WalletError::AccountNotFound(address)) => {
                return Err(WalletError::SourceAccountNotFound(address));
            }
            Err(e) => return Err(e),
        };

        let base_fee = match self.config.fee_policy {
            FeePolicy::Fixed => self.config.base_fee,
            FeePolicy::NetworkMinimum => self.ledger.base_fee().await?,
        };

        let operations = vec![operation];
        let fee = base_fee
            .checked_mul(operations.len() as u32)
            .ok_or_else(|| WalletError::InvalidAmount {
                amount: base_fee.to_string(),
                reason: "fee overflow".to_string(),
            })?;

        let transaction = Transaction {
            source: source.account_id(),
            fee,
            sequence: snapshot.next_sequence()?,
            validity: self.validity()?,
            operations,
        };

        Ok(self.sign(source, transaction))
    }

    /// Sign `transaction` for this builder's network.
    pub fn sign(&self, signer: &Identity, transaction: Transaction) -> SignedEnvelope {
        let tx_bytes = xdr::encode_transaction(&transaction);
        let hash = xdr::transaction_hash(&self.network_id, &tx_bytes);
        let signatures = vec![DecoratedSignature {
            hint: signer.signature_hint(),
            signature: signer.sign(&hash),
        }];
        let bytes = xdr::encode_envelope(&tx_bytes, &signatures);

        SignedEnvelope {
            transaction,
            hash,
            signatures,
            bytes,
        }
    }

    async fn submit(&self, envelope: SignedEnvelope) -> WalletResult<SubmissionResult> {
        match self.ledger.submit(&envelope).await {
            Ok(result) => {
                tracing::info!(hash = %result.hash, ledger = result.ledger, "Transaction accepted");
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(hash = %envelope.hash_hex(), error = %e, "Transaction not accepted");
                Err(e)
            }
        }
    }

    fn validity(&self) -> WalletResult<Validity> {
        if self.config.no_expiry {
            tracing::warn!("Building transaction without expiry; it stays replayable until consumed");
            return Ok(Validity::NoExpiry);
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let max_time = now
            .checked_add(self.config.timeout_secs)
            .ok_or(WalletError::InvalidTimeBounds(self.config.timeout_secs))?;
        Ok(Validity::Bounded {
            min_time: 0,
            max_time,
        })
    }
}

impl std::fmt::Debug for TxBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxBuilder")
            .field("config", &self.config)
            .field("network_id", &hex::encode(self.network_id))
            .finish()
    }
}
