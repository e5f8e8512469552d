//! Account bootstrap and transfer workflow.
//!
//! # Data Flow
//! ```text
//! credential file / fresh entropy
//!     → wallet.rs + credentials.rs (identity, load-or-create)
//!     → faucet.rs (fund new identities)
//!     → client.rs (account state, fee stats, submission)
//!     → transaction.rs (build, sign, submit)
//! ```
//!
//! # Security Constraints
//! - Seeds are never logged
//! - Credential files are created owner-only and never overwritten
//! - Signatures are bound to the configured network passphrase

pub mod client;
pub mod credentials;
pub mod faucet;
pub mod strkey;
pub mod transaction;
pub mod types;
pub mod wallet;
pub mod xdr;

pub use client::{HorizonClient, LedgerApi};
pub use credentials::{load_identity, load_or_create_identity, store_identity};
pub use faucet::{Faucet, FriendbotClient};
pub use transaction::{Operation, SignedEnvelope, Transaction, TxBuilder, Validity};
pub use types::{
    AccountId, AccountSnapshot, Amount, Balance, SubmissionResult, WalletError, WalletResult,
};
pub use wallet::Identity;
