//! Stellar testnet account bootstrap and transfer client.

pub mod blockchain;
pub mod config;
pub mod observability;

pub use blockchain::{
    FriendbotClient, HorizonClient, Identity, LedgerApi, SubmissionResult, TxBuilder, WalletError,
};
pub use config::AppConfig;
