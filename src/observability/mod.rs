//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (address, hash, ledger)
//!     → logging.rs subscriber (EnvFilter + fmt to stderr)
//! ```
//!
//! # Design Decisions
//! - Addresses and hashes are logged; seeds never are

pub mod logging;
