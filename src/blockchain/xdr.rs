//! Canonical binary encoding of transactions and envelopes.
//!
//! Only the subset needed for native payments and account creation is
//! covered. All integers are big-endian; every item is padded to a
//! four-byte boundary.

use sha2::{Digest, Sha256};

use crate::blockchain::transaction::{Operation, Transaction, Validity};

const ENVELOPE_TYPE_TX: i32 = 2;

const KEY_TYPE_ED25519: i32 = 0;
const PUBLIC_KEY_TYPE_ED25519: i32 = 0;

const PRECOND_NONE: i32 = 0;
const PRECOND_TIME: i32 = 1;

const MEMO_NONE: i32 = 0;

const OP_CREATE_ACCOUNT: i32 = 0;
const OP_PAYMENT: i32 = 1;

const ASSET_TYPE_NATIVE: i32 = 0;

#[derive(Default)]
struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    fn i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Fixed-length opaque data.
    fn opaque(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        let pad = (4 - bytes.len() % 4) % 4;
        self.buf.extend(std::iter::repeat(0u8).take(pad));
    }

    /// Variable-length opaque data with a length prefix.
    fn var_opaque(&mut self, bytes: &[u8]) {
        self.u32(bytes.len() as u32);
        self.opaque(bytes);
    }

    fn muxed_account(&mut self, key: &[u8; 32]) {
        self.i32(KEY_TYPE_ED25519);
        self.opaque(key);
    }

    fn account_id(&mut self, key: &[u8; 32]) {
        self.i32(PUBLIC_KEY_TYPE_ED25519);
        self.opaque(key);
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Hash of the network passphrase; binds signatures to one network.
pub fn network_id(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

pub fn encode_transaction(tx: &Transaction) -> Vec<u8> {
    let mut w = XdrWriter::default();
    w.muxed_account(tx.source.public_key());
    w.u32(tx.fee);
    w.i64(tx.sequence);

    match tx.validity {
        Validity::NoExpiry => w.i32(PRECOND_NONE),
        Validity::Bounded { min_time, max_time } => {
            w.i32(PRECOND_TIME);
            w.u64(min_time);
            w.u64(max_time);
        }
    }

    w.i32(MEMO_NONE);

    w.u32(tx.operations.len() as u32);
    for op in &tx.operations {
        // per-operation source account: absent
        w.u32(0);
        match op {
            Operation::CreateAccount {
                destination,
                starting_balance,
            } => {
                w.i32(OP_CREATE_ACCOUNT);
                w.account_id(destination.public_key());
                w.i64(starting_balance.stroops());
            }
            Operation::Payment {
                destination,
                amount,
            } => {
                w.i32(OP_PAYMENT);
                w.muxed_account(destination.public_key());
                w.i32(ASSET_TYPE_NATIVE);
                w.i64(amount.stroops());
            }
        }
    }

    // ext
    w.i32(0);
    w.into_bytes()
}

/// Hash that is signed and that identifies the transaction on the ledger.
pub fn transaction_hash(network_id: &[u8; 32], tx_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(network_id);
    hasher.update(ENVELOPE_TYPE_TX.to_be_bytes());
    hasher.update(tx_bytes);
    hasher.finalize().into()
}

/// Signature tagged with the last four bytes of the signer's public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: [u8; 64],
}

pub fn encode_envelope(tx_bytes: &[u8], signatures: &[DecoratedSignature]) -> Vec<u8> {
    let mut w = XdrWriter::default();
    w.i32(ENVELOPE_TYPE_TX);
    w.buf.extend_from_slice(tx_bytes);
    w.u32(signatures.len() as u32);
    for sig in signatures {
        w.opaque(&sig.hint);
        w.var_opaque(&sig.signature);
    }
    w.into_bytes()
}
