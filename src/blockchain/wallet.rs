//! Signing identities.
//!
//! # Security
//! - Seeds are never logged or serialized implicitly
//! - `Debug` output redacts the seed
//! - The seed is only revealed through [`Identity::secret_seed`]

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::blockchain::strkey::{self, StrKeyError};
use crate::blockchain::types::{AccountId, WalletError, WalletResult};

/// An ed25519 keypair identifying one ledger account.
#[derive(Clone)]
pub struct Identity {
    signing_key: SigningKey,
    account_id: AccountId,
}

impl Identity {
    /// Generate a fresh random identity from the OS entropy source.
    pub fn generate() -> WalletResult<Self> {
        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| WalletError::EntropyFailure(e.to_string()))?;

        let identity = Self::from_raw_seed(seed);
        tracing::debug!(address = %identity.address(), "Generated new identity");
        Ok(identity)
    }

    /// Reconstruct an identity from raw key material.
    ///
    /// The address is a pure function of the seed.
    pub fn from_raw_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let account_id = AccountId::from_public_key(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            account_id,
        }
    }

    /// Parse an `S...` secret seed.
    pub fn from_secret_seed(encoded: &str) -> Result<Self, StrKeyError> {
        strkey::decode_seed(encoded).map(Self::from_raw_seed)
    }

    /// The account address (`G...`). Safe to share.
    pub fn address(&self) -> String {
        self.account_id.to_string()
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn public_key(&self) -> [u8; 32] {
        *self.account_id.public_key()
    }

    /// The encoded secret seed (`S...`). Never log this.
    pub fn secret_seed(&self) -> String {
        strkey::encode_seed(&self.signing_key.to_bytes())
    }

    /// Last four bytes of the public key, used to tag signatures.
    pub fn signature_hint(&self) -> [u8; 4] {
        let key = self.account_id.public_key();
        [key[28], key[29], key[30], key[31]]
    }

    /// Sign arbitrary bytes. Ed25519 signatures are deterministic.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address())
            .field("seed", &"<redacted>")
            .finish()
    }
}
