//! StrKey encoding of account addresses (`G...`) and secret seeds (`S...`).
//!
//! Layout: `version byte || 32-byte key || crc16-xmodem (little endian)`,
//! rendered as unpadded RFC 4648 base32.

use base32::Alphabet;
use thiserror::Error;

const VERSION_ACCOUNT_ID: u8 = 6 << 3;
const VERSION_SEED: u8 = 18 << 3;

const ALPHABET: Alphabet = Alphabet::RFC4648 { padding: false };

/// Encoded length of a 32-byte key.
pub const ENCODED_LEN: usize = 56;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrKeyError {
    #[error("expected {ENCODED_LEN} characters, got {0}")]
    InvalidLength(usize),

    /// Not canonical unpadded upper-case base32.
    #[error("invalid base32 encoding")]
    InvalidEncoding,

    #[error("unexpected version byte {actual:#04x} (expected {expected:#04x})")]
    InvalidVersion { expected: u8, actual: u8 },

    #[error("checksum mismatch")]
    ChecksumMismatch,
}

pub fn encode_account_id(key: &[u8; 32]) -> String {
    encode(VERSION_ACCOUNT_ID, key)
}

pub fn decode_account_id(encoded: &str) -> Result<[u8; 32], StrKeyError> {
    decode(VERSION_ACCOUNT_ID, encoded)
}

pub fn encode_seed(seed: &[u8; 32]) -> String {
    encode(VERSION_SEED, seed)
}

pub fn decode_seed(encoded: &str) -> Result<[u8; 32], StrKeyError> {
    decode(VERSION_SEED, encoded)
}

fn encode(version: u8, payload: &[u8; 32]) -> String {
    let mut raw = Vec::with_capacity(35);
    raw.push(version);
    raw.extend_from_slice(payload);
    let checksum = crc16_xmodem(&raw);
    raw.extend_from_slice(&checksum.to_le_bytes());
    base32::encode(ALPHABET, &raw)
}

fn decode(version: u8, encoded: &str) -> Result<[u8; 32], StrKeyError> {
    if encoded.len() != ENCODED_LEN {
        return Err(StrKeyError::InvalidLength(encoded.len()));
    }

    // the decoder accepts lower case; only the canonical form is valid
    let raw = base32::decode(ALPHABET, encoded).ok_or(StrKeyError::InvalidEncoding)?;
    if base32::encode(ALPHABET, &raw) != encoded {
        return Err(StrKeyError::InvalidEncoding);
    }
    if raw.len() != 35 {
        return Err(StrKeyError::InvalidLength(encoded.len()));
    }
    if raw[0] != version {
        return Err(StrKeyError::InvalidVersion {
            expected: version,
            actual: raw[0],
        });
    }

    let (body, checksum) = raw.split_at(33);
    if checksum != crc16_xmodem(body).to_le_bytes() {
        return Err(StrKeyError::ChecksumMismatch);
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&body[1..]);
    Ok(key)
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc16_check_value() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
        assert_eq!(crc16_xmodem(&[]), 0);
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            encode_account_id(&[0u8; 32]),
            "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF"
        );
        assert_eq!(
            encode_seed(&[0u8; 32]),
            "SAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSU2"
        );
        assert_eq!(
            decode_account_id("GADQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOZPI").unwrap(),
            [7u8; 32]
        );
    }

    #[test]
    fn test_prefixes_and_length() {
        let key = [42u8; 32];
        let address = encode_account_id(&key);
        let seed = encode_seed(&key);

        assert!(address.starts_with('G'));
        assert!(seed.starts_with('S'));
        assert_eq!(address.len(), ENCODED_LEN);
        assert_eq!(seed.len(), ENCODED_LEN);

        assert_eq!(decode_account_id(&address).unwrap(), key);
        assert_eq!(decode_seed(&seed).unwrap(), key);
    }

    #[test]
    fn test_version_mismatch() {
        let seed = encode_seed(&[1u8; 32]);
        assert!(matches!(
            decode_account_id(&seed),
            Err(StrKeyError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_tampered_checksum() {
        let address = encode_account_id(&[9u8; 32]);
        // flip a character in the key portion
        let mut chars: Vec<char> = address.chars().collect();
        chars[10] = if chars[10] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        assert_eq!(
            decode_account_id(&tampered),
            Err(StrKeyError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(decode_seed("SABC"), Err(StrKeyError::InvalidLength(4)));

        let lowercase = encode_seed(&[3u8; 32]).to_lowercase();
        assert_eq!(decode_seed(&lowercase), Err(StrKeyError::InvalidEncoding));

        let mut bad_char = encode_seed(&[3u8; 32]);
        bad_char.replace_range(5..6, "1");
        assert_eq!(decode_seed(&bad_char), Err(StrKeyError::InvalidEncoding));
    }
}
