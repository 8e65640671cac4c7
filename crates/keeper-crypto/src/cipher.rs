//! AES-256-GCM payload cipher with hex-encoded output.
//!
//! Every secret payload and every bearer credential passes through the same
//! cipher: the client encrypts before anything leaves the process, and the
//! server only ever stores or compares ciphertext.
//!
//! The nonce is fixed per cipher instance, so identical plaintexts produce
//! identical ciphertexts under the same key. This keeps ciphertexts
//! interchangeable with existing deployments; it is a known weakness of the
//! format and rotating keys is out of scope.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use std::fmt;

use crate::error::CipherError;

/// AES-256 key length in bytes.
pub const KEY_SIZE: usize = 32;

/// GCM nonce length in bytes.
pub const NONCE_SIZE: usize = 12;

/// Built-in key used when none is configured.
const DEFAULT_KEY: [u8; KEY_SIZE] = [
    4, 51, 71, 14, 63, 8, 95, 100, 44, 4, 19, 85, 57, 54, 23, 54, 26, 59, 24, 44, 47, 52, 63, 1,
    84, 24, 23, 51, 3, 88, 72, 73,
];

/// Built-in nonce used when none is configured.
const DEFAULT_NONCE: [u8; NONCE_SIZE] = [4, 51, 71, 14, 63, 8, 95, 100, 44, 4, 19, 85];

/// Symmetric cipher shared by client and server.
#[derive(Clone)]
pub struct Cipher {
    aead: Aes256Gcm,
    nonce: [u8; NONCE_SIZE],
}

impl Cipher {
    /// Build a cipher from raw key and nonce bytes.
    pub fn new(key: [u8; KEY_SIZE], nonce: [u8; NONCE_SIZE]) -> Self {
        Self {
            aead: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
            nonce,
        }
    }

    /// Build a cipher from hex strings, as found in configuration.
    pub fn from_hex(key_hex: &str, nonce_hex: &str) -> Result<Self, CipherError> {
        let key: [u8; KEY_SIZE] = decode_fixed(key_hex, "key")?;
        let nonce: [u8; NONCE_SIZE] = decode_fixed(nonce_hex, "nonce")?;
        Ok(Self::new(key, nonce))
    }

    /// Build a cipher from optional configured values, falling back to the
    /// built-in key or nonce for whichever is unset.
    pub fn from_config(config: &keeper_core::config::CipherConfig) -> Result<Self, CipherError> {
        let key = match &config.key {
            Some(hex) => decode_fixed(hex, "key")?,
            None => DEFAULT_KEY,
        };
        let nonce = match &config.nonce {
            Some(hex) => decode_fixed(hex, "nonce")?,
            None => DEFAULT_NONCE,
        };
        Ok(Self::new(key, nonce))
    }

    /// Encrypt `plaintext` and return the hex-encoded ciphertext with tag.
    pub fn encode(&self, plaintext: &[u8]) -> String {
        let ciphertext = self
            .aead
            .encrypt(Nonce::from_slice(&self.nonce), plaintext)
            // AES-GCM only rejects inputs longer than 2^36 bytes
            .expect("AES-GCM encryption should not fail for in-memory payloads");
        hex::encode(ciphertext)
    }

    /// Decrypt hex-encoded ciphertext produced by [`Cipher::encode`].
    ///
    /// Malformed hex and failed authentication are indistinguishable to the caller.
    pub fn decode(&self, ciphertext_hex: &str) -> Result<Vec<u8>, CipherError> {
        let ciphertext = hex::decode(ciphertext_hex).map_err(|_| CipherError::Decode)?;
        self.aead
            .decrypt(Nonce::from_slice(&self.nonce), ciphertext.as_slice())
            .map_err(|_| CipherError::Decode)
    }

    /// Decrypt and interpret the plaintext as UTF-8.
    pub fn decode_utf8(&self, ciphertext_hex: &str) -> Result<String, CipherError> {
        String::from_utf8(self.decode(ciphertext_hex)?).map_err(|_| CipherError::NotUtf8)
    }
}

impl Default for Cipher {
    fn default() -> Self {
        Self::new(DEFAULT_KEY, DEFAULT_NONCE)
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}

fn decode_fixed<const N: usize>(value: &str, what: &str) -> Result<[u8; N], CipherError> {
    let bytes = hex::decode(value)
        .map_err(|e| CipherError::InvalidKey(format!("{what} is not hex: {e}")))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        CipherError::InvalidKey(format!("{what} must be {N} bytes, got {}", bytes.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_encode_decode() {
        let cipher = Cipher::default();
        let plaintext = br#"{"login":"bob","password":"hunter2"}"#;

        let encoded = cipher.encode(plaintext);
        assert!(encoded.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(cipher.decode(&encoded).unwrap(), plaintext);
    }

    #[test]
    fn test_empty_plaintext_works() {
        let cipher = Cipher::default();
        let encoded = cipher.encode(b"");
        assert_eq!(cipher.decode(&encoded).unwrap(), b"");
    }

    #[test]
    fn test_fixed_nonce_is_deterministic() {
        let cipher = Cipher::default();
        assert_eq!(cipher.encode(b"same"), cipher.encode(b"same"));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let cipher = Cipher::default();
        let mut bytes = hex::decode(cipher.encode(b"important secret")).unwrap();
        bytes[1] ^= 0xff;

        let result = cipher.decode(&hex::encode(bytes));
        assert!(matches!(result, Err(CipherError::Decode)));
    }

    #[test]
    fn test_wrong_key_fails() {
        let a = Cipher::default();
        let b = Cipher::new([7u8; KEY_SIZE], DEFAULT_NONCE);

        let encoded = a.encode(b"sensitive data");
        assert!(matches!(b.decode(&encoded), Err(CipherError::Decode)));
    }

    #[test]
    fn test_non_hex_input_fails() {
        let cipher = Cipher::default();
        assert!(matches!(cipher.decode("not hex at all"), Err(CipherError::Decode)));
        assert!(matches!(cipher.decode("abc"), Err(CipherError::Decode)));
        assert!(matches!(cipher.decode(""), Err(CipherError::Decode)));
    }

    #[test]
    fn test_from_hex_matches_default() {
        let cipher = Cipher::from_hex(&hex::encode(DEFAULT_KEY), &hex::encode(DEFAULT_NONCE))
            .unwrap();
        let encoded = Cipher::default().encode(b"interop");
        assert_eq!(cipher.decode_utf8(&encoded).unwrap(), "interop");
    }

    #[test]
    fn test_from_hex_rejects_bad_lengths() {
        let nonce = hex::encode(DEFAULT_NONCE);
        assert!(matches!(
            Cipher::from_hex("0011", &nonce),
            Err(CipherError::InvalidKey(_))
        ));
        assert!(matches!(
            Cipher::from_hex("zz", &nonce),
            Err(CipherError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_from_config_partial_override() {
        let config = keeper_core::config::CipherConfig {
            key: Some(hex::encode([9u8; KEY_SIZE])),
            nonce: None,
        };
        let cipher = Cipher::from_config(&config).unwrap();
        let expected = Cipher::new([9u8; KEY_SIZE], DEFAULT_NONCE);
        assert_eq!(cipher.encode(b"x"), expected.encode(b"x"));
    }
}
