//! Reversible-encryption credentials from the old data-protection scheme.
//!
//! These records are only ever read: a successful login re-hashes the
//! password and replaces the record with a salted digest.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Nonce size for AES-256-GCM (12 bytes / 96 bits).
const NONCE_SIZE: usize = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LegacyError {
    #[error("Encryption key must be 64 hex chars (32 bytes)")]
    InvalidKey,

    #[error("Ciphertext too short")]
    Truncated,

    #[error("AES-GCM operation failed")]
    Cipher,
}

/// AES-256-GCM cipher over `nonce || ciphertext` blobs.
pub struct LegacyCipher {
    cipher: Aes256Gcm,
}

impl LegacyCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Parse a hex-encoded 256-bit key.
    pub fn from_hex(key_hex: &str) -> Result<Self, LegacyError> {
        let bytes = hex::decode(key_hex.trim()).map_err(|_| LegacyError::InvalidKey)?;
        let key: [u8; 32] = bytes.try_into().map_err(|_| LegacyError::InvalidKey)?;
        Ok(Self::new(&key))
    }

    /// Encrypt a password into the legacy storage format.
    pub fn seal(&self, password: &[u8]) -> Result<Vec<u8>, LegacyError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), password)
            .map_err(|_| LegacyError::Cipher)?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        Ok(combined)
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, LegacyError> {
        if sealed.len() < NONCE_SIZE {
            return Err(LegacyError::Truncated);
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| LegacyError::Cipher)
    }

    /// True when `sealed` decrypts to exactly `password`.
    pub fn matches(&self, password: &[u8], sealed: &[u8]) -> Result<bool, LegacyError> {
        let stored = self.open(sealed)?;
        Ok(stored.ct_eq(password).into())
    }
}
