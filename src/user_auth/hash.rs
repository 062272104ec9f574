//! Password hashing with a per-record salt.
//!
//! Digests are Argon2id over `(password, salt)`, by default with the argon2
//! crate's recommended costs. The raw output is stored, not a PHC string, so the salt
//! lives in its own column next to the digest.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Invalid Argon2 parameters: {0}")]
    InvalidParams(String),
}

/// Digest plus the salt it was derived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashOutput {
    pub digest: Vec<u8>,
    pub salt: Vec<u8>,
}

/// Argon2id hash engine.
#[derive(Default)]
pub struct HashEngine {
    argon2: Argon2<'static>,
}

impl HashEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with explicit Argon2id costs (memory in KiB).
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, parallelism, Some(DIGEST_LEN))
            .map_err(|e| HashError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash `password` with `salt`, or with a fresh random salt when `None`.
    pub fn hash(&self, password: &[u8], salt: Option<&[u8]>) -> Result<HashOutput, HashError> {
        if password.is_empty() {
            return Err(HashError::InvalidInput("password must not be empty"));
        }

        let salt = match salt {
            Some(s) if s.len() != SALT_LEN => {
                return Err(HashError::InvalidInput("salt must be 16 bytes"));
            }
            Some(s) => s.to_vec(),
            None => generate_salt(),
        };

        let mut digest = vec![0u8; DIGEST_LEN];
        self.argon2
            .hash_password_into(password, &salt, &mut digest)
            .map_err(|_| HashError::InvalidInput("argon2 rejected parameters"))?;

        Ok(HashOutput { digest, salt })
    }

    /// Recompute the digest for `password` and compare in constant time.
    pub fn verify(&self, password: &[u8], salt: &[u8], expected: &[u8]) -> Result<bool, HashError> {
        let computed = self.hash(password, Some(salt))?;
        Ok(computed.digest.ct_eq(expected).into())
    }
}

fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
