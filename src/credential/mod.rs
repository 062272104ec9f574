//! Credential Store
//!
//! Persists user credential records keyed by normalised email.
//!
//! - `memory`: DashMap-backed store for tests and database-less runs
//! - `postgres`: `users_tb` in PostgreSQL

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCredentialStore;
pub use postgres::PgCredentialStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email already registered: {0}")]
    Duplicate(String),

    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt credential record {id}: {reason}")]
    Corrupt { id: i64, reason: &'static str },
}

/// Stored password material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordSecret {
    /// Argon2id digest and the salt it was derived with.
    Hashed { digest: Vec<u8>, salt: Vec<u8> },
    /// AES-GCM sealed password from the old encrypted scheme.
    LegacyEncrypted { ciphertext: Vec<u8> },
}

impl PasswordSecret {
    pub fn is_legacy(&self) -> bool {
        matches!(self, PasswordSecret::LegacyEncrypted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: i64,
    pub email: String,
    pub secret: PasswordSecret,
}

/// Record to insert; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub email: String,
    pub secret: PasswordSecret,
}

/// Canonical form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Credential persistence.
///
/// `update` replaces the whole secret in one write. Concurrent updates of the
/// same record are last-writer-wins.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError>;

    /// Fails with `StoreError::Duplicate` if the email is taken.
    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError>;

    /// Fails with `StoreError::NotFound` if no record has this id.
    async fn update(&self, record: &CredentialRecord) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn test_is_legacy() {
        let hashed = PasswordSecret::Hashed {
            digest: vec![1],
            salt: vec![2],
        };
        let legacy = PasswordSecret::LegacyEncrypted {
            ciphertext: vec![3],
        };
        assert!(!hashed.is_legacy());
        assert!(legacy.is_legacy());
    }
}
