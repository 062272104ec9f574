//! In-memory credential store.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use super::{CredentialRecord, CredentialStore, NewCredential, StoreError, normalize_email};

/// Thread-safe store keyed by normalised email.
pub struct InMemoryCredentialStore {
    records: DashMap<String, CredentialRecord>,
    next_id: AtomicI64,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self
            .records
            .get(&normalize_email(email))
            .map(|r| r.value().clone()))
    }

    async fn insert(&self, credential: NewCredential) -> Result<CredentialRecord, StoreError> {
        let email = normalize_email(&credential.email);
        match self.records.entry(email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(email)),
            Entry::Vacant(slot) => {
                let record = CredentialRecord {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    email,
                    secret: credential.secret,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let email = normalize_email(&record.email);
        match self.records.get_mut(&email) {
            Some(mut existing) if existing.id == record.id => {
                existing.secret = record.secret.clone();
                Ok(())
            }
            _ => Err(StoreError::NotFound(email)),
        }
    }
}
