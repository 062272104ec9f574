use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::ValidateEmail;

use super::error::AuthError;
use super::hash::{HashEngine, SALT_LEN};
use super::legacy::LegacyCipher;
use super::token::{Claims, IssuedToken, TokenIssuer};
use crate::config::AuthConfig;
use crate::credential::{
    CredentialRecord, CredentialStore, NewCredential, PasswordSecret, normalize_email,
};

/// Salt for the decoy hash run when an email is unknown.
const DECOY_SALT: [u8; SALT_LEN] = [0x5a; SALT_LEN];

/// Email + password body shared by register, check and login
#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "Secret1")]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "Secret1")]
    pub password: String,
    #[schema(example = "Secret2")]
    pub new_password: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, ToSchema)]
pub struct RegisteredUser {
    pub id: i64,
    #[schema(example = "a@x.com")]
    pub email: String,
}

pub struct UserAuthService {
    store: Arc<dyn CredentialStore>,
    hasher: HashEngine,
    tokens: TokenIssuer,
    legacy: Option<LegacyCipher>,
    min_password_len: usize,
}

impl UserAuthService {
    pub fn new(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;

        let hasher = HashEngine::with_params(
            config.hash.memory_kib,
            config.hash.iterations,
            config.hash.parallelism,
        )?;
        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl()?)?;
        let legacy = config
            .encryption_key
            .as_deref()
            .map(LegacyCipher::from_hex)
            .transpose()
            .map_err(|e| AuthError::Configuration(e.to_string()))?;

        Ok(Self {
            store,
            hasher,
            tokens,
            legacy,
            min_password_len: config.min_password_len,
        })
    }

    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a new user with a freshly salted digest
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisteredUser, AuthError> {
        let email = normalize_email(email);
        if !email.validate_email() {
            return Err(AuthError::InvalidInput("invalid email".to_string()));
        }
        self.check_password_policy(password)?;

        let hashed = self.hasher.hash(password.as_bytes(), None)?;
        let record = self
            .store
            .insert(NewCredential {
                email,
                secret: PasswordSecret::Hashed {
                    digest: hashed.digest,
                    salt: hashed.salt,
                },
            })
            .await?;

        tracing::info!(user_id = record.id, email = %record.email, "User registered");
        Ok(RegisteredUser {
            id: record.id,
            email: record.email,
        })
    }

    /// Verify credentials without issuing a token
    pub async fn check_credentials(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.authenticate(email, password).await.map(|_| ())
    }

    /// Login user and issue JWT
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let record = self.authenticate(email, password).await?;
        let issued = self.tokens.issue(&record.email)?;
        tracing::info!(user_id = record.id, email = %record.email, "Token issued");
        Ok(issued)
    }

    /// Issue a fresh token for an already authenticated subject
    pub async fn renew(&self, email: &str) -> Result<IssuedToken, AuthError> {
        let record = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(self.tokens.issue(&record.email)?)
    }

    /// Replace the password after verifying the current one.
    ///
    /// Digest and salt are written in a single store update; concurrent
    /// changes for the same user are last-writer-wins.
    pub async fn change_password(
        &self,
        email: &str,
        current: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let mut record = self.authenticate(email, current).await?;
        self.check_password_policy(new_password)?;

        let hashed = self.hasher.hash(new_password.as_bytes(), None)?;
        record.secret = PasswordSecret::Hashed {
            digest: hashed.digest,
            salt: hashed.salt,
        };
        self.store.update(&record).await?;

        tracing::info!(user_id = record.id, "Password changed");
        Ok(())
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(self.tokens.validate(token)?)
    }

    fn check_password_policy(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_password_len {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {} characters",
                self.min_password_len
            )));
        }
        Ok(())
    }

    /// Lookup then verify. Unknown email and wrong password are the same error.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CredentialRecord, AuthError> {
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(record) = self.store.find_by_email(email).await? else {
            let _ = self.hasher.hash(password.as_bytes(), Some(&DECOY_SALT));
            tracing::warn!(email = %normalize_email(email), "Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let verified = match &record.secret {
            PasswordSecret::Hashed { digest, salt } => self
                .hasher
                .verify(password.as_bytes(), salt, digest)
                .map_err(|e| AuthError::Internal(format!("record {}: {}", record.id, e)))?,
            PasswordSecret::LegacyEncrypted { ciphertext } => {
                return self.authenticate_legacy(record.clone(), password, ciphertext).await;
            }
        };

        if !verified {
            tracing::warn!(email = %record.email, "Login rejected: bad password");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(record)
    }

    /// Verify a legacy encrypted record and migrate it to a salted digest.
    async fn authenticate_legacy(
        &self,
        mut record: CredentialRecord,
        password: &str,
        ciphertext: &[u8],
    ) -> Result<CredentialRecord, AuthError> {
        let Some(cipher) = &self.legacy else {
            tracing::warn!(
                user_id = record.id,
                "Legacy credential but no encryption key configured"
            );
            return Err(AuthError::InvalidCredentials);
        };

        match cipher.matches(password.as_bytes(), ciphertext) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(email = %record.email, "Login rejected: bad password");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                tracing::warn!(user_id = record.id, "Legacy credential unreadable: {}", e);
                return Err(AuthError::InvalidCredentials);
            }
        }

        let hashed = self.hasher.hash(password.as_bytes(), None)?;
        record.secret = PasswordSecret::Hashed {
            digest: hashed.digest,
            salt: hashed.salt,
        };
        self.store.update(&record).await?;
        tracing::info!(user_id = record.id, "Legacy credential migrated to salted hash");
        Ok(record)
    }
}
