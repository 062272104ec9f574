use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::user_auth::legacy::LegacyCipher;

/// Overrides `auth.jwt_secret` when set.
pub const ENV_JWT_SECRET: &str = "STORE_AUTH_JWT_SECRET";
/// Overrides `auth.encryption_key` when set.
pub const ENV_ENCRYPTION_KEY: &str = "STORE_AUTH_ENCRYPTION_KEY";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("auth.jwt_secret is missing or empty")]
    MissingSigningKey,

    #[error("auth.encryption_key must be 64 hex chars (32 bytes)")]
    InvalidEncryptionKey,

    #[error("auth.token_ttl_days must be a positive number of days within range")]
    InvalidTokenTtl,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; in-memory stores are used when absent
    #[serde(default)]
    pub postgres_url: Option<String>,
    pub auth: AuthConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    /// Hex key for reading legacy encrypted credentials
    #[serde(default)]
    pub encryption_key: Option<String>,
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
    #[serde(default)]
    pub hash: HashConfig,
}

/// Argon2id cost parameters.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

fn default_token_ttl_days() -> i64 {
    crate::user_auth::token::DEFAULT_TTL_DAYS
}

fn default_min_password_len() -> usize {
    6
}

impl AuthConfig {
    /// Config with the given signing key and defaults for everything else.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            encryption_key: None,
            token_ttl_days: default_token_ttl_days(),
            min_password_len: default_min_password_len(),
            hash: HashConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }
        self.token_ttl()?;
        if let Some(key) = &self.encryption_key {
            LegacyCipher::from_hex(key).map_err(|_| ConfigError::InvalidEncryptionKey)?;
        }
        Ok(())
    }

    /// Token lifetime as a duration; rejects non-positive and out-of-range values.
    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        if self.token_ttl_days <= 0 {
            return Err(ConfigError::InvalidTokenTtl);
        }
        chrono::Duration::try_days(self.token_ttl_days).ok_or(ConfigError::InvalidTokenTtl)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var(ENV_JWT_SECRET) {
            self.jwt_secret = secret;
        }
        if let Ok(key) = std::env::var(ENV_ENCRYPTION_KEY) {
            self.encryption_key = Some(key);
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        Self::load_from(format!("config/{}.yaml", env))
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", path.display()))?;
        config.auth.apply_env_overrides();
        config.auth.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    const BASE: &str = r#"
log_level: info
log_dir: ./logs
log_file: store_auth.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8080
"#;

    #[test]
    fn test_load_with_defaults() {
        let file = write_config(&format!("{BASE}auth:\n  jwt_secret: file-secret\n"));
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert!(config.postgres_url.is_none());
        assert_eq!(config.auth.token_ttl_days, 30);
        assert_eq!(config.auth.min_password_len, 6);
        assert_eq!(config.auth.hash, HashConfig::default());
    }

    #[test]
    fn test_load_rejects_empty_secret() {
        // Skipped when the override is set in the test environment.
        if std::env::var(ENV_JWT_SECRET).is_ok() {
            return;
        }
        let file = write_config(&format!("{BASE}auth:\n  jwt_secret: \"\"\n"));
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingSigningKey)
        );
    }

    #[test]
    fn test_load_missing_file() {
        assert!(AppConfig::load_from("/nonexistent/store_auth.yaml").is_err());
    }

    #[test]
    fn test_validate() {
        let mut auth = AuthConfig::with_secret("s");
        assert!(auth.validate().is_ok());

        auth.encryption_key = Some("not-hex".to_string());
        assert_eq!(auth.validate(), Err(ConfigError::InvalidEncryptionKey));

        auth.encryption_key = Some(KEY_HEX.to_string());
        assert!(auth.validate().is_ok());

        auth.token_ttl_days = 0;
        assert_eq!(auth.validate(), Err(ConfigError::InvalidTokenTtl));

        auth.token_ttl_days = i64::MAX;
        assert_eq!(auth.validate(), Err(ConfigError::InvalidTokenTtl));
        auth.token_ttl_days = 1_000_000_000_000_000;
        assert_eq!(auth.token_ttl(), Err(ConfigError::InvalidTokenTtl));

        auth.token_ttl_days = 7;
        assert_eq!(auth.token_ttl(), Ok(chrono::Duration::days(7)));

        assert_eq!(
            AuthConfig::with_secret("  ").validate(),
            Err(ConfigError::MissingSigningKey)
        );
    }
}
