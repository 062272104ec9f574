//! Store Auth - credential verification and token issuance
//!
//! Authentication core of the store catalog admin API.
//!
//! # Modules
//!
//! - [`user_auth`] - Hash Engine, Token Issuer, Auth Service and HTTP handlers
//! - [`credential`] - Credential Store trait with in-memory and PostgreSQL backends
//! - [`audit`] - Action log of authenticated operations
//! - [`gateway`] - axum router, shared state, OpenAPI docs
//! - [`config`] - YAML configuration with env overrides for secrets
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - PostgreSQL pool

pub mod audit;
pub mod config;
pub mod credential;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod user_auth;

// Convenient re-exports at crate root
pub use audit::{ActionRecord, ActionStore, ActionsService, InMemoryActionStore, PgActionStore};
pub use config::{AppConfig, AuthConfig, ConfigError};
pub use credential::{
    CredentialRecord, CredentialStore, InMemoryCredentialStore, NewCredential, PasswordSecret,
    PgCredentialStore, StoreError,
};
pub use gateway::state::AppState;
pub use user_auth::{AuthError, Claims, HashEngine, IssuedToken, TokenIssuer, UserAuthService};
