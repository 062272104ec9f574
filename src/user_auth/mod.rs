//! User authentication.
//!
//! ## Components
//! - `hash`: Argon2id salted digests with constant-time verification
//! - `token`: HS256 bearer token issuance and validation
//! - `legacy`: AES-GCM encrypted credentials from the old scheme (read-only)
//! - `service`: Lookup → Verify → Issue orchestration, password change
//! - `error`: Auth error taxonomy and HTTP mapping
//! - `handlers` / `middleware`: axum surface

pub mod error;
pub mod handlers;
pub mod hash;
pub mod legacy;
pub mod middleware;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use hash::{HashEngine, HashError, HashOutput};
pub use legacy::LegacyCipher;
pub use middleware::jwt_auth_middleware;
pub use service::{ChangePasswordRequest, CredentialsRequest, RegisteredUser, UserAuthService};
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer};
