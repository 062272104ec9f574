//! End-to-end credential scenarios against the in-memory store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use store_auth::config::{AuthConfig, HashConfig};
use store_auth::credential::{CredentialStore, InMemoryCredentialStore, PasswordSecret};
use store_auth::user_auth::{AuthError, TokenError, TokenIssuer, UserAuthService};

fn light_config(secret: &str) -> AuthConfig {
    let mut config = AuthConfig::with_secret(secret);
    config.hash = HashConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };
    config
}

fn setup() -> (UserAuthService, Arc<InMemoryCredentialStore>) {
    let store = Arc::new(InMemoryCredentialStore::new());
    let service = UserAuthService::new(store.clone(), &light_config("scenario-secret")).unwrap();
    (service, store)
}

#[tokio::test]
async fn register_then_login() {
    let (service, _) = setup();
    service.register("a@x.com", "Secret1").await.unwrap();

    let issued = service.login("a@x.com", "Secret1").await.unwrap();
    assert_eq!(issued.email, "a@x.com");
    assert!(!issued.token.is_empty());

    let rejected = service.login("a@x.com", "Secret2").await;
    assert!(matches!(rejected, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn change_password_with_correct_current() {
    let (service, _) = setup();
    service.register("a@x.com", "Secret1").await.unwrap();

    service
        .change_password("a@x.com", "Secret1", "Secret2")
        .await
        .unwrap();

    assert!(matches!(
        service.login("a@x.com", "Secret1").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(service.login("a@x.com", "Secret2").await.is_ok());
}

#[tokio::test]
async fn change_password_with_wrong_current_leaves_record() {
    let (service, store) = setup();
    service.register("a@x.com", "Secret1").await.unwrap();
    let before = store.find_by_email("a@x.com").await.unwrap().unwrap();

    let result = service
        .change_password("a@x.com", "WrongOne", "Secret2")
        .await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));

    let after = store.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(before, after);
    assert!(service.check_credentials("a@x.com", "Secret1").await.is_ok());
}

#[tokio::test]
async fn stored_secret_is_salted_digest() {
    let (service, store) = setup();
    service.register("a@x.com", "Secret1").await.unwrap();
    service.register("b@x.com", "Secret1").await.unwrap();

    let a = store.find_by_email("a@x.com").await.unwrap().unwrap();
    let b = store.find_by_email("b@x.com").await.unwrap().unwrap();
    match (a.secret, b.secret) {
        (
            PasswordSecret::Hashed {
                digest: da,
                salt: sa,
            },
            PasswordSecret::Hashed {
                digest: db,
                salt: sb,
            },
        ) => {
            assert_ne!(sa, sb, "each record gets its own salt");
            assert_ne!(da, db, "same password, different digests");
            assert_ne!(da.as_slice(), b"Secret1".as_slice());
        }
        other => panic!("expected hashed secrets, got {:?}", other),
    }
}

#[tokio::test]
async fn token_bound_to_signing_key() {
    let (service, _) = setup();
    service.register("a@x.com", "Secret1").await.unwrap();
    let issued = service.login("a@x.com", "Secret1").await.unwrap();

    assert!(service.verify_token(&issued.token).is_ok());

    let store = Arc::new(InMemoryCredentialStore::new());
    let other = UserAuthService::new(store, &light_config("another-secret")).unwrap();
    assert!(matches!(
        other.verify_token(&issued.token),
        Err(AuthError::InvalidToken)
    ));
}

#[tokio::test]
async fn token_expires_after_thirty_days() {
    let (service, _) = setup();
    let issuer: &TokenIssuer = service.token_issuer();
    assert_eq!(issuer.ttl(), Duration::days(30));

    let now = Utc::now();
    let issued = issuer.issue_at("a@x.com", now).unwrap();
    assert!(issuer.validate_at(&issued.token, now + Duration::days(29)).is_ok());
    assert_eq!(
        issuer.validate_at(&issued.token, now + Duration::days(30)),
        Err(TokenError::Expired)
    );
}

#[tokio::test]
async fn concurrent_password_changes_last_writer_wins() {
    let (service, _) = setup();
    let service = Arc::new(service);
    service.register("a@x.com", "Secret1").await.unwrap();

    let s1 = service.clone();
    let s2 = service.clone();
    let (r1, r2) = tokio::join!(
        async move { s1.change_password("a@x.com", "Secret1", "SecretA").await },
        async move { s2.change_password("a@x.com", "Secret1", "SecretB").await },
    );
    // At least one wins; the record ends on exactly one of the new passwords.
    assert!(r1.is_ok() || r2.is_ok());
    let a_ok = service.login("a@x.com", "SecretA").await.is_ok();
    let b_ok = service.login("a@x.com", "SecretB").await.is_ok();
    assert!(a_ok ^ b_ok);
}
