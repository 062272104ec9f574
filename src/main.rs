//! Store Auth - gateway entry point
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌──────────┐    ┌──────────┐
//! │  Config  │───▶│ Credential │───▶│   Auth   │───▶│ Gateway  │
//! │  (YAML)  │    │ Store      │    │ Service  │    │ (axum)   │
//! └──────────┘    └────────────┘    └──────────┘    └──────────┘
//! ```
//!
//! Usage: `store_auth [--env dev] [--port 8080]`

use std::sync::Arc;

use store_auth::audit::{ActionStore, ActionsService, InMemoryActionStore, PgActionStore};
use store_auth::config::AppConfig;
use store_auth::credential::{CredentialStore, InMemoryCredentialStore, PgCredentialStore};
use store_auth::db::Database;
use store_auth::gateway::{self, state::AppState};
use store_auth::user_auth::UserAuthService;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = store_auth::logging::init_logging(&app_config);

    tracing::info!("Starting Store Auth in {} mode", env);

    let (pg_db, credentials, actions) = match app_config.postgres_url.as_deref() {
        Some(url) => {
            let db = Arc::new(Database::connect(url).await?);
            let credentials = PgCredentialStore::new(db.pool().clone());
            credentials.init_schema().await?;
            let actions = PgActionStore::new(db.pool().clone());
            actions.init_schema().await?;
            (
                Some(db),
                Arc::new(credentials) as Arc<dyn CredentialStore>,
                Arc::new(actions) as Arc<dyn ActionStore>,
            )
        }
        None => {
            tracing::warn!("postgres_url not set: using in-memory stores, data is lost on exit");
            (
                None,
                Arc::new(InMemoryCredentialStore::new()) as Arc<dyn CredentialStore>,
                Arc::new(InMemoryActionStore::new()) as Arc<dyn ActionStore>,
            )
        }
    };

    let user_auth = match UserAuthService::new(credentials, &app_config.auth) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!("Auth service misconfigured: {}", e);
            return Err(e.into());
        }
    };

    let state = Arc::new(AppState::new(
        user_auth,
        ActionsService::new(actions),
        pg_db,
    ));

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(&app_config.gateway.host, port, state).await
}
