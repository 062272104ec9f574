//! Action audit log
//!
//! Records which authenticated action was performed, from which client IP.
//! Recording never fails the request that triggered it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::ToSchema;

const CREATE_ACTIONS_TB: &str = r#"
CREATE TABLE IF NOT EXISTS actions_tb (
    id          BIGSERIAL PRIMARY KEY,
    action_date TIMESTAMPTZ NOT NULL,
    action_name TEXT NOT NULL,
    controller  TEXT NOT NULL,
    ip          TEXT NOT NULL
)
"#;

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
pub struct ActionRecord {
    pub id: i64,
    pub action_date: DateTime<Utc>,
    #[schema(example = "Login")]
    pub action_name: String,
    #[schema(example = "Users")]
    pub controller: String,
    #[schema(example = "127.0.0.1")]
    pub ip: String,
}

#[async_trait]
pub trait ActionStore: Send + Sync {
    async fn append(
        &self,
        action_name: &str,
        controller: &str,
        ip: &str,
        at: DateTime<Utc>,
    ) -> Result<ActionRecord, sqlx::Error>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<ActionRecord>, sqlx::Error>;
}

#[derive(Default)]
pub struct InMemoryActionStore {
    records: RwLock<Vec<ActionRecord>>,
}

impl InMemoryActionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActionStore for InMemoryActionStore {
    async fn append(
        &self,
        action_name: &str,
        controller: &str,
        ip: &str,
        at: DateTime<Utc>,
    ) -> Result<ActionRecord, sqlx::Error> {
        let mut records = self.records.write().await;
        let record = ActionRecord {
            id: records.len() as i64 + 1,
            action_date: at,
            action_name: action_name.to_string(),
            controller: controller.to_string(),
            ip: ip.to_string(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ActionRecord>, sqlx::Error> {
        Ok(self.records.read().await.clone())
    }
}

pub struct PgActionStore {
    pool: PgPool,
}

impl PgActionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_ACTIONS_TB).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ActionStore for PgActionStore {
    async fn append(
        &self,
        action_name: &str,
        controller: &str,
        ip: &str,
        at: DateTime<Utc>,
    ) -> Result<ActionRecord, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO actions_tb (action_date, action_name, controller, ip)
               VALUES ($1, $2, $3, $4)
               RETURNING id"#,
        )
        .bind(at)
        .bind(action_name)
        .bind(controller)
        .bind(ip)
        .fetch_one(&self.pool)
        .await?;

        Ok(ActionRecord {
            id,
            action_date: at,
            action_name: action_name.to_string(),
            controller: controller.to_string(),
            ip: ip.to_string(),
        })
    }

    async fn list(&self) -> Result<Vec<ActionRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"SELECT id, action_date, action_name, controller, ip
               FROM actions_tb ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| -> Result<ActionRecord, sqlx::Error> {
                Ok(ActionRecord {
                    id: r.try_get("id")?,
                    action_date: r.try_get("action_date")?,
                    action_name: r.try_get("action_name")?,
                    controller: r.try_get("controller")?,
                    ip: r.try_get("ip")?,
                })
            })
            .collect()
    }
}

/// Front for handlers: timestamps entries and swallows store failures.
#[derive(Clone)]
pub struct ActionsService {
    store: Arc<dyn ActionStore>,
}

impl ActionsService {
    pub fn new(store: Arc<dyn ActionStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, action_name: &str, controller: &str, ip: &str) {
        if let Err(e) = self
            .store
            .append(action_name, controller, ip, Utc::now())
            .await
        {
            tracing::error!(
                action = action_name,
                controller,
                "Failed to record action: {}",
                e
            );
        }
    }

    pub async fn list(&self) -> Result<Vec<ActionRecord>, sqlx::Error> {
        self.store.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    #[async_trait]
    impl ActionStore for FailingStore {
        async fn append(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: DateTime<Utc>,
        ) -> Result<ActionRecord, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }

        async fn list(&self) -> Result<Vec<ActionRecord>, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let service = ActionsService::new(Arc::new(InMemoryActionStore::new()));
        service.record("Register", "Users", "10.0.0.1").await;
        service.record("Login", "Users", "10.0.0.2").await;

        let actions = service.list().await.unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].id, 1);
        assert_eq!(actions[0].action_name, "Register");
        assert_eq!(actions[1].ip, "10.0.0.2");
        assert!(actions[0].action_date <= actions[1].action_date);
    }

    #[tokio::test]
    async fn test_record_swallows_store_errors() {
        let service = ActionsService::new(Arc::new(FailingStore));
        service.record("Login", "Users", "10.0.0.1").await;
        assert!(service.list().await.is_err());
    }
}
