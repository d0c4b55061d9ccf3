pub mod models;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Keys of the durable records the bot keeps.
pub mod keys {
    pub const TRACKS: &str = "tracks";
    pub const TOPICS: &str = "topics";
    pub const USED_TOPICS: &str = "used_topics";
    pub const ANALYTICS: &str = "analytics";
}

/// Durable key -> JSON association. Reads of a key that was never written
/// return `None`.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>>;
    async fn set(&self, key: &str, value: serde_json::Value) -> anyhow::Result<()>;
}

/// Read and decode a record.
pub async fn load<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> anyhow::Result<Option<T>> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Encode and write a record.
pub async fn save<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> anyhow::Result<()> {
    store.set(key, serde_json::to_value(value)?).await
}

#[derive(Debug, Clone)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_entry(&self, key: &str) -> anyhow::Result<Option<models::KvEntry>> {
        let entry = sqlx::query_as::<_, models::KvEntry>(
            "SELECT key, value, updated_at FROM kv_store WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }
}

#[async_trait]
impl KvStore for Database {
    async fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let entry = self.get_entry(key).await?;
        if let Some(e) = &entry {
            tracing::debug!("Read '{}' (last written {})", e.key, e.updated_at);
        }
        Ok(entry.map(|e| e.value))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
