//! # PostgreSQL item store
//!
//! Items are stored as JSONB documents. The columns next to the document
//! exist for the sweep query (`status`, `verification_deadline`), ordering
//! (`created_at`) and the version check on save.

use async_trait::async_trait;
use domains::{Item, ItemFilter, ItemId, ItemRepository, StoreError};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use crate::memory::sort_newest_first;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id                    UUID PRIMARY KEY,
    status                TEXT NOT NULL,
    verification_deadline TIMESTAMPTZ,
    created_at            TIMESTAMPTZ NOT NULL,
    version               BIGINT NOT NULL,
    doc                   JSONB NOT NULL
)"#;

const SWEEP_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS items_status_deadline_idx
    ON items (status, verification_deadline)"#;

pub struct PgItemRepository {
    pool: PgPool,
}

fn backend(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn decode(row: &sqlx::postgres::PgRow) -> Result<Item, StoreError> {
    let doc: serde_json::Value = row.try_get("doc").map_err(backend)?;
    let version: i64 = row.try_get("version").map_err(backend)?;
    let mut item: Item = serde_json::from_value(doc).map_err(backend)?;
    item.version = u64::try_from(version).map_err(backend)?;
    item.check_invariants().map_err(backend)?;
    Ok(item)
}

impl PgItemRepository {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(backend)?;
        let repo = Self { pool };
        repo.migrate().await?;
        info!("connected to postgres item store");
        Ok(repo)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the table and the sweep index if they are missing.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await.map_err(backend)?;
        sqlx::query(SWEEP_INDEX).execute(&self.pool).await.map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query("SELECT doc, version FROM items WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(decode).transpose()
    }

    async fn find(&self, filter: &ItemFilter) -> Result<Vec<Item>, StoreError> {
        let statuses: Option<Vec<String>> = (!filter.statuses.is_empty())
            .then(|| filter.statuses.iter().map(|s| s.as_str().to_string()).collect());
        // Text search runs over the decoded documents, so the SQL limit only
        // applies when there is none.
        let sql_limit = match filter.search {
            Some(_) => None,
            None => filter.limit.map(|l| l as i64),
        };

        let rows = sqlx::query(
            "SELECT doc, version FROM items \
             WHERE ($1::text[] IS NULL OR status = ANY($1)) \
               AND ($2::timestamptz IS NULL OR verification_deadline < $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3",
        )
        .bind(statuses)
        .bind(filter.deadline_before)
        .bind(sql_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut items = rows.iter().map(decode).collect::<Result<Vec<_>, _>>()?;
        if filter.search.is_some() {
            items.retain(|item| filter.matches(item));
            sort_newest_first(&mut items);
            if let Some(limit) = filter.limit {
                items.truncate(limit);
            }
        }
        debug!(count = items.len(), "items fetched");
        Ok(items)
    }

    async fn save(&self, item: &Item) -> Result<Item, StoreError> {
        let mut stored = item.clone();
        stored.version = item.version + 1;
        let doc = serde_json::to_value(&stored).map_err(backend)?;
        let new_version = i64::try_from(stored.version).map_err(backend)?;

        let result = if item.version == 0 {
            sqlx::query(
                "INSERT INTO items (id, status, verification_deadline, created_at, version, doc) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(stored.id.as_uuid())
            .bind(stored.status().as_str())
            .bind(stored.verification_deadline())
            .bind(stored.created_at())
            .bind(new_version)
            .bind(doc)
            .execute(&self.pool)
            .await
            .map_err(backend)?
        } else {
            sqlx::query(
                "UPDATE items \
                 SET status = $2, verification_deadline = $3, version = $4, doc = $5 \
                 WHERE id = $1 AND version = $6",
            )
            .bind(stored.id.as_uuid())
            .bind(stored.status().as_str())
            .bind(stored.verification_deadline())
            .bind(new_version)
            .bind(doc)
            .bind(new_version - 1)
            .execute(&self.pool)
            .await
            .map_err(backend)?
        };

        if result.rows_affected() == 0 {
            return Err(StoreError::VersionConflict {
                id: item.id,
                expected: item.version,
            });
        }
        Ok(stored)
    }

    async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}
