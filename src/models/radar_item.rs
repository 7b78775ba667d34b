//! Radar item model and database operations

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

/// Max records per `IN (...)` clause (`SQLite` variable limit: 999)
const BATCH_UPDATE_SIZE: usize = 500;

/// A link collected for the next radar issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RadarItem {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub archived: bool,
    pub created_at: String,
}

/// Fields accepted when creating an item.
#[derive(Clone, Debug, Deserialize)]
pub struct NewRadarItem {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl NewRadarItem {
    /// Title to store: the given one, or the URL itself when blank.
    #[must_use]
    pub fn display_title(&self) -> &str {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => &self.url,
        }
    }
}

impl RadarItem {
    /// Inserts a new item and returns it.
    pub async fn save(new_item: &NewRadarItem, db_pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let item: Self = sqlx::query_as(
            "INSERT INTO radar_items (url, title, archived, created_at, updated_at)
             VALUES (?, ?, 0, datetime('now'), datetime('now'))
             RETURNING id, url, title, archived, created_at",
        )
        .bind(new_item.url.trim())
        .bind(new_item.display_title())
        .fetch_one(db_pool)
        .await?;

        debug!("Saved radar item {}: {}", item.id, item.url);
        Ok(item)
    }

    /// Returns all items not yet published, oldest first.
    pub async fn list_open(db_pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, url, title, archived, created_at
             FROM radar_items
             WHERE archived = 0
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(db_pool)
        .await
    }

    /// Finds an item by id.
    pub async fn find(db_pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, url, title, archived, created_at FROM radar_items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(db_pool)
        .await
    }

    /// Marks the given items as published. Returns the number of rows touched.
    pub async fn archive(db_pool: &SqlitePool, ids: &[i64]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut affected = 0;
        let mut tx = db_pool.begin().await?;

        for chunk in ids.chunks(BATCH_UPDATE_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!(
                "UPDATE radar_items SET archived = 1, updated_at = datetime('now') WHERE id IN ({placeholders})"
            );

            let mut query = sqlx::query(&sql);
            for id in chunk {
                query = query.bind(*id);
            }
            affected += query.execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        debug!("Archived {affected} radar items");
        Ok(affected)
    }

    /// Deletes an item. Returns `false` when nothing matched.
    pub async fn delete(db_pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM radar_items WHERE id = ?")
            .bind(id)
            .execute(db_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
