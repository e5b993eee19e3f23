// Shelter Admin - Administrative core for an animal-shelter platform
// Copyright (C) 2025 Shelter Admin Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Local SQLite storage
//!
//! Holds the session token and the last list fetched for each screen, so a
//! screen can still show data when the backend is unreachable.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::session::{TokenStore, TOKEN_KEY};

/// Cache manager for local data storage
pub struct CacheManager {
    pool: SqlitePool,
}

impl CacheManager {
    /// Open the cache at its default location
    pub async fn new() -> Result<Self, ApiError> {
        Self::open(&get_db_path()).await
    }

    pub async fn open(db_path: &Path) -> Result<Self, ApiError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ApiError::Cache(format!("{}: {e}", parent.display())))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        info!("Opening cache database at {}", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        let manager = Self { pool };
        manager.init_schema().await?;

        Ok(manager)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        debug!("Initializing cache schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS records (
                kind TEXT NOT NULL,
                id TEXT NOT NULL,
                position INTEGER NOT NULL,
                data TEXT NOT NULL,
                cached_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (kind, id)
            );

            CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind, position);
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Cache schema initialized");

        Ok(())
    }

    /// Drop list snapshots older than `max_age_days`
    pub async fn cleanup(&self, max_age_days: u32) -> Result<u64, ApiError> {
        let result = sqlx::query(
            r#"
            DELETE FROM records
            WHERE cached_at < datetime('now', '-' || ? || ' days')
            "#,
        )
        .bind(max_age_days)
        .execute(&self.pool)
        .await?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            info!("Cleaned up {} old cached records", deleted);
        }

        Ok(deleted)
    }

    // ===== LIST SNAPSHOTS =====

    /// Replace the snapshot of a screen with `rows`, keeping their order
    pub async fn save_records<R: Serialize>(
        &self,
        kind: &str,
        rows: &[(String, R)],
    ) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM records WHERE kind = ?")
            .bind(kind)
            .execute(&mut *tx)
            .await?;

        for (position, (id, row)) in rows.iter().enumerate() {
            let data = serde_json::to_string(row)?;
            sqlx::query(
                r#"
                INSERT INTO records (kind, id, position, data, cached_at)
                VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
                ON CONFLICT(kind, id) DO UPDATE SET
                    position = excluded.position,
                    data = excluded.data,
                    cached_at = CURRENT_TIMESTAMP
                "#,
            )
            .bind(kind)
            .bind(id)
            .bind(position as i64)
            .bind(&data)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Cached {} {} records", rows.len(), kind);
        Ok(())
    }

    /// Last snapshot of a screen. Rows that no longer decode are skipped.
    pub async fn load_records<R: DeserializeOwned>(&self, kind: &str) -> Result<Vec<R>, ApiError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT id, data FROM records WHERE kind = ? ORDER BY position")
                .bind(kind)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, data)| match serde_json::from_str(&data) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!("Dropping unreadable cached {} record {}: {}", kind, id, e);
                    None
                }
            })
            .collect())
    }

    pub async fn clear_records(&self) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM records").execute(&self.pool).await?;
        Ok(())
    }

    // ===== SETTINGS CRUD METHODS =====

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, ApiError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM settings WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(v,)| v))
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!("Set setting {}", key);
        Ok(())
    }

    pub async fn delete_setting(&self, key: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl TokenStore for CacheManager {
    async fn load(&self) -> Result<Option<String>, ApiError> {
        self.get_setting(TOKEN_KEY).await
    }

    async fn save(&self, token: &str) -> Result<(), ApiError> {
        self.set_setting(TOKEN_KEY, token).await
    }

    async fn clear(&self) -> Result<(), ApiError> {
        self.delete_setting(TOKEN_KEY).await
    }
}

/// Get the database file path
fn get_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ShelterAdmin")
        .join("cache.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        name: String,
    }

    async fn open_temp() -> (tempfile::TempDir, CacheManager) {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::open(&dir.path().join("nested").join("cache.db"))
            .await
            .unwrap();
        (dir, cache)
    }

    fn rows(names: &[&str]) -> Vec<(String, Row)> {
        names
            .iter()
            .map(|n| (n.to_string(), Row { name: n.to_string() }))
            .collect()
    }

    #[tokio::test]
    async fn token_round_trip() {
        let (_dir, cache) = open_temp().await;
        assert_eq!(cache.current().await.unwrap(), None);

        cache.save("tok").await.unwrap();
        assert_eq!(cache.get_setting(TOKEN_KEY).await.unwrap().as_deref(), Some("tok"));
        cache.save("tok-2").await.unwrap();
        assert_eq!(cache.current().await.unwrap().as_deref(), Some("tok-2"));

        cache.clear().await.unwrap();
        assert_eq!(cache.get_setting(TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn snapshot_replaces_previous() {
        let (_dir, cache) = open_temp().await;
        cache.save_records("reports", &rows(&["b", "a", "c"])).await.unwrap();
        cache.save_records("animals", &rows(&["x"])).await.unwrap();

        let loaded: Vec<Row> = cache.load_records("reports").await.unwrap();
        let names: Vec<_> = loaded.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);

        cache.save_records("reports", &rows(&["z"])).await.unwrap();
        let loaded: Vec<Row> = cache.load_records("reports").await.unwrap();
        assert_eq!(loaded, vec![Row { name: "z".into() }]);

        let other: Vec<Row> = cache.load_records("animals").await.unwrap();
        assert_eq!(other.len(), 1);
    }

    #[tokio::test]
    async fn cleanup_drops_stale_snapshots() {
        let (_dir, cache) = open_temp().await;
        cache.save_records("reports", &rows(&["old", "new"])).await.unwrap();
        sqlx::query("UPDATE records SET cached_at = datetime('now', '-30 days') WHERE id = 'old'")
            .execute(&cache.pool)
            .await
            .unwrap();

        assert_eq!(cache.cleanup(7).await.unwrap(), 1);
        let left: Vec<Row> = cache.load_records("reports").await.unwrap();
        assert_eq!(left, vec![Row { name: "new".into() }]);
    }

    #[tokio::test]
    async fn unreadable_rows_are_skipped() {
        let (_dir, cache) = open_temp().await;
        cache.save_records("reports", &rows(&["ok"])).await.unwrap();
        sqlx::query("INSERT INTO records (kind, id, position, data) VALUES ('reports', 'bad', 1, '{')")
            .execute(&cache.pool)
            .await
            .unwrap();

        let loaded: Vec<Row> = cache.load_records("reports").await.unwrap();
        assert_eq!(loaded.len(), 1);
    }
}
