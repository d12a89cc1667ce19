//! Whitelist repository: the set of chats the bot serves, kept in SQLite.
//!
//! Seed chats are written only the first time a database is opened. After that the stored set
//! is authoritative, so an admin's `/del_whitelist` is not undone by the next restart.

use crate::error::StorageError;
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use dbot_core::{ChatId, Result, Whitelist};
use tracing::info;

const SEEDED_KEY: &str = "whitelist_seeded";

#[derive(Clone)]
pub struct WhitelistRepository {
    pool_manager: SqlitePoolManager,
}

impl WhitelistRepository {
    /// Opens (or creates) the store at `database_path`. `seed` is inserted only if this database
    /// has never been seeded before.
    pub async fn new(database_path: &str, seed: &[ChatId]) -> std::result::Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_path).await?;
        let repo = Self { pool_manager };
        repo.init(seed).await?;
        Ok(repo)
    }

    async fn init(&self, seed: &[ChatId]) -> std::result::Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query("CREATE TABLE IF NOT EXISTS whitelist (chat_id INTEGER PRIMARY KEY)")
            .execute(pool)
            .await?;
        sqlx::query("CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .execute(pool)
            .await?;

        let mut tx = pool.begin().await?;
        let seeded = sqlx::query("INSERT OR IGNORE INTO meta (key, value) VALUES (?, '1')")
            .bind(SEEDED_KEY)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            == 1;
        if seeded {
            for chat in seed {
                sqlx::query("INSERT OR IGNORE INTO whitelist (chat_id) VALUES (?)")
                    .bind(chat.0)
                    .execute(&mut *tx)
                    .await?;
            }
            info!(seed = ?seed, "Whitelist seeded");
        }
        tx.commit().await?;
        Ok(())
    }

    /// Closes the underlying pool; used at shutdown and by tests that reopen the file.
    pub async fn close(&self) {
        self.pool_manager.close().await;
    }
}

#[async_trait]
impl Whitelist for WhitelistRepository {
    async fn is_authorized(&self, chat: ChatId) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT chat_id FROM whitelist WHERE chat_id = ?")
            .bind(chat.0)
            .fetch_optional(self.pool_manager.pool())
            .await
            .map_err(StorageError::from)?;
        Ok(row.is_some())
    }

    async fn add(&self, chat: ChatId) -> Result<bool> {
        let added = sqlx::query("INSERT OR IGNORE INTO whitelist (chat_id) VALUES (?)")
            .bind(chat.0)
            .execute(self.pool_manager.pool())
            .await
            .map_err(StorageError::from)?
            .rows_affected()
            == 1;
        Ok(added)
    }

    async fn remove(&self, chat: ChatId) -> Result<bool> {
        let removed = sqlx::query("DELETE FROM whitelist WHERE chat_id = ?")
            .bind(chat.0)
            .execute(self.pool_manager.pool())
            .await
            .map_err(StorageError::from)?
            .rows_affected()
            == 1;
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<ChatId>> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT chat_id FROM whitelist ORDER BY chat_id")
            .fetch_all(self.pool_manager.pool())
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|(id,)| ChatId(id)).collect())
    }
}
