/// SQLite-backed durable chat store.
///
/// One row per user holds the indented live code, the display log as a JSON
/// object (keys in insertion order), and the attempt counter. Every write
/// replaces the stored value; concurrent writers for the same user race and
/// the last one wins.
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info};

use appify_core::{ChatStore, MessageLog, UserId};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS users (
         user_id         INTEGER PRIMARY KEY,
         code            TEXT,
         message_history TEXT,
         tries           INTEGER NOT NULL DEFAULT 0
     );";

pub struct SqliteChatStore {
    conn: Mutex<Connection>,
}

impl SqliteChatStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).context("Failed to open SQLite chat database")?;
        conn.execute_batch(&format!("PRAGMA journal_mode=WAL;\n{SCHEMA}"))
            .context("Failed to initialize users schema")?;

        info!("[Store] SqliteChatStore opened at {:?}", path.as_ref());
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

#[async_trait]
impl ChatStore for SqliteChatStore {
    async fn get_code(&self, user: UserId) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let code: Option<Option<String>> = conn
            .query_row("SELECT code FROM users WHERE user_id = ?1", params![user], |row| row.get(0))
            .optional()
            .context("Failed to read code")?;
        Ok(code.flatten())
    }

    async fn set_code(&self, user: UserId, code: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO users (user_id, code) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET code = excluded.code",
            params![user, code],
        )
        .context("Failed to write code")?;
        debug!(user_id = user, "[Store] Saved code");
        Ok(())
    }

    async fn get_message_history(&self, user: UserId) -> Result<MessageLog> {
        let conn = self.conn.lock().await;
        let raw: Option<Option<String>> = conn
            .query_row(
                "SELECT message_history FROM users WHERE user_id = ?1",
                params![user],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read message history")?;

        match raw.flatten() {
            Some(json) if !json.trim().is_empty() => serde_json::from_str(&json)
                .with_context(|| format!("Corrupt message history for user {user}")),
            _ => Ok(MessageLog::new()),
        }
    }

    async fn set_message_history(&self, user: UserId, log: &MessageLog) -> Result<()> {
        let json = serde_json::to_string(log)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO users (user_id, message_history) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET message_history = excluded.message_history",
            params![user, json],
        )
        .context("Failed to write message history")?;
        debug!(user_id = user, messages = log.len(), "[Store] Saved message history");
        Ok(())
    }

    async fn get_tries(&self, user: UserId) -> Result<u32> {
        let conn = self.conn.lock().await;
        let tries: Option<u32> = conn
            .query_row("SELECT tries FROM users WHERE user_id = ?1", params![user], |row| row.get(0))
            .optional()
            .context("Failed to read tries")?;
        Ok(tries.unwrap_or(0))
    }

    async fn increment_tries(&self, user: UserId) -> Result<u32> {
        let conn = self.conn.lock().await;
        let tries: u32 = conn
            .query_row(
                "INSERT INTO users (user_id, tries) VALUES (?1, 1)
                 ON CONFLICT(user_id) DO UPDATE SET tries = tries + 1
                 RETURNING tries",
                params![user],
                |row| row.get(0),
            )
            .context("Failed to increment tries")?;
        debug!(user_id = user, tries, "[Store] Incremented tries");
        Ok(tries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appify_core::ChatRole;

    #[tokio::test]
    async fn test_unknown_user_defaults() {
        let store = SqliteChatStore::in_memory().expect("in-memory db");
        assert!(store.get_code(42).await.unwrap().is_none());
        assert!(store.get_message_history(42).await.unwrap().is_empty());
        assert_eq!(store.get_tries(42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fields_update_independently() {
        let store = SqliteChatStore::in_memory().unwrap();
        store.set_code(1, "        st.title('x')").await.unwrap();
        assert_eq!(store.increment_tries(1).await.unwrap(), 1);

        let mut log = MessageLog::seeded("hello");
        log.push(ChatRole::User, "add a button");
        store.set_message_history(1, &log).await.unwrap();

        assert_eq!(store.get_code(1).await.unwrap().as_deref(), Some("        st.title('x')"));
        assert_eq!(store.get_tries(1).await.unwrap(), 1);
        assert_eq!(store.get_message_history(1).await.unwrap(), log);
    }

    #[tokio::test]
    async fn test_increment_tries_counts_up() {
        let store = SqliteChatStore::in_memory().unwrap();
        for expected in 1..=5 {
            assert_eq!(store.increment_tries(9).await.unwrap(), expected);
        }
        assert_eq!(store.get_tries(9).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appify.db");
        {
            let store = SqliteChatStore::open(&path).unwrap();
            store.set_code(5, "        pass").await.unwrap();
            store.increment_tries(5).await.unwrap();
        }
        let store = SqliteChatStore::open(&path).unwrap();
        assert_eq!(store.get_code(5).await.unwrap().as_deref(), Some("        pass"));
        assert_eq!(store.get_tries(5).await.unwrap(), 1);
    }
}
