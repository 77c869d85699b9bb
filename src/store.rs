use crate::chat::ChatDocument;
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, Row, SqlitePool};
use std::{path::Path, str::FromStr};

/// Key under which the board document is kept.
pub const CHAT_KEY: &str = "chat.json";

/// A small object store: each key holds one JSON body that is replaced
/// wholesale on every put.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a new Store instance.
    /// This will automatically create the database file if it doesn't exist.
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).context("Failed to create database directory")?;
            }
        }

        let db_url = format!("sqlite://{}", db_path.to_string_lossy());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .log_statements(tracing::log::LevelFilter::Trace);

        let pool = SqlitePool::connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        Ok(Self { pool })
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS objects (
                key TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                updated_at DATETIME NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to initialize database schema")?;

        Ok(())
    }

    /// Fetch the raw body stored under `key`, if any.
    pub async fn get_object(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT body FROM objects WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read object {}", key))?;

        match row {
            Some(row) => Ok(Some(row.try_get("body")?)),
            None => Ok(None),
        }
    }

    /// Store `body` under `key`, replacing whatever was there.
    pub async fn put_object(&self, key: &str, body: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO objects (key, body, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write object {}", key))?;

        Ok(())
    }

    /// Load the board, or an empty one if it has never been written.
    pub async fn load_chat(&self) -> Result<ChatDocument> {
        match self.get_object(CHAT_KEY).await? {
            Some(body) => serde_json::from_str(&body).context("Failed to parse chat document"),
            None => Ok(ChatDocument::default()),
        }
    }

    /// Overwrite the board. There is no version check: concurrent writers
    /// race and the last one wins.
    pub async fn save_chat(&self, chat: &ChatDocument) -> Result<()> {
        let body = serde_json::to_string(chat).context("Failed to serialize chat document")?;
        self.put_object(CHAT_KEY, &body).await
    }
}
