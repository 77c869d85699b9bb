use anyhow::{Context, Result};
use chrono::FixedOffset;
use std::{env, path::PathBuf};

/// Username/password pair every request must present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub db_path: PathBuf,
    pub bind_addr: String,
    /// Offset applied when rendering message timestamps.
    pub display_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let username = get("CHAT_USERNAME").context("CHAT_USERNAME is not set")?;
        let password = get("CHAT_PASSWORD").context("CHAT_PASSWORD is not set")?;

        // We default to ~/.chatboard/chat.db
        let db_path = match get("CHAT_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => {
                let home_dir = get("HOME").unwrap_or_else(|| ".".into());
                PathBuf::from(home_dir).join(".chatboard").join("chat.db")
            }
        };

        let bind_addr = get("CHAT_BIND").unwrap_or_else(|| "0.0.0.0:3000".into());

        let offset_minutes: i32 = match get("CHAT_DISPLAY_OFFSET_MINUTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid CHAT_DISPLAY_OFFSET_MINUTES: {}", raw))?,
            None => 0,
        };
        let display_offset = FixedOffset::east_opt(offset_minutes * 60)
            .with_context(|| format!("UTC offset out of range: {} minutes", offset_minutes))?;

        Ok(Self {
            credentials: Credentials { username, password },
            db_path,
            bind_addr,
            display_offset,
        })
    }
}
