// src/repositories/preference_repository.rs

use std::sync::Arc;

use rusqlite::{params, OptionalExtension};

use crate::db::ConnectionPool;
use crate::error::AppResult;

const LAST_EMAIL_KEY: &str = "last_email";

pub trait PreferenceRepository: Send + Sync {
    fn last_email(&self) -> AppResult<Option<String>>;
    fn set_last_email(&self, email: &str) -> AppResult<()>;
}

pub struct SqlitePreferenceRepository {
    pool: Arc<ConnectionPool>,
}

impl SqlitePreferenceRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.pool.get()?;
        let value = conn
            .query_row(
                "SELECT value FROM app_preference WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO app_preference (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

impl PreferenceRepository for SqlitePreferenceRepository {
    fn last_email(&self) -> AppResult<Option<String>> {
        self.get(LAST_EMAIL_KEY)
    }

    fn set_last_email(&self, email: &str) -> AppResult<()> {
        self.set(LAST_EMAIL_KEY, email)
    }
}
