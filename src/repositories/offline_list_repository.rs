// src/repositories/offline_list_repository.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::ConnectionPool;
use crate::domain::{MovieEntry, MovieList};
use crate::error::AppResult;

/// A list as it was last saved for offline viewing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedList {
    pub list: MovieList,
    pub entries: Vec<MovieEntry>,
    pub saved_at: DateTime<Utc>,
}

pub trait OfflineListRepository: Send + Sync {
    /// Replace the stored copy of `list`
    fn save_list(&self, list: MovieList, entries: &[MovieEntry], saved_at: DateTime<Utc>) -> AppResult<()>;
    fn load_list(&self, list: MovieList) -> AppResult<Option<SavedList>>;
    fn count_entries(&self) -> AppResult<usize>;
    fn clear_all(&self) -> AppResult<()>;
}

pub struct SqliteOfflineListRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteOfflineListRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &Row) -> Result<(MovieEntry, String), rusqlite::Error> {
        let entry = MovieEntry {
            movie_id: row.get("movie_id")?,
            review_score: row.get("review_score")?,
            review_description: row.get("review_description")?,
        };
        Ok((entry, row.get("saved_at")?))
    }
}

impl OfflineListRepository for SqliteOfflineListRepository {
    fn save_list(&self, list: MovieList, entries: &[MovieEntry], saved_at: DateTime<Utc>) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM offline_movie_list WHERE list_kind = ?1",
            params![list.storage_key()],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO offline_movie_list
                    (list_kind, position, movie_id, review_score, review_description, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, entry) in entries.iter().enumerate() {
                stmt.execute(params![
                    list.storage_key(),
                    position as i64,
                    entry.movie_id,
                    entry.review_score,
                    entry.review_description,
                    saved_at.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_list(&self, list: MovieList) -> AppResult<Option<SavedList>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT movie_id, review_score, review_description, saved_at
             FROM offline_movie_list WHERE list_kind = ?1 ORDER BY position",
        )?;

        let rows = stmt
            .query_map(params![list.storage_key()], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        let Some((_, saved_at)) = rows.first() else {
            return Ok(None);
        };
        let saved_at = DateTime::parse_from_rfc3339(saved_at)?.with_timezone(&Utc);

        Ok(Some(SavedList {
            list,
            entries: rows.into_iter().map(|(entry, _)| entry).collect(),
            saved_at,
        }))
    }

    fn count_entries(&self) -> AppResult<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM offline_movie_list", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn clear_all(&self) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM offline_movie_list", [])?;
        Ok(())
    }
}
