// src/services/offline_list_service.rs
//
// Offline List Service - Local copy of the signed-in user's lists
//
// The saved copy is a snapshot of the session cache at save time. It is
// never synchronized back to the remote store.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::MovieList;
use crate::error::{AppError, AppResult};
use crate::repositories::{OfflineListRepository, SavedList};
use crate::session::SessionStore;

/// Both saved lists, each absent until first saved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfflineSnapshot {
    pub watched: Option<SavedList>,
    pub to_watch: Option<SavedList>,
}

impl OfflineSnapshot {
    pub fn get(&self, list: MovieList) -> Option<&SavedList> {
        match list {
            MovieList::Watched => self.watched.as_ref(),
            MovieList::ToWatch => self.to_watch.as_ref(),
        }
    }
}

pub struct OfflineListService {
    repository: Arc<dyn OfflineListRepository>,
    session: SessionStore,
}

impl OfflineListService {
    pub fn new(repository: Arc<dyn OfflineListRepository>, session: SessionStore) -> Self {
        Self { repository, session }
    }

    /// Save the cached copy of `list`, replacing the previous one.
    ///
    /// Returns the number of entries saved.
    pub fn save_list(&self, list: MovieList) -> AppResult<usize> {
        if !self.session.is_signed_in() {
            return Err(AppError::NotSignedIn);
        }

        let entries = self.session.list(list);
        self.repository.save_list(list, &entries, Utc::now())?;
        log::info!("Saved {} movie(s) of the {} list for offline use", entries.len(), list);
        Ok(entries.len())
    }

    pub fn load(&self) -> AppResult<OfflineSnapshot> {
        Ok(OfflineSnapshot {
            watched: self.repository.load_list(MovieList::Watched)?,
            to_watch: self.repository.load_list(MovieList::ToWatch)?,
        })
    }

    /// False when nothing was saved or both saved lists are empty
    pub fn has_offline_lists(&self) -> AppResult<bool> {
        Ok(self.repository.count_entries()? > 0)
    }

    pub fn clear(&self) -> AppResult<()> {
        self.repository.clear_all()?;
        log::info!("Cleared offline lists");
        Ok(())
    }
}
