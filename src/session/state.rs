// src/session/state.rs
//
// Session state of the signed-in user.
//
// RULES:
// - Only the sync coordinator mutates it
// - The lock is never held across an await point
// - Readers always get owned copies

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{validate_user_record, MovieEntry, MovieList, UserRecord};
use crate::events::{
    AuthChanged, Category, ChangeKind, ChangeNotification, ListsChanged, RosterChanged,
    SnapshotSource,
};
use crate::integrations::remote_store::AuthIdentity;

/// Everything the client knows about the current session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Set while a user is signed in
    pub identity: Option<AuthIdentity>,

    /// Cached copy of the signed-in user's document
    pub user: UserRecord,

    /// Other users whose lists are public
    pub roster: Vec<UserRecord>,

    /// Additions issued to the store whose echo has not arrived yet,
    /// keyed by movie and holding the exact entry sent
    pub pending_additions: HashMap<(MovieList, i64), MovieEntry>,
}

/// Outcome of applying a user document pushed by the store
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedSnapshot {
    pub movies_watched: Vec<MovieEntry>,
    pub movies_to_watch: Vec<MovieEntry>,
    /// Duplicate entries collapsed by the reconciling pass
    pub collapsed: Vec<(MovieList, i64)>,
}

/// Shared handle to the session state
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Owned copy of the whole state
    pub fn state(&self) -> SessionState {
        self.read().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.read().identity.is_some()
    }

    pub fn current_uid(&self) -> Option<String> {
        self.read().identity.as_ref().map(|identity| identity.uid.clone())
    }

    pub fn user(&self) -> UserRecord {
        self.read().user.clone()
    }

    pub fn list(&self, list: MovieList) -> Vec<MovieEntry> {
        self.read().user.list(list).to_vec()
    }

    pub fn roster(&self) -> Vec<UserRecord> {
        self.read().roster.clone()
    }

    pub fn is_private(&self) -> bool {
        self.read().user.is_private
    }

    /// Replace the session with a freshly signed-in user
    pub fn begin(&self, identity: AuthIdentity, user: UserRecord) {
        let mut state = self.write();
        *state = SessionState {
            identity: Some(identity),
            user,
            roster: Vec::new(),
            pending_additions: HashMap::new(),
        };
    }

    /// Forget everything about the signed-in user
    pub fn clear(&self) {
        *self.write() = SessionState::default();
    }

    /// Reserve an addition of `movie_id` to `list`.
    ///
    /// Returns false if the movie is already in the cached list or an
    /// addition for it is still in flight. The check uses local state only
    /// and may be stale relative to the store.
    pub fn reserve_addition(&self, list: MovieList, entry: &MovieEntry) -> bool {
        let mut state = self.write();
        let key = (list, entry.movie_id);
        if state.user.contains_movie(list, entry.movie_id)
            || state.pending_additions.contains_key(&key)
        {
            return false;
        }
        state.pending_additions.insert(key, entry.clone());
        true
    }

    /// Drop an in-flight marker, e.g. after the write failed
    pub fn release_addition(&self, list: MovieList, movie_id: i64) {
        self.write().pending_additions.remove(&(list, movie_id));
    }

    /// Drop the in-flight marker only if it holds exactly `entry`.
    ///
    /// A removal of a different value for the same movie leaves the
    /// pending addition in place. Returns whether a marker was dropped.
    pub fn release_addition_of(&self, list: MovieList, entry: &MovieEntry) -> bool {
        let mut state = self.write();
        let key = (list, entry.movie_id);
        if state.pending_additions.get(&key) == Some(entry) {
            state.pending_additions.remove(&key);
            return true;
        }
        false
    }

    pub fn has_pending_addition(&self, list: MovieList, movie_id: i64) -> bool {
        self.read().pending_additions.contains_key(&(list, movie_id))
    }

    /// Apply a user document echoed by the store's realtime subscription.
    ///
    /// The document replaces the cached one, duplicate movie ids are collapsed
    /// (first occurrence wins) and in-flight markers that are now visible are
    /// cleared. The record id is kept from the identity when the store omits it.
    pub fn apply_remote_user(&self, mut record: UserRecord) -> AppliedSnapshot {
        let mut state = self.write();

        if record.id.is_empty() {
            if let Some(identity) = &state.identity {
                record.id = identity.uid.clone();
            }
        }

        let collapsed = record.collapse_duplicates();
        if let Err(err) = validate_user_record(&record) {
            log::warn!("User document {} breaks a list rule: {}", record.id, err);
        }

        state
            .pending_additions
            .retain(|(list, movie_id), _| !record.contains_movie(*list, *movie_id));

        let applied = AppliedSnapshot {
            movies_watched: record.movies_watched.clone(),
            movies_to_watch: record.movies_to_watch.clone(),
            collapsed,
        };
        state.user = record;
        applied
    }

    /// Update the cached privacy flag without waiting for the store echo
    pub fn set_privacy(&self, is_private: bool) {
        self.write().user.is_private = is_private;
    }

    pub fn set_roster(&self, users: Vec<UserRecord>) {
        self.write().roster = users;
    }
}

impl SnapshotSource for SessionStore {
    fn snapshot(&self, category: Category) -> ChangeNotification {
        let state = self.read();
        match category {
            Category::Auth => {
                AuthChanged::new(ChangeKind::Updated, state.identity.is_some(), None).into()
            }
            Category::Lists => ListsChanged::new(
                ChangeKind::Updated,
                state.user.movies_watched.clone(),
                state.user.movies_to_watch.clone(),
            )
            .into(),
            Category::Roster => RosterChanged::new(ChangeKind::Updated, state.roster.clone()).into(),
        }
    }
}
