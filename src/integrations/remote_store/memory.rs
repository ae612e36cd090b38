// src/integrations/remote_store/memory.rs
//
// In-process RemoteStore.
//
// Honors the same contract as a hosted document database: atomic
// array-union/remove per field, realtime pushes to every watcher of a
// document, and email/password accounts. Used by the CLI demo and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedSender};
use uuid::Uuid;

use super::{AuthIdentity, RemoteStore, UserWatch};
use crate::domain::{MovieEntry, MovieList, UserRecord};
use crate::error::{AppError, AppResult};

/// Shortest password the identity primitive accepts
const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    uid: String,
    password: String,
}

#[derive(Default)]
struct StoreData {
    accounts: HashMap<String, Account>,
    users: BTreeMap<String, UserRecord>,
    watchers: HashMap<String, Vec<UnboundedSender<UserRecord>>>,
    signed_in: Option<String>,
    password_resets: Vec<String>,
}

impl StoreData {
    fn notify(&mut self, uid: &str) {
        let Some(record) = self.users.get(uid).cloned() else {
            return;
        };
        if let Some(senders) = self.watchers.get_mut(uid) {
            senders.retain(|sender| sender.send(record.clone()).is_ok());
        }
    }

    fn user_mut(&mut self, uid: &str) -> AppResult<&mut UserRecord> {
        self.users
            .get_mut(uid)
            .ok_or_else(|| AppError::Store(format!("No document to update: users/{}", uid)))
    }
}

/// In-memory document store with realtime watchers
#[derive(Default)]
pub struct InMemoryRemoteStore {
    data: Mutex<StoreData>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, StoreData> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Network(
                "The Internet connection appears to be offline.".to_string(),
            ));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    /// Make every subsequent call fail with a network error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of document writes accepted so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Addresses a reset email was sent to
    pub fn password_resets(&self) -> Vec<String> {
        self.data().password_resets.clone()
    }

    /// Current stored document, bypassing the network checks
    pub fn document(&self, uid: &str) -> Option<UserRecord> {
        self.data().users.get(uid).cloned()
    }

    /// Seed a document directly, as another client would have written it
    pub fn insert_document(&self, record: UserRecord) {
        let mut data = self.data();
        let uid = record.id.clone();
        data.users.insert(uid.clone(), record);
        data.notify(&uid);
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthIdentity> {
        self.ensure_online()?;
        let mut data = self.data();
        let uid = match data.accounts.get(email) {
            Some(account) if account.password == password => account.uid.clone(),
            Some(_) => {
                return Err(AppError::Auth(
                    "The password is invalid or the user does not have a password.".to_string(),
                ))
            }
            None => {
                return Err(AppError::Auth(
                    "There is no user record corresponding to this identifier.".to_string(),
                ))
            }
        };
        data.signed_in = Some(uid.clone());
        Ok(AuthIdentity {
            uid,
            email: email.to_string(),
        })
    }

    async fn create_account(&self, email: &str, password: &str) -> AppResult<AuthIdentity> {
        self.ensure_online()?;
        if !email.contains('@') {
            return Err(AppError::Auth("The email address is badly formatted.".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Auth(
                "The password must be 6 characters long or more.".to_string(),
            ));
        }

        let mut data = self.data();
        if data.accounts.contains_key(email) {
            return Err(AppError::Auth(
                "The email address is already in use by another account.".to_string(),
            ));
        }

        let uid = Uuid::new_v4().simple().to_string();
        data.accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        data.signed_in = Some(uid.clone());
        Ok(AuthIdentity {
            uid,
            email: email.to_string(),
        })
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.ensure_online()?;
        self.data().signed_in = None;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> AppResult<()> {
        self.ensure_online()?;
        let mut data = self.data();
        if !data.accounts.contains_key(email) {
            return Err(AppError::Auth(
                "There is no user record corresponding to this identifier.".to_string(),
            ));
        }
        data.password_resets.push(email.to_string());
        Ok(())
    }

    async fn create_user(&self, record: &UserRecord) -> AppResult<()> {
        self.ensure_online()?;
        self.record_write();
        let mut data = self.data();
        data.users.insert(record.id.clone(), record.clone());
        data.notify(&record.id);
        Ok(())
    }

    async fn get_user(&self, uid: &str) -> AppResult<Option<UserRecord>> {
        self.ensure_online()?;
        Ok(self.data().users.get(uid).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        self.ensure_online()?;
        Ok(self.data().users.values().cloned().collect())
    }

    async fn array_union(&self, uid: &str, list: MovieList, entry: &MovieEntry) -> AppResult<()> {
        self.ensure_online()?;
        self.record_write();
        log::debug!("arrayUnion users/{}.{} <- {}", uid, list.field_name(), entry.movie_id);
        let mut data = self.data();
        let field = data.user_mut(uid)?.list_mut(list);
        if !field.contains(entry) {
            field.push(entry.clone());
        }
        data.notify(uid);
        Ok(())
    }

    async fn array_remove(&self, uid: &str, list: MovieList, entry: &MovieEntry) -> AppResult<()> {
        self.ensure_online()?;
        self.record_write();
        log::debug!("arrayRemove users/{}.{} -> {}", uid, list.field_name(), entry.movie_id);
        let mut data = self.data();
        data.user_mut(uid)?.list_mut(list).retain(|existing| existing != entry);
        data.notify(uid);
        Ok(())
    }

    async fn set_privacy(&self, uid: &str, is_private: bool) -> AppResult<()> {
        self.ensure_online()?;
        self.record_write();
        let mut data = self.data();
        data.user_mut(uid)?.is_private = is_private;
        data.notify(uid);
        Ok(())
    }

    async fn watch_user(&self, uid: &str) -> AppResult<UserWatch> {
        self.ensure_online()?;
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut data = self.data();
        if let Some(record) = data.users.get(uid).cloned() {
            // A closed receiver cannot exist yet
            let _ = sender.send(record);
        }
        data.watchers.entry(uid.to_string()).or_default().push(sender);
        Ok(receiver)
    }
}
