// src/integrations/remote_store/mod.rs
//
// Remote document store contract
//
// ARCHITECTURE:
// - One document per user under the `users` collection, keyed by auth uid
// - List mutations are atomic array-union / array-remove at field level
// - Realtime changes are pushed per document through a channel
// - Email/password identity primitive lives on the same port
//
// The sync coordinator is the only consumer. Nothing here knows about
// session state or notifications.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::domain::{MovieEntry, MovieList, UserRecord};
use crate::error::AppResult;

pub use memory::InMemoryRemoteStore;

/// Identity returned by a successful sign-in or registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub uid: String,
    pub email: String,
}

/// Stream of user documents pushed by the store.
///
/// The current document is delivered first, then one copy per change.
/// The stream ends when the store drops the subscription.
pub type UserWatch = UnboundedReceiver<UserRecord>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthIdentity>;

    async fn create_account(&self, email: &str, password: &str) -> AppResult<AuthIdentity>;

    async fn sign_out(&self) -> AppResult<()>;

    async fn send_password_reset(&self, email: &str) -> AppResult<()>;

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Create (or overwrite) the document of `record.id`
    async fn create_user(&self, record: &UserRecord) -> AppResult<()>;

    async fn get_user(&self, uid: &str) -> AppResult<Option<UserRecord>>;

    /// Scan the whole users collection
    async fn list_users(&self) -> AppResult<Vec<UserRecord>>;

    /// Append `entry` to the list field unless an equal value is already there
    async fn array_union(&self, uid: &str, list: MovieList, entry: &MovieEntry) -> AppResult<()>;

    /// Remove every value equal to `entry` from the list field
    async fn array_remove(&self, uid: &str, list: MovieList, entry: &MovieEntry) -> AppResult<()>;

    async fn set_privacy(&self, uid: &str, is_private: bool) -> AppResult<()>;

    // ------------------------------------------------------------------
    // Realtime
    // ------------------------------------------------------------------

    async fn watch_user(&self, uid: &str) -> AppResult<UserWatch>;
}
