// src/services/sync_coordinator.rs
//
// Sync Coordinator - Remote store orchestration
//
// RESPONSIBILITIES:
// - Auth flows (sign in, register, sign out, password reset)
// - Optimistic list mutations with a local duplicate check
// - Realtime echo of the user document -> session state -> ListsChanged
// - Roster of other public users
//
// CONTRACT FOR LIST MUTATIONS:
// - The call returns as soon as the write is issued (PendingWrite)
// - Session state is NOT touched by the call itself
// - The store's realtime echo is the only path that updates the lists
// - A failed write is logged and surfaced through the PendingWrite only
//
// Privacy is the exception: the cached flag changes as soon as the
// write succeeds, without waiting for the echo.
//
// List mutations spawn their write on the current tokio runtime; called
// outside one they fail with AppError::Other instead of issuing it.

use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::domain::{
    validate_movie_entry, validate_username, DomainError, MovieEntry, MovieList, UserRecord,
};
use crate::error::{AppError, AppResult};
use crate::events::{
    AuthChanged, ChangeBus, ChangeKind, ChangeNotification, Interest, ListsChanged, RosterChanged,
    SubscriptionId,
};
use crate::integrations::remote_store::{AuthIdentity, RemoteStore};
use crate::repositories::PreferenceRepository;
use crate::session::SessionStore;

/// Handle to a list mutation already sent to the store.
///
/// Dropping it leaves the write running. Awaiting `confirmed` yields the
/// store's answer; the session only changes once the echo arrives.
#[derive(Debug)]
pub struct PendingWrite {
    list: MovieList,
    movie_id: i64,
    handle: JoinHandle<AppResult<()>>,
}

impl PendingWrite {
    pub fn list(&self) -> MovieList {
        self.list
    }

    pub fn movie_id(&self) -> i64 {
        self.movie_id
    }

    /// Wait for the store to accept or reject the write
    pub async fn confirmed(self) -> AppResult<()> {
        self.handle.await?
    }
}

pub struct SyncCoordinator {
    store: Arc<dyn RemoteStore>,
    session: SessionStore,
    bus: Arc<ChangeBus>,
    preferences: Option<Arc<dyn PreferenceRepository>>,
    watch_task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncCoordinator {
    pub fn new(store: Arc<dyn RemoteStore>, session: SessionStore, bus: Arc<ChangeBus>) -> Self {
        Self {
            store,
            session,
            bus,
            preferences: None,
            watch_task: Mutex::new(None),
        }
    }

    /// Remember the last e-mail used to sign in or register
    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceRepository>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn bus(&self) -> Arc<ChangeBus> {
        Arc::clone(&self.bus)
    }

    // ========================================================================
    // SUBSCRIPTIONS
    // ========================================================================

    pub fn subscribe<F>(&self, interest: Interest, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeNotification) + Send + Sync + 'static,
    {
        self.bus.subscribe(interest, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // ========================================================================
    // AUTH
    // ========================================================================

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<()> {
        match self.try_sign_in(email, password).await {
            Ok(uid) => {
                self.remember_email(email);
                self.after_auth(&uid).await;
                Ok(())
            }
            Err(err) => Err(self.fail_auth(err)),
        }
    }

    async fn try_sign_in(&self, email: &str, password: &str) -> AppResult<String> {
        require_field("Email", email)?;
        require_field("Password", password)?;

        let identity = self.store.sign_in(email, password).await?;
        let user = match self.store.get_user(&identity.uid).await? {
            Some(user) => user,
            None => {
                log::warn!("No user document for {}, starting from an empty one", identity.uid);
                UserRecord::new(identity.uid.clone(), "")
            }
        };

        let uid = identity.uid.clone();
        self.session.begin(identity, user);
        log::info!("Signed in as {}", uid);
        Ok(uid)
    }

    /// Create an account and its user document (empty lists, public).
    ///
    /// A blank username is rejected before the store is contacted.
    pub async fn register(&self, email: &str, password: &str, username: &str) -> AppResult<()> {
        match self.try_register(email, password, username).await {
            Ok(uid) => {
                self.remember_email(email);
                self.after_auth(&uid).await;
                Ok(())
            }
            Err(err) => Err(self.fail_auth(err)),
        }
    }

    async fn try_register(&self, email: &str, password: &str, username: &str) -> AppResult<String> {
        validate_username(username).map_err(validation_error)?;
        require_field("Email", email)?;
        require_field("Password", password)?;

        let identity: AuthIdentity = self.store.create_account(email, password).await?;
        let record = UserRecord::new(identity.uid.clone(), username);
        self.store.create_user(&record).await?;

        let uid = identity.uid.clone();
        self.session.begin(identity, record);
        log::info!("Registered {} as {}", username, uid);
        Ok(uid)
    }

    /// Sign out. A failure is logged and returned but never published.
    pub async fn sign_out(&self) -> AppResult<()> {
        if let Err(err) = self.store.sign_out().await {
            log::error!("Failed to sign out: {}", err);
            return Err(err);
        }

        self.stop_watch();
        self.session.clear();
        self.bus.publish(AuthChanged::signed_out());
        Ok(())
    }

    pub async fn send_password_reset(&self, email: &str) -> AppResult<()> {
        require_field("Email", email)?;
        self.store.send_password_reset(email).await.map_err(|err| {
            log::error!("Failed to send password reset to {}: {}", email, err);
            err
        })
    }

    async fn after_auth(&self, uid: &str) {
        self.bus.publish(AuthChanged::signed_in());
        self.start_watch(uid).await;
        if let Err(err) = self.refresh_roster().await {
            log::warn!("Roster refresh after sign-in failed: {}", err);
        }
    }

    fn fail_auth(&self, err: AppError) -> AppError {
        log::warn!("Authentication failed: {}", err);
        self.stop_watch();
        self.session.clear();
        self.bus.publish(AuthChanged::failed(err.user_message()));
        err
    }

    fn remember_email(&self, email: &str) {
        if let Some(preferences) = &self.preferences {
            if let Err(err) = preferences.set_last_email(email) {
                log::warn!("Could not remember e-mail: {}", err);
            }
        }
    }

    // ========================================================================
    // LISTS
    // ========================================================================

    /// Add a reviewed movie to the watched list.
    ///
    /// Fails with `AlreadyPresent` (no network call) if the movie is in the
    /// cached list or an addition for it is still in flight.
    pub fn add_watched(&self, entry: MovieEntry) -> AppResult<PendingWrite> {
        validate_movie_entry(MovieList::Watched, &entry)?;
        self.add_to_list(MovieList::Watched, entry)
    }

    pub fn add_to_watch(&self, movie_id: i64) -> AppResult<PendingWrite> {
        self.add_to_list(MovieList::ToWatch, MovieEntry::to_watch(movie_id))
    }

    /// Remove the exact entry; absent entries are a no-op
    pub fn remove_watched(&self, entry: MovieEntry) -> AppResult<PendingWrite> {
        self.remove_from_list(MovieList::Watched, entry)
    }

    pub fn remove_to_watch(&self, entry: MovieEntry) -> AppResult<PendingWrite> {
        self.remove_from_list(MovieList::ToWatch, entry)
    }

    fn add_to_list(&self, list: MovieList, entry: MovieEntry) -> AppResult<PendingWrite> {
        let uid = self.require_uid()?;
        let runtime = current_runtime()?;
        let movie_id = entry.movie_id;

        if !self.session.reserve_addition(list, &entry) {
            log::info!("Movie {} already in the {} list", movie_id, list);
            return Err(AppError::AlreadyPresent { list, movie_id });
        }

        let store = Arc::clone(&self.store);
        let session = self.session.clone();
        let handle = runtime.spawn(async move {
            let result = store.array_union(&uid, list, &entry).await;
            if let Err(err) = &result {
                log::error!("Failed to add movie {} to the {} list: {}", movie_id, list, err);
                session.release_addition(list, movie_id);
            }
            result
        });

        Ok(PendingWrite {
            list,
            movie_id,
            handle,
        })
    }

    fn remove_from_list(&self, list: MovieList, entry: MovieEntry) -> AppResult<PendingWrite> {
        let uid = self.require_uid()?;
        let runtime = current_runtime()?;
        let movie_id = entry.movie_id;

        let store = Arc::clone(&self.store);
        let session = self.session.clone();
        let handle = runtime.spawn(async move {
            let result = store.array_remove(&uid, list, &entry).await;
            match &result {
                // Only the value that was added can cancel its pending addition
                Ok(()) => {
                    if session.release_addition_of(list, &entry) {
                        log::debug!("Removed movie {} before its addition was echoed", movie_id);
                    }
                }
                Err(err) => log::error!(
                    "Failed to remove movie {} from the {} list: {}",
                    movie_id,
                    list,
                    err
                ),
            }
            result
        });

        Ok(PendingWrite {
            list,
            movie_id,
            handle,
        })
    }

    // ========================================================================
    // PRIVACY & ROSTER
    // ========================================================================

    /// Write the privacy flag, then update the cached flag right away
    pub async fn set_privacy(&self, is_private: bool) -> AppResult<()> {
        let uid = self.require_uid()?;

        if let Err(err) = self.store.set_privacy(&uid, is_private).await {
            log::error!("Failed to change privacy setting: {}", err);
            return Err(err);
        }

        self.session.set_privacy(is_private);
        Ok(())
    }

    /// Reload the roster: every public user except the signed-in one.
    ///
    /// Returns the roster size. Failures are logged; no notification is sent.
    pub async fn refresh_roster(&self) -> AppResult<usize> {
        let users = match self.store.list_users().await {
            Ok(users) => users,
            Err(err) => {
                log::error!("Failed to load users: {}", err);
                return Err(err);
            }
        };

        let own_uid = self.session.current_uid();
        let roster: Vec<UserRecord> = users
            .into_iter()
            .filter(|user| own_uid.as_deref() != Some(user.id.as_str()))
            .filter_map(|user| user.public_view())
            .collect();

        let count = roster.len();
        self.session.set_roster(roster.clone());
        self.bus.publish(RosterChanged::new(ChangeKind::Updated, roster));
        Ok(count)
    }

    // ========================================================================
    // REALTIME ECHO
    // ========================================================================

    /// Apply a user document pushed by the store and publish the new lists
    pub fn apply_remote_user(&self, record: UserRecord) {
        Self::apply_echo(&self.session, &self.bus, record);
    }

    fn apply_echo(session: &SessionStore, bus: &ChangeBus, record: UserRecord) {
        let Some(uid) = session.current_uid() else {
            log::debug!("Dropping user document received while signed out");
            return;
        };
        if !record.id.is_empty() && record.id != uid {
            log::debug!("Dropping user document of {} (signed in as {})", record.id, uid);
            return;
        }

        let applied = session.apply_remote_user(record);
        for (list, movie_id) in &applied.collapsed {
            log::warn!("Collapsed duplicate movie {} in the {} list", movie_id, list);
        }

        bus.publish(ListsChanged::new(
            ChangeKind::Updated,
            applied.movies_watched,
            applied.movies_to_watch,
        ));
    }

    async fn start_watch(&self, uid: &str) {
        self.stop_watch();

        let mut watch = match self.store.watch_user(uid).await {
            Ok(watch) => watch,
            Err(err) => {
                log::error!("Failed to get data for this user: {}", err);
                return;
            }
        };

        let session = self.session.clone();
        let bus = Arc::clone(&self.bus);
        let handle = tokio::spawn(async move {
            while let Some(record) = watch.recv().await {
                Self::apply_echo(&session, &bus, record);
            }
            log::debug!("User document subscription ended");
        });

        *self
            .watch_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handle);
    }

    fn stop_watch(&self) {
        let handle = self
            .watch_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    fn require_uid(&self) -> AppResult<String> {
        self.session.current_uid().ok_or(AppError::NotSignedIn)
    }
}

impl Drop for SyncCoordinator {
    fn drop(&mut self) {
        self.stop_watch();
    }
}

fn current_runtime() -> AppResult<Handle> {
    Handle::try_current()
        .map_err(|err| AppError::Other(format!("List changes need a tokio runtime: {}", err)))
}

fn require_field(name: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must be provided", name)));
    }
    Ok(())
}

fn validation_error(err: DomainError) -> AppError {
    match err {
        DomainError::InvariantViolation(message) => AppError::Validation(message),
        other => AppError::Validation(other.to_string()),
    }
}
