// src/application/state.rs

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{create_connection_pool, get_connection, initialize_database, ConnectionPool};
use crate::error::AppResult;
use crate::events::ChangeBus;
use crate::integrations::{RemoteStore, SerpApiClient, TmdbClient};
use crate::repositories::{
    OfflineListRepository, PreferenceRepository, SqliteOfflineListRepository,
    SqlitePreferenceRepository,
};
use crate::services::{MovieCatalogService, OfflineListService, ShowtimeService, SyncCoordinator};
use crate::session::SessionStore;

/// Application state, built once at startup.
/// All services are Arc-wrapped and share one session and one bus.
pub struct AppState {
    pub config: AppConfig,
    pub session: SessionStore,
    pub bus: Arc<ChangeBus>,
    pub sync: Arc<SyncCoordinator>,
    pub catalog: Arc<MovieCatalogService>,
    pub showtimes: Arc<ShowtimeService>,
    pub offline: Arc<OfflineListService>,
    pub preferences: Arc<dyn PreferenceRepository>,
}

impl AppState {
    /// Open the configured database and wire every component
    pub fn new(config: AppConfig, store: Arc<dyn RemoteStore>) -> AppResult<Self> {
        let pool = Arc::new(create_connection_pool(&config.storage.database_path()?)?);
        Self::with_pool(config, store, pool)
    }

    pub fn with_pool(
        config: AppConfig,
        store: Arc<dyn RemoteStore>,
        pool: Arc<ConnectionPool>,
    ) -> AppResult<Self> {
        // 1. INFRASTRUCTURE
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
        }
        let tmdb = Arc::new(TmdbClient::new(&config.tmdb, &config.http)?);
        let serpapi = Arc::new(SerpApiClient::new(&config.showtimes, &config.http)?);

        // 2. REPOSITORIES
        let offline_repo: Arc<dyn OfflineListRepository> =
            Arc::new(SqliteOfflineListRepository::new(pool.clone()));
        let preferences: Arc<dyn PreferenceRepository> =
            Arc::new(SqlitePreferenceRepository::new(pool.clone()));

        // 3. SESSION & NOTIFICATIONS
        let session = SessionStore::new();
        let bus = Arc::new(ChangeBus::new(Arc::new(session.clone())));

        // 4. SERVICES
        let sync = Arc::new(
            SyncCoordinator::new(store, session.clone(), bus.clone())
                .with_preferences(preferences.clone()),
        );
        let catalog = Arc::new(MovieCatalogService::new(
            tmdb,
            config.pagination,
            config.tmdb.image_base.clone(),
        ));
        let showtimes = Arc::new(ShowtimeService::new(serpapi));
        let offline = Arc::new(OfflineListService::new(offline_repo, session.clone()));

        Ok(Self {
            config,
            session,
            bus,
            sync,
            catalog,
            showtimes,
            offline,
            preferences,
        })
    }
}
