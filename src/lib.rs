// src/lib.rs
// MovieTime - Movie discovery and personal movie lists
//
// Architecture:
// - Domain-centric: list rules and catalog types live in `domain`
// - Echo-driven sync: the remote store's realtime echo is the only path
//   that updates the cached lists
// - Notification fan-out: every state change goes through one ChangeBus
// - Local snapshot: lists can be saved for offline viewing

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod session;

// ============================================================================
// BOUNDARIES
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_movie_entry,
    validate_user_record,
    validate_username,
    // Catalog
    CastMember,
    Credits,
    CrewMember,
    ListCategory,
    Movie,
    MovieDetails,
    // Users and lists
    MovieEntry,
    MovieList,
    Page,
    // Showtimes
    Showing,
    ShowtimeDay,
    Theater,
    UserRecord,
    Video,
};

// ============================================================================
// PUBLIC API - Errors & Configuration
// ============================================================================

pub use config::AppConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Notifications & Session
// ============================================================================

pub use events::{
    AuthChanged, Category, ChangeBus, ChangeKind, ChangeNotification, Interest, ListsChanged,
    RosterChanged, SubscriptionId,
};
pub use session::{SessionState, SessionStore};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    fetch_all_pages, MovieCatalogService, MovieProvider, OfflineListService, OfflineSnapshot,
    PageLimits, Paginated, PendingWrite, ShowtimeProvider, ShowtimeService, SyncCoordinator,
};

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{
    AuthIdentity, InMemoryRemoteStore, RemoteStore, SerpApiClient, TmdbClient, UserWatch,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{AppState, ErrorResponse};
