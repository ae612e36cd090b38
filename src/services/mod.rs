// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod catalog_service;
pub mod offline_list_service;
pub mod pagination;
pub mod showtime_service;
pub mod sync_coordinator;

#[cfg(test)]
mod sync_coordinator_tests;

pub use catalog_service::{MovieCatalogService, MovieProvider};

pub use offline_list_service::{OfflineListService, OfflineSnapshot};

pub use pagination::{fetch_all_pages, PageLimits, Paginated, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};

pub use showtime_service::{showtime_query, ShowtimeProvider, ShowtimeService};

pub use sync_coordinator::{PendingWrite, SyncCoordinator};
