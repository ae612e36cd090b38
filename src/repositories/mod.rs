// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO event emission
// - NO cross-repository calls
// - Explicit SQL only

pub mod offline_list_repository;
pub mod preference_repository;

pub use offline_list_repository::{OfflineListRepository, SavedList, SqliteOfflineListRepository};
pub use preference_repository::{PreferenceRepository, SqlitePreferenceRepository};
