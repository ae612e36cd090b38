// src/integrations/mod.rs
//
// External Integrations Module
//
// - remote_store: user documents, identity and realtime watch
// - tmdb: movie metadata (MovieProvider)
// - serpapi: showtime search (ShowtimeProvider)

pub mod remote_store;
pub mod serpapi;
pub mod tmdb;

pub use remote_store::{AuthIdentity, InMemoryRemoteStore, RemoteStore, UserWatch};
pub use serpapi::SerpApiClient;
pub use tmdb::TmdbClient;
