// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are display-friendly representations
// - DTOs are simple, serializable structs
// - Conversion FROM domain entities only (never TO)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Movie, MovieDetails, MovieEntry, UserRecord, Video};
use crate::repositories::SavedList;
use crate::services::{MovieCatalogService, OfflineSnapshot};
use crate::session::SessionStore;

/// Poster size used by list rows
pub const LIST_POSTER_SIZE: &str = "w185";

/// Backdrop size used by the movie information screen
pub const BACKDROP_SIZE: &str = "w780";

/// Cast members shown on the movie information screen
const CAST_LIMIT: usize = 10;

// ============================================================================
// CATALOG DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummaryDto {
    pub id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub poster_url: Option<String>,
}

impl MovieSummaryDto {
    pub fn from_movie(movie: &Movie, catalog: &MovieCatalogService) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone().unwrap_or_else(|| "Untitled".to_string()),
            release_date: movie.release_date.clone().filter(|date| !date.is_empty()),
            poster_url: movie
                .poster_path
                .as_deref()
                .map(|path| catalog.poster_url(path, LIST_POSTER_SIZE)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastDto {
    pub name: String,
    pub character: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetailsDto {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub status: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub release_date: Option<String>,
    pub backdrop_url: Option<String>,
    pub directors: Vec<String>,
    pub cast: Vec<CastDto>,
    pub trailer_url: Option<String>,
    pub similar: Vec<MovieSummaryDto>,
}

impl MovieDetailsDto {
    pub fn from_details(details: &MovieDetails, catalog: &MovieCatalogService) -> Self {
        let movie = &details.movie;
        Self {
            id: movie.id,
            title: movie.title.clone().unwrap_or_else(|| "Untitled".to_string()),
            overview: movie.overview.clone(),
            status: movie.status.clone(),
            runtime_minutes: movie.runtime,
            release_date: movie.release_date.clone(),
            backdrop_url: movie
                .backdrop_path
                .as_deref()
                .map(|path| catalog.poster_url(path, BACKDROP_SIZE)),
            directors: details
                .credits
                .crew_with_job("Director")
                .filter_map(|member| member.name.clone())
                .collect(),
            cast: details
                .credits
                .cast
                .iter()
                .take(CAST_LIMIT)
                .filter_map(|member| {
                    member.name.clone().map(|name| CastDto {
                        name,
                        character: member.character.clone(),
                    })
                })
                .collect(),
            trailer_url: details.videos.first().and_then(video_url),
            similar: details
                .similar
                .iter()
                .map(|movie| MovieSummaryDto::from_movie(movie, catalog))
                .collect(),
        }
    }
}

/// Watch URL for videos hosted on YouTube
pub fn video_url(video: &Video) -> Option<String> {
    match video.site.as_deref() {
        Some("YouTube") | None => Some(format!("https://www.youtube.com/watch?v={}", video.key)),
        Some(_) => None,
    }
}

// ============================================================================
// LIST DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedListDto {
    pub list: String,
    pub saved_at: DateTime<Utc>,
    pub entries: Vec<MovieEntry>,
}

impl From<&SavedList> for SavedListDto {
    fn from(saved: &SavedList) -> Self {
        Self {
            list: saved.list.to_string(),
            saved_at: saved.saved_at,
            entries: saved.entries.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineListsDto {
    pub lists: Vec<SavedListDto>,
}

impl From<&OfflineSnapshot> for OfflineListsDto {
    fn from(snapshot: &OfflineSnapshot) -> Self {
        Self {
            lists: [&snapshot.watched, &snapshot.to_watch]
                .into_iter()
                .flatten()
                .map(SavedListDto::from)
                .collect(),
        }
    }
}

// ============================================================================
// SESSION DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummaryDto {
    pub signed_in: bool,
    pub username: Option<String>,
    pub is_private: bool,
    pub movies_watched: Vec<MovieEntry>,
    pub movies_to_watch: Vec<MovieEntry>,
    pub roster: Vec<String>,
}

impl From<&SessionStore> for SessionSummaryDto {
    fn from(session: &SessionStore) -> Self {
        let state = session.state();
        Self {
            signed_in: state.identity.is_some(),
            username: state
                .identity
                .as_ref()
                .map(|_| state.user.username.clone()),
            is_private: state.user.is_private,
            movies_watched: state.user.movies_watched.clone(),
            movies_to_watch: state.user.movies_to_watch.clone(),
            roster: state.roster.iter().map(roster_label).collect(),
        }
    }
}

fn roster_label(user: &UserRecord) -> String {
    format!(
        "{} ({} watched, {} to watch)",
        user.username,
        user.movies_watched.len(),
        user.movies_to_watch.len()
    )
}
