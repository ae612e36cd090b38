// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod catalog;
pub mod showtime;
pub mod user;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Users and their lists
pub use user::{
    validate_movie_entry, validate_user_record, validate_username, MovieEntry, MovieList,
    UserRecord, MAX_REVIEW_SCORE,
};

// Catalog (metadata provider data)
pub use catalog::{CastMember, Credits, CrewMember, ListCategory, Movie, MovieDetails, Page, Video};

// Showtimes
pub use showtime::{Showing, ShowtimeDay, Theater};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Review score {score} is outside 0..=5")]
    InvalidReviewScore { score: u8 },

    #[error("Movie {movie_id} appears more than once in the {list} list")]
    DuplicateMovie { list: MovieList, movie_id: i64 },
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
