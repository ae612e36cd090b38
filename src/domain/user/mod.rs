pub mod entity;
pub mod invariants;

pub use entity::{MovieEntry, MovieList, UserRecord};
pub use invariants::{validate_movie_entry, validate_user_record, validate_username, MAX_REVIEW_SCORE};
