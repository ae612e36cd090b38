use super::entity::{MovieEntry, MovieList, UserRecord};
use crate::domain::{DomainError, DomainResult};

/// Highest score a review can carry
pub const MAX_REVIEW_SCORE: u8 = 5;

/// Validates all UserRecord invariants
pub fn validate_user_record(user: &UserRecord) -> DomainResult<()> {
    validate_username(&user.username)?;
    for list in MovieList::ALL {
        validate_unique_movies(list, user.list(list))?;
        for entry in user.list(list) {
            validate_movie_entry(list, entry)?;
        }
    }
    Ok(())
}

/// Username cannot be empty or whitespace-only
pub fn validate_username(username: &str) -> DomainResult<()> {
    if username.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "A username must be provided".to_string(),
        ));
    }
    Ok(())
}

/// Review data only lives on watched entries, and the score is 0..=5
pub fn validate_movie_entry(list: MovieList, entry: &MovieEntry) -> DomainResult<()> {
    if let Some(score) = entry.review_score {
        if score > MAX_REVIEW_SCORE {
            return Err(DomainError::InvalidReviewScore { score });
        }
    }
    if list == MovieList::ToWatch && entry.has_review() {
        return Err(DomainError::InvariantViolation(format!(
            "Movie {} cannot carry a review in the to watch list",
            entry.movie_id
        )));
    }
    Ok(())
}

/// A movie id appears at most once per list
fn validate_unique_movies(list: MovieList, entries: &[MovieEntry]) -> DomainResult<()> {
    let mut seen = std::collections::HashSet::new();
    for entry in entries {
        if !seen.insert(entry.movie_id) {
            return Err(DomainError::DuplicateMovie {
                list,
                movie_id: entry.movie_id,
            });
        }
    }
    Ok(())
}
