// src/error/types.rs
use crate::domain::{DomainError, MovieList};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected before any network call (empty username, empty form field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad credentials, duplicate account, ...
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote store error: {0}")]
    Store(String),

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Movie {movie_id} is already in the {list} list")]
    AlreadyPresent { list: MovieList, movie_id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Other error: {0}")]
    Other(String),
}

impl AppError {
    /// Message shown to the user in an auth notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Auth(msg)
            | AppError::Network(msg)
            | AppError::Store(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Other(format!("Date parse error: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Other(format!("Background task failed: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_strips_category_prefix() {
        let err = AppError::Auth("The password is invalid".to_string());
        assert_eq!(err.user_message(), "The password is invalid");
        assert_eq!(err.to_string(), "Authentication error: The password is invalid");
    }

    #[test]
    fn test_already_present_names_the_list() {
        let err = AppError::AlreadyPresent {
            list: MovieList::ToWatch,
            movie_id: 603,
        };
        assert_eq!(err.to_string(), "Movie 603 is already in the to watch list");
    }
}
