// src/services/showtime_service.rs
//
// Showtime Service - Cinema screenings for a movie near a location

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ShowtimeDay;
use crate::error::{AppError, AppResult};

/// Port to the showtime search provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShowtimeProvider: Send + Sync {
    /// Free-text search; a response without showtimes is an empty list
    async fn search(&self, query: &str) -> AppResult<Vec<ShowtimeDay>>;
}

pub struct ShowtimeService {
    provider: Arc<dyn ShowtimeProvider>,
}

impl ShowtimeService {
    pub fn new(provider: Arc<dyn ShowtimeProvider>) -> Self {
        Self { provider }
    }

    pub async fn find_showtimes(&self, title: &str, city: &str, country: &str) -> AppResult<Vec<ShowtimeDay>> {
        let query = showtime_query(title, city, country)?;
        log::info!("Searching showtimes: {}", query);

        let days = self.provider.search(&query).await?;
        log::debug!("Found showtimes on {} day(s)", days.len());
        Ok(days)
    }
}

/// "{title} Cinemas {city} {country}"
pub fn showtime_query(title: &str, city: &str, country: &str) -> AppResult<String> {
    let title = required("Movie title", title)?;
    let city = required("City", city)?;
    let country = required("Country", country)?;
    Ok(format!("{} Cinemas {} {}", title, city, country))
}

fn required<'a>(name: &str, value: &'a str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} must be provided", name)));
    }
    Ok(value)
}
