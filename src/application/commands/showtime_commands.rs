// src/application/commands/showtime_commands.rs

use crate::application::{
    error_handling::{ErrorResponse, ToErrorResponse},
    state::AppState,
};
use crate::domain::ShowtimeDay;

pub async fn find_showtimes(
    state: &AppState,
    title: &str,
    city: &str,
    country: &str,
) -> Result<Vec<ShowtimeDay>, ErrorResponse> {
    state
        .showtimes
        .find_showtimes(title, city, country)
        .await
        .to_error_response()
}
