// src/application/commands/catalog_commands.rs

use crate::application::{
    dto::*,
    error_handling::{ErrorResponse, ToErrorResponse},
    state::AppState,
};
use crate::domain::ListCategory;

/// Every movie of a curated list
pub async fn browse_movies(
    state: &AppState,
    category: ListCategory,
) -> Result<Vec<MovieSummaryDto>, ErrorResponse> {
    let movies = state.catalog.browse(category).await.to_error_response()?;

    Ok(movies
        .iter()
        .map(|movie| MovieSummaryDto::from_movie(movie, &state.catalog))
        .collect())
}

pub async fn search_movies(
    state: &AppState,
    title: &str,
) -> Result<Vec<MovieSummaryDto>, ErrorResponse> {
    let movies = state.catalog.search(title).await.to_error_response()?;

    Ok(movies
        .iter()
        .map(|movie| MovieSummaryDto::from_movie(movie, &state.catalog))
        .collect())
}

pub async fn get_movie_details(
    state: &AppState,
    movie_id: i64,
) -> Result<MovieDetailsDto, ErrorResponse> {
    let details = state.catalog.details(movie_id).await.to_error_response()?;

    Ok(MovieDetailsDto::from_details(&details, &state.catalog))
}
