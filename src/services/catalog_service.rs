// src/services/catalog_service.rs
//
// Movie Catalog Service - Browse, search and details
//
// RESPONSIBILITIES:
// - Paginated listings over the metadata provider
// - Aggregating the movie information screen (movie, credits, videos, similar)
// - Building image URLs from the configured image base
//
// Nothing here touches the session or publishes notifications.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Credits, ListCategory, Movie, MovieDetails, Page, Video};
use crate::error::{AppError, AppResult};
use crate::services::pagination::{fetch_all_pages, PageLimits};

/// Port to the movie metadata provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieProvider: Send + Sync {
    async fn movie(&self, movie_id: i64) -> AppResult<Movie>;

    async fn credits(&self, movie_id: i64) -> AppResult<Credits>;

    async fn similar(&self, movie_id: i64, page: u32) -> AppResult<Page<Movie>>;

    async fn videos(&self, movie_id: i64) -> AppResult<Vec<Video>>;

    async fn search(&self, query: &str, page: u32) -> AppResult<Page<Movie>>;

    async fn list(&self, category: ListCategory, page: u32) -> AppResult<Page<Movie>>;
}

pub struct MovieCatalogService {
    provider: Arc<dyn MovieProvider>,
    limits: PageLimits,
    image_base: String,
}

impl MovieCatalogService {
    pub fn new(provider: Arc<dyn MovieProvider>, limits: PageLimits, image_base: impl Into<String>) -> Self {
        Self {
            provider,
            limits,
            image_base: image_base.into(),
        }
    }

    /// Every page of a curated list, up to the page cap
    pub async fn browse(&self, category: ListCategory) -> AppResult<Vec<Movie>> {
        log::info!("Browsing {}", category);
        fetch_all_pages(self.limits, |page| self.provider.list(category, page))
            .await
            .into_partial_result()
    }

    /// Title search across every result page, up to the page cap
    pub async fn search(&self, title: &str) -> AppResult<Vec<Movie>> {
        let query = title.trim();
        if query.is_empty() {
            return Err(AppError::Validation("A movie title must be provided".to_string()));
        }

        log::info!("Searching movies for {:?}", query);
        fetch_all_pages(self.limits, |page| self.provider.search(query, page))
            .await
            .into_partial_result()
    }

    /// Movie, credits, videos and the first page of similar titles
    pub async fn details(&self, movie_id: i64) -> AppResult<MovieDetails> {
        let (movie, credits, videos, similar) = tokio::try_join!(
            self.provider.movie(movie_id),
            self.provider.credits(movie_id),
            self.provider.videos(movie_id),
            self.provider.similar(movie_id, 1),
        )?;

        Ok(MovieDetails {
            movie,
            credits,
            videos,
            similar: similar.items,
        })
    }

    /// The video shown as the movie's preview
    pub async fn trailer(&self, movie_id: i64) -> AppResult<Option<Video>> {
        Ok(self.provider.videos(movie_id).await?.into_iter().next())
    }

    /// Image URL for a poster or backdrop path, e.g. size "w185"
    pub fn poster_url(&self, path: &str, size: &str) -> String {
        format!(
            "{}/{}/{}",
            self.image_base.trim_end_matches('/'),
            size,
            path.trim_start_matches('/')
        )
    }
}
