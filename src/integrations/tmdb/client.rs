// src/integrations/tmdb/client.rs
//
// TMDB API Integration
//
// ARCHITECTURE:
// - REST client for the TMDB v3 API
// - One GET per call, no retries, no caching
// - Maps response envelopes -> catalog types (NO domain mutation)
// - Used by MovieCatalogService through the MovieProvider port
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - The API key never appears in logs

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{HttpConfig, TmdbConfig};
use crate::domain::{Credits, ListCategory, Movie, Page, Video};
use crate::error::{AppError, AppResult};
use crate::services::MovieProvider;

/// Paginated list envelope (search, curated lists, similar)
#[derive(Debug, Deserialize)]
struct MovieListResponse {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    results: Vec<Movie>,
    total_pages: Option<u32>,
}

impl MovieListResponse {
    fn into_page(self, requested: u32) -> Page<Movie> {
        Page {
            page: if self.page == 0 { requested } else { self.page },
            items: self.results,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    results: Vec<Video>,
}

/// TMDB API Client
pub struct TmdbClient {
    base_url: String,
    http_client: Client,
    api_key: String,
    language: String,
    region: Option<String>,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig, http: &HttpConfig) -> AppResult<Self> {
        let http_client = Client::builder().timeout(http.timeout()).build()?;

        if config.api_key.is_empty() {
            log::warn!("No TMDB API key configured, requests will be rejected");
        }

        Ok(Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            http_client,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            region: config.region.clone(),
        })
    }

    // ========================================================================
    // INTERNAL: URL building and execution
    // ========================================================================

    /// `{base}{path}?api_key=..&language=..` plus `extra` parameters
    fn endpoint(&self, path: &str, extra: &[(&str, String)]) -> AppResult<Url> {
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
        ];
        params.extend(extra.iter().cloned());

        Url::parse_with_params(&format!("{}{}", self.base_url, path), &params)
            .map_err(|e| AppError::Config(format!("Invalid TMDB URL: {}", e)))
    }

    fn list_endpoint(&self, category: ListCategory, page: u32) -> AppResult<Url> {
        let mut extra = vec![("page", page.to_string())];
        if let Some(region) = &self.region {
            extra.push(("region", region.clone()));
        }
        self.endpoint(&format!("/3/movie/{}", category.path_segment()), &extra)
    }

    fn search_endpoint(&self, query: &str, page: u32) -> AppResult<Url> {
        self.endpoint(
            "/3/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        let path = url.path().to_string();
        log::debug!("TMDB GET {}", path);

        let response = self
            .http_client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::Network(format!("TMDB request to {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "TMDB returned status {} for {}",
                response.status(),
                path
            )));
        }

        let body = response.text().await?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> AppResult<T> {
    serde_json::from_str(body)
        .map_err(|e| AppError::Network(format!("Failed to parse TMDB response: {}", e)))
}

#[async_trait]
impl MovieProvider for TmdbClient {
    async fn movie(&self, movie_id: i64) -> AppResult<Movie> {
        let url = self.endpoint(&format!("/3/movie/{}", movie_id), &[])?;
        self.get_json(url).await
    }

    async fn credits(&self, movie_id: i64) -> AppResult<Credits> {
        let url = self.endpoint(&format!("/3/movie/{}/credits", movie_id), &[])?;
        self.get_json(url).await
    }

    async fn similar(&self, movie_id: i64, page: u32) -> AppResult<Page<Movie>> {
        let url = self.endpoint(
            &format!("/3/movie/{}/similar", movie_id),
            &[("page", page.to_string())],
        )?;
        let response: MovieListResponse = self.get_json(url).await?;
        Ok(response.into_page(page))
    }

    async fn videos(&self, movie_id: i64) -> AppResult<Vec<Video>> {
        let url = self.endpoint(&format!("/3/movie/{}/videos", movie_id), &[])?;
        let response: VideoListResponse = self.get_json(url).await?;
        Ok(response.results)
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<Page<Movie>> {
        let url = self.search_endpoint(query, page)?;
        let response: MovieListResponse = self.get_json(url).await?;
        Ok(response.into_page(page))
    }

    async fn list(&self, category: ListCategory, page: u32) -> AppResult<Page<Movie>> {
        let url = self.list_endpoint(category, page)?;
        let response: MovieListResponse = self.get_json(url).await?;
        Ok(response.into_page(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(region: Option<&str>) -> TmdbClient {
        let config = TmdbConfig {
            api_key: "test-key".to_string(),
            region: region.map(str::to_string),
            ..TmdbConfig::default()
        };
        TmdbClient::new(&config, &HttpConfig::default()).unwrap()
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned())
    }

    #[test]
    fn test_search_url() {
        let url = client(None).search_endpoint("The Matrix", 2).unwrap();

        assert_eq!(url.host_str(), Some("api.themoviedb.org"));
        assert_eq!(url.path(), "/3/search/movie");
        assert_eq!(query_value(&url, "query").as_deref(), Some("The Matrix"));
        assert_eq!(query_value(&url, "page").as_deref(), Some("2"));
        assert_eq!(query_value(&url, "api_key").as_deref(), Some("test-key"));
        assert_eq!(query_value(&url, "language").as_deref(), Some("en-US"));
        assert!(query_value(&url, "region").is_none());
    }

    #[test]
    fn test_curated_list_url_carries_region() {
        let url = client(Some("AU")).list_endpoint(ListCategory::NowPlaying, 1).unwrap();

        assert_eq!(url.path(), "/3/movie/now_playing");
        assert_eq!(query_value(&url, "region").as_deref(), Some("AU"));
    }

    #[test]
    fn test_decode_movie_list_page() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 603, "title": "The Matrix", "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
                 "release_date": "1999-03-30", "overview": "Set in the 22nd century", "vote_average": 8.2},
                {"id": 604, "title": "The Matrix Reloaded", "poster_path": null}
            ],
            "total_pages": 7,
            "total_results": 123
        }"#;

        let page = decode::<MovieListResponse>(body).unwrap().into_page(1);

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, Some(7));
        assert!(page.items[1].poster_path.is_none());
    }

    #[test]
    fn test_decode_movie_details() {
        let body = r#"{"id": 603, "title": "The Matrix", "status": "Released", "runtime": 136,
                       "backdrop_path": "/backdrop.jpg", "genres": [{"id": 28, "name": "Action"}]}"#;

        let movie: Movie = decode(body).unwrap();

        assert_eq!(movie.runtime, Some(136));
        assert_eq!(movie.status.as_deref(), Some("Released"));
    }

    #[test]
    fn test_decode_credits_and_videos() {
        let credits: Credits = decode(
            r#"{"id": 603,
                "cast": [{"id": 6384, "name": "Keanu Reeves", "character": "Neo", "profile_path": "/keanu.jpg"}],
                "crew": [{"id": 9339, "name": "Lilly Wachowski", "job": "Director"}]}"#,
        )
        .unwrap();
        assert_eq!(credits.cast[0].character.as_deref(), Some("Neo"));
        assert_eq!(credits.crew_with_job("Director").count(), 1);

        let videos: VideoListResponse = decode(
            r#"{"id": 603, "results": [{"name": "Trailer", "key": "vKQi3bBA1y8", "site": "YouTube", "type": "Trailer"}]}"#,
        )
        .unwrap();
        assert_eq!(videos.results[0].key, "vKQi3bBA1y8");
    }

    #[test]
    fn test_malformed_body_is_a_network_error() {
        assert!(matches!(decode::<Movie>("<html>"), Err(AppError::Network(_))));
    }
}
