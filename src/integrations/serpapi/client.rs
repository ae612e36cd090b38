// src/integrations/serpapi/client.rs
//
// SerpAPI Integration - Google showtimes through search.json
//
// The provider answers 200 with an `error` field for some failures
// (bad key, exhausted quota), so both the status and the body are checked.

use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::Deserialize;

use crate::config::{HttpConfig, ShowtimeConfig};
use crate::domain::ShowtimeDay;
use crate::error::{AppError, AppResult};
use crate::services::ShowtimeProvider;

#[derive(Debug, Deserialize)]
struct ShowtimeSearchResponse {
    #[serde(default)]
    showtimes: Vec<ShowtimeDay>,
    error: Option<String>,
}

pub struct SerpApiClient {
    base_url: String,
    http_client: Client,
    api_key: String,
    language: String,
}

impl SerpApiClient {
    pub fn new(config: &ShowtimeConfig, http: &HttpConfig) -> AppResult<Self> {
        let http_client = Client::builder().timeout(http.timeout()).build()?;

        if config.api_key.is_empty() {
            log::warn!("No SerpAPI key configured, showtime searches will be rejected");
        }

        Ok(Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            http_client,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    fn search_endpoint(&self, query: &str) -> AppResult<Url> {
        Url::parse_with_params(
            &format!("{}/search.json", self.base_url),
            &[
                ("q", query),
                ("hl", self.language.as_str()),
                ("api_key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| AppError::Config(format!("Invalid SerpAPI URL: {}", e)))
    }
}

fn decode(body: &str) -> AppResult<Vec<ShowtimeDay>> {
    let response: ShowtimeSearchResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Network(format!("Failed to parse SerpAPI response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(AppError::Network(format!("SerpAPI error: {}", error)));
    }
    Ok(response.showtimes)
}

#[async_trait]
impl ShowtimeProvider for SerpApiClient {
    async fn search(&self, query: &str) -> AppResult<Vec<ShowtimeDay>> {
        let url = self.search_endpoint(query)?;
        log::debug!("SerpAPI GET {}", url.path());

        let response = self
            .http_client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::Network(format!("SerpAPI request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await?;

        // Error bodies carry a readable message; prefer it over the bare status
        match decode(&body) {
            Ok(days) if status.is_success() => Ok(days),
            Ok(_) => Err(AppError::Network(format!("SerpAPI returned status: {}", status))),
            Err(err) => Err(err),
        }
    }
}
