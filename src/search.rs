//! News search API client.
//!
//! Talks to the Naver News Search API: one GET per query, credentials in
//! request headers, results sorted by recency. A non-2xx response surfaces
//! as a recoverable [`SearchError`] so the collector can skip the query and
//! keep going.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::SearchError;
use crate::models::RawItem;
use crate::utils::truncate_for_log;

const SEARCH_URL: &str = "https://openapi.naver.com/v1/search/news.json";
const CLIENT_ID_HEADER: &str = "X-Naver-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-Naver-Client-Secret";
const SEARCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// The narrow search seam the collector depends on. Tests substitute a stub;
/// production uses [`NaverNewsClient`].
pub trait NewsSearch {
    async fn search(&self, query: &str) -> Result<Vec<RawItem>, SearchError>;
}

/// Naver News Search API client.
#[derive(Debug, Clone)]
pub struct NaverNewsClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    page_size: u32,
}

impl NaverNewsClient {
    pub fn new(client_id: String, client_secret: String, page_size: u32) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            client_id,
            client_secret,
            page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RawItem>,
}

impl NewsSearch for NaverNewsClient {
    #[instrument(level = "debug", skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<RawItem>, SearchError> {
        let url = format!(
            "{}?query={}&display={}&sort=date",
            SEARCH_URL,
            urlencoding::encode(query),
            self.page_size
        );

        let response = self
            .http
            .get(&url)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .header(CLIENT_SECRET_HEADER, &self.client_secret)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = truncate_for_log(&response.text().await.unwrap_or_default(), 300);
            return Err(SearchError::Api { status, message });
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        debug!(query, count = parsed.items.len(), "Search results");
        Ok(parsed.items)
    }
}
