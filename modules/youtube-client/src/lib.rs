pub mod error;
pub mod types;

pub use error::{Result, YouTubeError};
pub use types::{
    ResourceId, SearchItem, SearchRequest, SearchResponse, Snippet, SnippetThumbnails, Thumbnail,
};

use std::time::Duration;

use reqwest::StatusCode;

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3/search";

pub struct YouTubeClient {
    client: reqwest::Client,
    base_url: String,
}

impl YouTubeClient {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the client at a different search endpoint (local fakes, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch one page of search results.
    ///
    /// A 403 or 429 comes back as [`YouTubeError::QuotaExceeded`] so callers
    /// can switch keys instead of retrying with the same one.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&request.query_pairs())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if let Some(err) = classify_status(status, &body) {
            return Err(err);
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            items = parsed.items.len(),
            next_page_token = %parsed.next_page_token,
            "YouTube search page decoded"
        );
        Ok(parsed)
    }
}

/// Map a non-success status to the matching error. `None` means success.
fn classify_status(status: StatusCode, body: &str) -> Option<YouTubeError> {
    if status.is_success() {
        return None;
    }
    let message = body.to_string();
    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        return Some(YouTubeError::QuotaExceeded {
            status: status.as_u16(),
            message,
        });
    }
    Some(YouTubeError::Api {
        status: status.as_u16(),
        message,
    })
}
