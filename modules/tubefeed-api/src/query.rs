use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use tubefeed_common::{Video, VideoPage};
use tubefeed_store::{StoreError, VideoStore};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Read side of the store, as seen by the query layer.
#[async_trait]
pub trait VideoReader: Send + Sync {
    async fn list_page(&self, page: i64, limit: i64) -> Result<VideoPage, StoreError>;
    async fn search_substring(&self, term: &str) -> Result<Vec<Video>, StoreError>;
    async fn search_fulltext(&self, term: &str) -> Result<Vec<Video>, StoreError>;
}

#[async_trait]
impl VideoReader for VideoStore {
    async fn list_page(&self, page: i64, limit: i64) -> Result<VideoPage, StoreError> {
        VideoStore::list_page(self, page, limit).await
    }

    async fn search_substring(&self, term: &str) -> Result<Vec<Video>, StoreError> {
        VideoStore::search_substring(self, term).await
    }

    async fn search_fulltext(&self, term: &str) -> Result<Vec<Video>, StoreError> {
        VideoStore::search_fulltext(self, term).await
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("No videos found")]
    NotFound,

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidArgument(msg) => QueryError::InvalidArgument(msg),
            other => QueryError::Storage(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Case-insensitive substring over title and description.
    Substring,
    /// Language-aware full-text match.
    FullText,
}

#[derive(Debug, Serialize)]
pub struct VideoListing {
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub videos: Vec<Video>,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub videos: Vec<Video>,
}

/// Validates raw request parameters and forwards them to the reader.
#[derive(Clone)]
pub struct QueryService {
    reader: Arc<dyn VideoReader>,
}

impl QueryService {
    pub fn new(reader: Arc<dyn VideoReader>) -> Self {
        Self { reader }
    }

    /// One page of videos, newest first. Missing `page`/`limit` fall back to
    /// 1 and 10; `limit` is capped at 100.
    pub async fn list(
        &self,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> Result<VideoListing, QueryError> {
        let page = parse_positive("page", page, DEFAULT_PAGE)?;
        let limit = parse_positive("limit", limit, DEFAULT_LIMIT)?.min(MAX_LIMIT);

        let result = self.reader.list_page(page, limit).await?;
        if result.videos.is_empty() {
            return Err(QueryError::NotFound);
        }

        Ok(VideoListing {
            page,
            limit,
            total_count: result.total_count,
            videos: result.videos,
        })
    }

    pub async fn search(
        &self,
        term: Option<&str>,
        mode: SearchMode,
    ) -> Result<SearchResults, QueryError> {
        let term = term.unwrap_or_default();
        if term.is_empty() {
            return Err(QueryError::InvalidArgument(
                "Search term is required".to_string(),
            ));
        }

        let videos = match mode {
            SearchMode::Substring => self.reader.search_substring(term).await?,
            SearchMode::FullText => self.reader.search_fulltext(term).await?,
        };
        if videos.is_empty() {
            return Err(QueryError::NotFound);
        }

        Ok(SearchResults { videos })
    }
}

/// Parse an optional positive integer parameter. Absent or blank means
/// `default`; anything else non-numeric or < 1 is rejected.
fn parse_positive(name: &str, raw: Option<&str>, default: i64) -> Result<i64, QueryError> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(QueryError::InvalidArgument(format!(
            "Invalid {name} parameter"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_parameter_uses_default() {
        assert_eq!(parse_positive("page", None, 1).unwrap(), 1);
        assert_eq!(parse_positive("limit", None, 10).unwrap(), 10);
    }

    #[test]
    fn blank_parameter_uses_default() {
        assert_eq!(parse_positive("page", Some(""), 1).unwrap(), 1);
        assert_eq!(parse_positive("limit", Some("  "), 10).unwrap(), 10);
    }

    #[test]
    fn numeric_parameter_is_parsed() {
        assert_eq!(parse_positive("page", Some("3"), 1).unwrap(), 3);
        assert_eq!(parse_positive("page", Some(" 7 "), 1).unwrap(), 7);
    }

    #[test]
    fn non_numeric_or_non_positive_is_invalid() {
        for raw in ["0", "-2", "abc", "1.5"] {
            let err = parse_positive("page", Some(raw), 1).unwrap_err();
            assert!(
                matches!(err, QueryError::InvalidArgument(ref m) if m == "Invalid page parameter"),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn store_invalid_argument_maps_to_invalid_argument() {
        let err: QueryError = StoreError::InvalidArgument("page must be >= 1".into()).into();
        assert!(matches!(err, QueryError::InvalidArgument(_)));
    }
}
