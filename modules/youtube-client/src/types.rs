use chrono::{DateTime, Utc};
use serde::Deserialize;

// --- Request ---

/// Parameters for one `search.list` call.
///
/// `part`, `type` and `order` are fixed by the client; everything that varies
/// between polling cycles lives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub key: String,
    pub query: String,
    pub published_after: DateTime<Utc>,
    /// Continuation token from the previous page. Empty means the first page.
    pub page_token: String,
}

impl SearchRequest {
    /// Query string pairs in the order the API documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.key.clone()),
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("order", "date".to_string()),
            (
                "publishedAfter",
                self.published_after
                    .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            ),
            ("q", self.query.clone()),
            ("pageToken", self.page_token.clone()),
        ]
    }
}

// --- Response ---

/// Body of a successful `search.list` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    /// Absent on the last page; treated as "start over".
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: ResourceId,
    pub snippet: Snippet,
}

/// Search results can point at videos, channels or playlists; only videos
/// carry `videoId`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceId {
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snippet {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub thumbnails: SnippetThumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnippetThumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "kind": "youtube#searchListResponse",
        "nextPageToken": "CAUQAA",
        "items": [
            {
                "id": { "kind": "youtube#video", "videoId": "abc123" },
                "snippet": {
                    "publishedAt": "2024-03-01T12:30:00Z",
                    "title": "Cricket highlights",
                    "description": "Day one",
                    "thumbnails": {
                        "default": { "url": "https://i.ytimg.com/vi/abc123/default.jpg" },
                        "medium": { "url": "https://i.ytimg.com/vi/abc123/mqdefault.jpg" },
                        "high": { "url": "https://i.ytimg.com/vi/abc123/hqdefault.jpg" }
                    }
                }
            },
            {
                "id": { "kind": "youtube#channel", "channelId": "UC1" },
                "snippet": {
                    "publishedAt": "2024-02-01T00:00:00Z",
                    "title": "A channel"
                }
            }
        ]
    }"#;

    #[test]
    fn decodes_search_response() {
        let resp: SearchResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(resp.next_page_token, "CAUQAA");
        assert_eq!(resp.items.len(), 2);

        let first = &resp.items[0];
        assert_eq!(first.id.video_id.as_deref(), Some("abc123"));
        assert_eq!(first.snippet.description.as_deref(), Some("Day one"));
        assert_eq!(
            first.snippet.thumbnails.high.as_ref().map(|t| t.url.as_str()),
            Some("https://i.ytimg.com/vi/abc123/hqdefault.jpg")
        );

        assert!(resp.items[1].id.video_id.is_none());
        assert!(resp.items[1].snippet.thumbnails.default.is_none());
    }

    #[test]
    fn missing_next_page_token_is_empty() {
        let resp: SearchResponse = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(resp.items.is_empty());
        assert_eq!(resp.next_page_token, "");
    }

    #[test]
    fn bad_timestamp_fails_decode() {
        let body = r#"{"items": [{"id": {"videoId": "x"}, "snippet": {"title": "t", "publishedAt": "yesterday"}}]}"#;
        assert!(serde_json::from_str::<SearchResponse>(body).is_err());
    }

    #[test]
    fn query_pairs_carry_fixed_parameters() {
        let req = SearchRequest {
            key: "k1".into(),
            query: "cricket".into(),
            published_after: "2024-01-01T00:00:00Z".parse().unwrap(),
            page_token: "T1".into(),
        };
        let pairs = req.query_pairs();
        let get = |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("key"), Some("k1"));
        assert_eq!(get("part"), Some("snippet"));
        assert_eq!(get("type"), Some("video"));
        assert_eq!(get("order"), Some("date"));
        assert_eq!(get("publishedAfter"), Some("2024-01-01T00:00:00Z"));
        assert_eq!(get("q"), Some("cricket"));
        assert_eq!(get("pageToken"), Some("T1"));
    }
}
