// Test mocks for the ingest pipeline.
//
// - MockSearchSource (SearchSource): scripted responses, records requests
// - MockVideoSink (VideoSink): in-memory map keyed by video id, can be told
//   to fail specific ids
//
// Plus builders for search items and responses.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use anyhow::bail;
use async_trait::async_trait;

use tubefeed_common::Video;
use youtube_client::{
    ResourceId, SearchItem, SearchRequest, SearchResponse, Snippet, SnippetThumbnails, Thumbnail,
    YouTubeError,
};

use crate::traits::{SearchSource, VideoSink};

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// A video search item with all three thumbnails set.
pub fn search_item(video_id: &str, title: &str, published_at: &str) -> SearchItem {
    let thumb = |name: &str| {
        Some(Thumbnail {
            url: format!("https://i.ytimg.com/vi/{video_id}/{name}.jpg"),
        })
    };
    SearchItem {
        id: ResourceId {
            video_id: Some(video_id.to_string()),
        },
        snippet: Snippet {
            title: title.to_string(),
            description: Some(format!("{title} description")),
            published_at: published_at
                .parse()
                .unwrap_or_else(|_| panic!("bad test timestamp {published_at}")),
            thumbnails: SnippetThumbnails {
                default: thumb("default"),
                medium: thumb("mqdefault"),
                high: thumb("hqdefault"),
            },
        },
    }
}

pub fn search_response(items: Vec<SearchItem>, next_page_token: &str) -> SearchResponse {
    SearchResponse {
        items,
        next_page_token: next_page_token.to_string(),
    }
}

pub fn quota_error() -> YouTubeError {
    YouTubeError::QuotaExceeded {
        status: 403,
        message: "quotaExceeded".to_string(),
    }
}

// ---------------------------------------------------------------------------
// MockSearchSource
// ---------------------------------------------------------------------------

/// Returns scripted results in order. Once the script runs out every call
/// fails with a network error.
pub struct MockSearchSource {
    script: Mutex<VecDeque<youtube_client::Result<SearchResponse>>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockSearchSource {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn then_ok(self, response: SearchResponse) -> Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn then_err(self, err: YouTubeError) -> Self {
        self.script.lock().unwrap().push_back(Err(err));
        self
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockSearchSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchSource for MockSearchSource {
    async fn search(&self, request: &SearchRequest) -> youtube_client::Result<SearchResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(YouTubeError::Network("no scripted response".to_string())))
    }
}

// ---------------------------------------------------------------------------
// MockVideoSink
// ---------------------------------------------------------------------------

/// In-memory upsert target. Ids registered with `fail_on` return an error.
pub struct MockVideoSink {
    videos: Mutex<HashMap<String, Video>>,
    failing: HashSet<String>,
    writes: Mutex<usize>,
}

impl MockVideoSink {
    pub fn new() -> Self {
        Self {
            videos: Mutex::new(HashMap::new()),
            failing: HashSet::new(),
            writes: Mutex::new(0),
        }
    }

    pub fn fail_on(mut self, video_id: &str) -> Self {
        self.failing.insert(video_id.to_string());
        self
    }

    pub fn get(&self, video_id: &str) -> Option<Video> {
        self.videos.lock().unwrap().get(video_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.videos.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of upsert calls, including failed ones.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl Default for MockVideoSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoSink for MockVideoSink {
    async fn upsert(&self, video: &Video) -> anyhow::Result<()> {
        *self.writes.lock().unwrap() += 1;
        if self.failing.contains(&video.video_id) {
            bail!("constraint violation for {}", video.video_id);
        }
        self.videos
            .lock()
            .unwrap()
            .insert(video.video_id.clone(), video.clone());
        Ok(())
    }
}
