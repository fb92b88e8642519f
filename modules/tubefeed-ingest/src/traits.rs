// Trait seams for the poller's two collaborators.
//
// SearchSource stands in for the upstream search API, VideoSink for the
// store. The poller only sees these, so cycles can be driven in tests with
// scripted responses and an in-memory sink.

use async_trait::async_trait;

use tubefeed_common::Video;
use tubefeed_store::VideoStore;
use youtube_client::{SearchRequest, SearchResponse, YouTubeClient};

#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Fetch one page of results.
    async fn search(&self, request: &SearchRequest) -> youtube_client::Result<SearchResponse>;
}

#[async_trait]
impl SearchSource for YouTubeClient {
    async fn search(&self, request: &SearchRequest) -> youtube_client::Result<SearchResponse> {
        YouTubeClient::search(self, request).await
    }
}

#[async_trait]
pub trait VideoSink: Send + Sync {
    /// Insert or replace a video keyed by its id.
    async fn upsert(&self, video: &Video) -> anyhow::Result<()>;
}

#[async_trait]
impl VideoSink for VideoStore {
    async fn upsert(&self, video: &Video) -> anyhow::Result<()> {
        VideoStore::upsert(self, video).await?;
        Ok(())
    }
}
