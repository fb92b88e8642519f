use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use tubefeed_common::{Video, THUMBNAIL_DEFAULT, THUMBNAIL_HIGH, THUMBNAIL_MEDIUM};
use youtube_client::{SearchItem, SearchRequest, YouTubeError};

use crate::cursor::PaginationCursor;
use crate::keys::KeyRotator;
use crate::traits::{SearchSource, VideoSink};

/// Why a cycle ended without persisting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Network error or timeout talking to the API.
    Transport,
    /// Non-success status other than quota rejection.
    Status,
    /// Body did not decode into a search response.
    Decode,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Transport => write!(f, "transport"),
            FailureStage::Status => write!(f, "status"),
            FailureStage::Decode => write!(f, "decode"),
        }
    }
}

/// How a single polling cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Page fetched and decoded; the cursor moved to `next_token`.
    Persisted {
        fetched: usize,
        written: usize,
        failed: usize,
        skipped: usize,
        next_token: String,
    },
    /// The key in use ran out of quota. The next key is now active and the
    /// cursor is untouched, so the same page is asked for again.
    QuotaRejected { rotated_to: usize },
    /// Nothing changed; the same page and key are retried next cycle.
    Failed { stage: FailureStage, reason: String },
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Persisted {
                fetched,
                written,
                failed,
                skipped,
                ..
            } => write!(
                f,
                "persisted (fetched {fetched}, written {written}, failed {failed}, skipped {skipped})"
            ),
            CycleOutcome::QuotaRejected { rotated_to } => {
                write!(f, "quota rejected, rotated to key #{rotated_to}")
            }
            CycleOutcome::Failed { stage, reason } => write!(f, "failed at {stage}: {reason}"),
        }
    }
}

/// Running totals across cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub cycles: u64,
    pub persisted_cycles: u64,
    pub quota_rejections: u64,
    pub failed_cycles: u64,
    pub videos_written: u64,
    pub write_failures: u64,
}

impl IngestStats {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Persisted {
                written, failed, ..
            } => {
                self.persisted_cycles += 1;
                self.videos_written += *written as u64;
                self.write_failures += *failed as u64;
            }
            CycleOutcome::QuotaRejected { .. } => self.quota_rejections += 1,
            CycleOutcome::Failed { .. } => self.failed_cycles += 1,
        }
    }
}

impl fmt::Display for IngestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycles={} persisted={} quota_rejections={} failed={} videos_written={} write_failures={}",
            self.cycles,
            self.persisted_cycles,
            self.quota_rejections,
            self.failed_cycles,
            self.videos_written,
            self.write_failures
        )
    }
}

/// Owns the ingestion state (key pool, cursor) and runs one cycle at a time.
///
/// `run_cycle` takes `&mut self`, so overlapping cycles are impossible by
/// construction and the state needs no locking.
pub struct Poller {
    source: Arc<dyn SearchSource>,
    sink: Arc<dyn VideoSink>,
    query: String,
    keys: KeyRotator,
    cursor: PaginationCursor,
    stats: IngestStats,
}

impl Poller {
    pub fn new(
        source: Arc<dyn SearchSource>,
        sink: Arc<dyn VideoSink>,
        query: impl Into<String>,
        keys: KeyRotator,
        cursor: PaginationCursor,
    ) -> Self {
        Self {
            source,
            sink,
            query: query.into(),
            keys,
            cursor,
            stats: IngestStats::default(),
        }
    }

    pub fn keys(&self) -> &KeyRotator {
        &self.keys
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Fetch one page, persist its videos and move the cursor.
    ///
    /// - transport/status/decode failure: key and cursor unchanged
    /// - quota rejection: rotate key, cursor unchanged
    /// - success: every item upserted (individual failures are logged and
    ///   counted), then the cursor advances to the returned token
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let outcome = self.cycle().await;
        self.stats.record(&outcome);
        outcome
    }

    async fn cycle(&mut self) -> CycleOutcome {
        let request = self.build_request();
        info!(
            key_index = self.keys.index(),
            page_token = %request.page_token,
            query = %request.query,
            "Polling search API"
        );

        let response = match self.source.search(&request).await {
            Ok(resp) => resp,
            Err(YouTubeError::QuotaExceeded { status, .. }) => {
                let exhausted = self.keys.index();
                self.keys.rotate();
                let rotated_to = self.keys.index();
                warn!(
                    status,
                    exhausted_key = exhausted,
                    rotated_to,
                    pool_size = self.keys.len(),
                    "Quota exhausted, rotating API key"
                );
                return CycleOutcome::QuotaRejected { rotated_to };
            }
            Err(e) => {
                let stage = match &e {
                    YouTubeError::Network(_) => FailureStage::Transport,
                    YouTubeError::Parse(_) => FailureStage::Decode,
                    _ => FailureStage::Status,
                };
                warn!(error = %e, %stage, "Search request failed, will retry same page");
                return CycleOutcome::Failed {
                    stage,
                    reason: e.to_string(),
                };
            }
        };

        let fetched = response.items.len();
        let mut written = 0usize;
        let mut failed = 0usize;
        let mut skipped = 0usize;

        for item in response.items {
            let Some(video) = video_from_item(item) else {
                skipped += 1;
                continue;
            };
            match self.sink.upsert(&video).await {
                Ok(()) => written += 1,
                Err(e) => {
                    failed += 1;
                    warn!(video_id = %video.video_id, error = %e, "Failed to store video");
                }
            }
        }

        self.cursor.advance(response.next_page_token.clone());

        let outcome = CycleOutcome::Persisted {
            fetched,
            written,
            failed,
            skipped,
            next_token: response.next_page_token,
        };
        info!(key_index = self.keys.index(), "Poll cycle {outcome}");
        outcome
    }

    fn build_request(&self) -> SearchRequest {
        let (page_token, published_after) = self.cursor.snapshot();
        SearchRequest {
            key: self.keys.current().to_string(),
            query: self.query.clone(),
            published_after,
            page_token,
        }
    }
}

/// Map an upstream search item to a stored video. Items without a video id
/// (channels, playlists) yield `None`.
pub fn video_from_item(item: SearchItem) -> Option<Video> {
    let Some(video_id) = item.id.video_id.filter(|id| !id.is_empty()) else {
        debug!(title = %item.snippet.title, "Skipping search item without videoId");
        return None;
    };

    let snippet = item.snippet;
    let mut video = Video::new(video_id, snippet.title, snippet.published_at);
    video.description = snippet.description;

    let sizes = [
        (THUMBNAIL_DEFAULT, snippet.thumbnails.default),
        (THUMBNAIL_MEDIUM, snippet.thumbnails.medium),
        (THUMBNAIL_HIGH, snippet.thumbnails.high),
    ];
    // All three labels are always present; a missing size maps to "".
    for (label, thumb) in sizes {
        let url = thumb.map(|t| t.url).unwrap_or_default();
        video.thumbnails.insert(label.to_string(), url);
    }

    Some(video)
}
