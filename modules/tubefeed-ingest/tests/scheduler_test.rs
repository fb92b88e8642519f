//! Scheduler timing under paused tokio time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tubefeed_ingest::testing::{search_response, MockSearchSource, MockVideoSink};
use tubefeed_ingest::{KeyRotator, PaginationCursor, Poller, Scheduler, SearchSource};
use youtube_client::{SearchRequest, SearchResponse};

fn floor() -> DateTime<Utc> {
    "2024-01-01T00:00:00Z".parse().unwrap()
}

fn poller_with(source: Arc<dyn SearchSource>) -> Poller {
    Poller::new(
        source,
        Arc::new(MockVideoSink::new()),
        "cricket",
        KeyRotator::new(vec!["key-0".into()]).unwrap(),
        PaginationCursor::new(floor()),
    )
}

#[tokio::test(start_paused = true)]
async fn fires_once_per_interval_after_first_interval() {
    let source = Arc::new(
        MockSearchSource::new()
            .then_ok(search_response(Vec::new(), "T1"))
            .then_ok(search_response(Vec::new(), "T2"))
            .then_ok(search_response(Vec::new(), "T3")),
    );
    let handle = Scheduler::new(Duration::from_secs(10)).spawn(poller_with(source.clone()));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(source.requests().is_empty(), "no cycle before first interval");

    tokio::time::sleep(Duration::from_secs(30)).await;
    let poller = handle.stop().await.unwrap();

    assert_eq!(source.requests().len(), 3);
    assert_eq!(poller.cursor().next_token(), "T3");
    assert_eq!(poller.stats().cycles, 3);
}

#[tokio::test(start_paused = true)]
async fn stop_before_first_tick_runs_no_cycles() {
    let source = Arc::new(MockSearchSource::new());
    let handle = Scheduler::new(Duration::from_secs(10)).spawn(poller_with(source.clone()));

    let poller = handle.stop().await.unwrap();

    assert!(source.requests().is_empty());
    assert_eq!(poller.stats().cycles, 0);
}

/// Takes longer than the scheduler interval and tracks concurrent calls.
struct SlowSource {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl SearchSource for SlowSource {
    async fn search(&self, _request: &SearchRequest) -> youtube_client::Result<SearchResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(search_response(Vec::new(), "next"))
    }
}

#[tokio::test(start_paused = true)]
async fn slow_cycles_never_overlap() {
    let source = Arc::new(SlowSource {
        delay: Duration::from_secs(25),
        in_flight: AtomicUsize::new(0),
        max_in_flight: AtomicUsize::new(0),
        calls: AtomicUsize::new(0),
    });
    let handle = Scheduler::new(Duration::from_secs(10)).spawn(poller_with(source.clone()));

    tokio::time::sleep(Duration::from_secs(120)).await;
    handle.stop().await.unwrap();

    assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
    // Missed ticks are skipped, so far fewer than 12 cycles started.
    let calls = source.calls.load(Ordering::SeqCst);
    assert!(calls >= 2 && calls < 12, "calls = {calls}");
}
