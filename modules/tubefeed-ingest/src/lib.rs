//! Ingestion side of tubefeed: a fixed-interval scheduler drives a single
//! poller that walks the upstream search results page by page, rotating API
//! keys when quota runs out, and upserts every video into the store.

pub mod cursor;
pub mod keys;
pub mod poller;
pub mod scheduler;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use cursor::PaginationCursor;
pub use keys::KeyRotator;
pub use poller::{CycleOutcome, FailureStage, IngestStats, Poller};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use traits::{SearchSource, VideoSink};
