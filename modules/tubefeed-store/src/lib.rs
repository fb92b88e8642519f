//! Postgres-backed video store.
//!
//! One row per `video_id`. Writes are upserts, reads are ordered newest first.
//! Full-text search goes through the GIN index created by the embedded
//! migrations; substring search is a plain `ILIKE` scan.

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{page_offset, VideoStore};
