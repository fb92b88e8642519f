use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thumbnail size labels stored in [`Thumbnails`].
pub const THUMBNAIL_DEFAULT: &str = "default";
pub const THUMBNAIL_MEDIUM: &str = "medium";
pub const THUMBNAIL_HIGH: &str = "high";

/// Size label -> image URL. Stored as opaque JSON, never queried by key.
pub type Thumbnails = BTreeMap<String, String>;

/// One ingested search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    pub thumbnails: Thumbnails,
    /// Set by the store on first write; not part of the public JSON shape.
    #[serde(skip)]
    pub ingested_at: Option<DateTime<Utc>>,
}

impl Video {
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            description: None,
            published_at,
            thumbnails: Thumbnails::new(),
            ingested_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_thumbnail(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.thumbnails.insert(label.into(), url.into());
        self
    }
}

/// One page of a listing plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoPage {
    pub videos: Vec<Video>,
    pub total_count: i64,
}
