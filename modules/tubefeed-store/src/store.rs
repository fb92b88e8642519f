use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;

use tubefeed_common::{Thumbnails, Video, VideoPage};

use crate::error::{Result, StoreError};

/// Expression shared by the GIN index and full-text queries. Must stay
/// byte-identical to the index definition in the migrations or Postgres
/// won't use the index.
const TSVECTOR_EXPR: &str = "to_tsvector('english', title || ' ' || coalesce(description, ''))";

#[derive(Clone)]
pub struct VideoStore {
    pool: PgPool,
}

/// A row from the videos table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct VideoRow {
    video_id: String,
    title: String,
    description: Option<String>,
    published_at: DateTime<Utc>,
    thumbnails: Json<Thumbnails>,
    ingested_at: DateTime<Utc>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            video_id: row.video_id,
            title: row.title,
            description: row.description,
            published_at: row.published_at,
            thumbnails: row.thumbnails.0,
            ingested_at: Some(row.ingested_at),
        }
    }
}

impl VideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to Postgres. Callers treat failure here as fatal.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Insert a video, or replace every mutable field if the id already exists.
    /// `ingested_at` keeps its first-write value.
    pub async fn upsert(&self, video: &Video) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO videos (video_id, title, description, published_at, thumbnails)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (video_id) DO UPDATE SET
                title        = EXCLUDED.title,
                description  = EXCLUDED.description,
                published_at = EXCLUDED.published_at,
                thumbnails   = EXCLUDED.thumbnails
            "#,
        )
        .bind(&video.video_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.published_at)
        .bind(Json(&video.thumbnails))
        .execute(&self.pool)
        .await?;

        debug!(video_id = %video.video_id, "Video upserted");
        Ok(())
    }

    /// Fetch a single video by id, `ingested_at` included.
    #[cfg(any(test, feature = "test-support"))]
    pub async fn get(&self, video_id: &str) -> Result<Option<Video>> {
        let row = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT video_id, title, description, published_at, thumbnails, ingested_at
            FROM videos
            WHERE video_id = $1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Video::from))
    }

    /// Page `page` (1-based) of `limit` videos, newest first, plus the total count.
    pub async fn list_page(&self, page: i64, limit: i64) -> Result<VideoPage> {
        let offset = page_offset(page, limit)?;

        let rows = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT video_id, title, description, published_at, thumbnails, ingested_at
            FROM videos
            ORDER BY published_at DESC, video_id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total_count = self.count().await?;

        Ok(VideoPage {
            videos: rows.into_iter().map(Video::from).collect(),
            total_count,
        })
    }

    /// Number of stored videos.
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM videos")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Videos whose title or description contains `term`, ignoring case.
    pub async fn search_substring(&self, term: &str) -> Result<Vec<Video>> {
        let pattern = format!("%{}%", escape_like(term));
        let rows = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT video_id, title, description, published_at, thumbnails, ingested_at
            FROM videos
            WHERE title ILIKE $1 OR description ILIKE $1
            ORDER BY published_at DESC, video_id ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Video::from).collect())
    }

    /// Videos matching `term` under English full-text rules (stemming, stop
    /// words), most relevant first. Not guaranteed to be a substring match.
    pub async fn search_fulltext(&self, term: &str) -> Result<Vec<Video>> {
        let sql = format!(
            r#"
            SELECT video_id, title, description, published_at, thumbnails, ingested_at
            FROM videos
            WHERE {TSVECTOR_EXPR} @@ plainto_tsquery('english', $1)
            ORDER BY ts_rank({TSVECTOR_EXPR}, plainto_tsquery('english', $1)) DESC,
                     published_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, VideoRow>(&sql)
            .bind(term)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Video::from).collect())
    }
}

/// Row offset for a 1-based page. Rejects `page < 1` and `limit < 1`.
pub fn page_offset(page: i64, limit: i64) -> Result<i64> {
    if page < 1 {
        return Err(StoreError::InvalidArgument(format!(
            "page must be >= 1, got {page}"
        )));
    }
    if limit < 1 {
        return Err(StoreError::InvalidArgument(format!(
            "limit must be >= 1, got {limit}"
        )));
    }
    (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| StoreError::InvalidArgument("page * limit overflows".to_string()))
}

/// Escape `%`, `_` and `\` so the term is matched literally inside ILIKE.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
