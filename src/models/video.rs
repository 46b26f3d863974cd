use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct Video {
    pub video_id: String,
    pub channel_id: Option<String>,
    pub playlist_id: String,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Watermark: comments at or before this instant have already been
    /// synced. None means the video has never been swept.
    pub last_fetch_comment: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub video_id: String,
    pub channel_id: Option<String>,
    pub playlist_id: String,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Per-video outcome of a sync sweep. A failing video reports its error
/// here instead of aborting the sweep.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoFetchSummary {
    pub video_id: String,
    pub title: String,
    pub new_comments: usize,
    pub error: Option<String>,
}
