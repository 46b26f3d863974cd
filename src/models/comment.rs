use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use sqlx::FromRow;
use validator::Validate;

pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_HELD_FOR_REVIEW: &str = "heldForReview";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct Comment {
    pub comment_id: String,
    pub video_id: String,
    pub author_display_name: String,
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub moderation_status: String,
    pub is_judi: Option<bool>,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// One row of a bulk comment upsert, as fetched from the provider.
/// Classification fields are never part of the upsert; the statement
/// decides whether to keep or reset them.
#[derive(Debug, Clone)]
pub struct CommentUpsert {
    pub comment_id: String,
    pub video_id: String,
    pub author_display_name: String,
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub moderation_status: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct ModerationRequest {
    #[validate(length(min = 1, message = "comment_ids must not be empty"))]
    pub comment_ids: Vec<String>,
    pub moderation_status: String,
    #[serde(default)]
    pub ban_author: bool,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PredictRequest {
    #[validate(length(min = 1, message = "video_id must not be empty"))]
    pub video_id: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ModerationResponse {
    pub requested: usize,
    pub moderated: usize,
    pub moderated_ids: Vec<String>,
}

/// Classification verdict for one comment. Written back for every scored
/// comment; only flagged ones are returned to the caller.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CommentVerdict {
    pub comment_id: String,
    pub is_judi: bool,
    pub confidence: f64,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PredictResponse {
    pub video_id: String,
    pub scored: usize,
    pub flagged: Vec<CommentVerdict>,
}
