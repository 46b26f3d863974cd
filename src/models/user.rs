use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use sqlx::FromRow;

/// Channel owner. `user_id` is the Google account subject (`sub` claim),
/// not a locally minted id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    pub custom_url: Option<String>,
    pub playlist_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields known at login time. Channel fields stay None when the
/// best-effort channel lookup fails.
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    pub custom_url: Option<String>,
    pub playlist_id: Option<String>,
}
