use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One durable refresh-token row per user. The token column holds the
/// AES-GCM ciphertext, never the plaintext. `session_id` points at the
/// Redis session that currently owns this row.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub session_id: String,
    pub user_id: String,
    pub refresh_token_encrypted: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
