use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::refresh_token::RefreshTokenRecord;
use chrono::{DateTime, Utc};

impl PostgresRepository {
    /// One active row per user: a fresh login replaces the stored token,
    /// session pointer and expiry wholesale.
    pub async fn upsert_refresh_token(
        &self,
        user_id: &str,
        session_id: &str,
        refresh_token_encrypted: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, AppError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            INSERT INTO refresh_tokens (user_id, session_id, refresh_token_encrypted, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                session_id = EXCLUDED.session_id,
                refresh_token_encrypted = EXCLUDED.refresh_token_encrypted,
                expires_at = EXCLUDED.expires_at,
                updated_at = now()
            RETURNING id, session_id, user_id, refresh_token_encrypted, expires_at,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(session_id)
        .bind(refresh_token_encrypted)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn get_refresh_token_by_session(&self, session_id: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT id, session_id, user_id, refresh_token_encrypted, expires_at,
                   created_at, updated_at
            FROM refresh_tokens
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Repoint the row from the session that just expired to the freshly
    /// minted one, extending the expiry by a day. Conditional on the old
    /// session id: when two renewals race, exactly one update matches and
    /// the loser must discard its session.
    pub async fn repoint_session(&self, user_id: &str, old_session_id: &str, new_session_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET session_id = $3,
                expires_at = now() + interval '1 day',
                updated_at = now()
            WHERE user_id = $1 AND session_id = $2
            "#,
        )
        .bind(user_id)
        .bind(old_session_id)
        .bind(new_session_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_refresh_token(&self, user_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
