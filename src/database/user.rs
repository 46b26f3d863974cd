use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::{UpsertUser, User};

impl PostgresRepository {
    /// Insert-or-update on login. Channel fields are only overwritten when
    /// the new value is present, so a failed channel lookup on a later
    /// login does not wipe previously stored channel metadata.
    pub async fn upsert_user(&self, user: &UpsertUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, name, email, channel_id, channel_name, custom_url, playlist_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                channel_id = COALESCE(EXCLUDED.channel_id, users.channel_id),
                channel_name = COALESCE(EXCLUDED.channel_name, users.channel_name),
                custom_url = COALESCE(EXCLUDED.custom_url, users.custom_url),
                playlist_id = COALESCE(EXCLUDED.playlist_id, users.playlist_id),
                updated_at = now()
            RETURNING user_id, name, email, channel_id, channel_name, custom_url, playlist_id,
                      created_at, updated_at
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.channel_id)
        .bind(&user.channel_name)
        .bind(&user.custom_url)
        .bind(&user.playlist_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, channel_id, channel_name, custom_url, playlist_id,
                   created_at, updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
