use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::pagination::PaginationParams;
use crate::models::video::{NewVideo, Video};

#[async_trait::async_trait]
pub trait VideoRepository {
    async fn insert_video_if_absent(&self, video: &NewVideo) -> Result<Video, AppError>;
    async fn get_video(&self, video_id: &str) -> Result<Option<Video>, AppError>;
    async fn touch_last_fetch_comment(&self, video_id: &str) -> Result<(), AppError>;
    async fn list_videos(&self, playlist_id: &str, params: &PaginationParams) -> Result<Vec<Video>, AppError>;
    async fn count_videos(&self, playlist_id: &str) -> Result<i64, AppError>;
}

#[async_trait::async_trait]
impl VideoRepository for PostgresRepository {
    /// Discovery insert. Re-discovering a known video never overwrites its
    /// stored metadata or watermark; the existing row is returned as-is.
    async fn insert_video_if_absent(&self, video: &NewVideo) -> Result<Video, AppError> {
        sqlx::query(
            r#"
            INSERT INTO videos (video_id, channel_id, playlist_id, title, description, published_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (video_id) DO NOTHING
            "#,
        )
        .bind(&video.video_id)
        .bind(&video.channel_id)
        .bind(&video.playlist_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.published_at)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, Video>(
            r#"
            SELECT video_id, channel_id, playlist_id, title, description, published_at,
                   last_fetch_comment, created_at, updated_at
            FROM videos
            WHERE video_id = $1
            "#,
        )
        .bind(&video.video_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_video(&self, video_id: &str) -> Result<Option<Video>, AppError> {
        let row = sqlx::query_as::<_, Video>(
            r#"
            SELECT video_id, channel_id, playlist_id, title, description, published_at,
                   last_fetch_comment, created_at, updated_at
            FROM videos
            WHERE video_id = $1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Advance the comment watermark to now(). Runs as the last step of a
    /// sync pass; interrupted passes leave the old watermark and the next
    /// pass re-processes the same window idempotently.
    async fn touch_last_fetch_comment(&self, video_id: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE videos
            SET last_fetch_comment = now(), updated_at = now()
            WHERE video_id = $1
            "#,
        )
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_videos(&self, playlist_id: &str, params: &PaginationParams) -> Result<Vec<Video>, AppError> {
        let rows = sqlx::query_as::<_, Video>(
            r#"
            SELECT video_id, channel_id, playlist_id, title, description, published_at,
                   last_fetch_comment, created_at, updated_at
            FROM videos
            WHERE playlist_id = $1
            ORDER BY published_at DESC NULLS LAST, video_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(playlist_id)
        .bind(params.effective_limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_videos(&self, playlist_id: &str) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM videos WHERE playlist_id = $1")
            .bind(playlist_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
