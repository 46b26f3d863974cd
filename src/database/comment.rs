use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::comment::{Comment, CommentUpsert, CommentVerdict, STATUS_PUBLISHED};
use crate::models::pagination::PaginationParams;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait CommentRepository {
    async fn upsert_comments(&self, batch: &[CommentUpsert]) -> Result<u64, AppError>;
    async fn list_published_comments(&self, video_id: &str, params: &PaginationParams) -> Result<Vec<Comment>, AppError>;
    async fn count_published_comments(&self, video_id: &str) -> Result<i64, AppError>;
    async fn all_published_comments(&self, video_id: &str) -> Result<Vec<Comment>, AppError>;
    async fn set_moderation_status(&self, comment_ids: &[String], status: &str) -> Result<u64, AppError>;
    async fn apply_classifications(&self, verdicts: &[CommentVerdict]) -> Result<u64, AppError>;
}

#[async_trait::async_trait]
impl CommentRepository for PostgresRepository {
    /// Bulk conditional upsert via UNNEST. Classification fields are kept
    /// when `(text, author)` are unchanged and reset to NULL when either
    /// changed, in the same statement, so there is no read-then-write
    /// window. Returns the number of rows written.
    async fn upsert_comments(&self, batch: &[CommentUpsert]) -> Result<u64, AppError> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut comment_ids = Vec::with_capacity(batch.len());
        let mut video_ids = Vec::with_capacity(batch.len());
        let mut authors = Vec::with_capacity(batch.len());
        let mut texts = Vec::with_capacity(batch.len());
        let mut published: Vec<DateTime<Utc>> = Vec::with_capacity(batch.len());
        let mut updated: Vec<DateTime<Utc>> = Vec::with_capacity(batch.len());
        let mut statuses = Vec::with_capacity(batch.len());

        for row in batch {
            comment_ids.push(row.comment_id.clone());
            video_ids.push(row.video_id.clone());
            authors.push(row.author_display_name.clone());
            texts.push(row.text.clone());
            published.push(row.published_at);
            updated.push(row.updated_at);
            statuses.push(row.moderation_status.clone());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO comments
                (comment_id, video_id, author_display_name, text, published_at, updated_at, moderation_status)
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::text[], $4::text[],
                $5::timestamptz[], $6::timestamptz[], $7::text[]
            )
            ON CONFLICT (comment_id) DO UPDATE SET
                author_display_name = EXCLUDED.author_display_name,
                text = EXCLUDED.text,
                published_at = EXCLUDED.published_at,
                updated_at = EXCLUDED.updated_at,
                moderation_status = EXCLUDED.moderation_status,
                is_judi = CASE
                    WHEN comments.text = EXCLUDED.text
                         AND comments.author_display_name = EXCLUDED.author_display_name
                    THEN comments.is_judi
                    ELSE NULL
                END,
                confidence = CASE
                    WHEN comments.text = EXCLUDED.text
                         AND comments.author_display_name = EXCLUDED.author_display_name
                    THEN comments.confidence
                    ELSE NULL
                END
            "#,
        )
        .bind(&comment_ids)
        .bind(&video_ids)
        .bind(&authors)
        .bind(&texts)
        .bind(&published)
        .bind(&updated)
        .bind(&statuses)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_published_comments(&self, video_id: &str, params: &PaginationParams) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, Comment>(
            r#"
            SELECT comment_id, video_id, author_display_name, text, published_at, updated_at,
                   moderation_status, is_judi, confidence, created_at
            FROM comments
            WHERE video_id = $1 AND moderation_status = $2
            ORDER BY published_at DESC, comment_id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(video_id)
        .bind(STATUS_PUBLISHED)
        .bind(params.effective_limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_published_comments(&self, video_id: &str) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE video_id = $1 AND moderation_status = $2")
            .bind(video_id)
            .bind(STATUS_PUBLISHED)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// All published comments of a video, for classification.
    async fn all_published_comments(&self, video_id: &str) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, Comment>(
            r#"
            SELECT comment_id, video_id, author_display_name, text, published_at, updated_at,
                   moderation_status, is_judi, confidence, created_at
            FROM comments
            WHERE video_id = $1 AND moderation_status = $2
            ORDER BY published_at DESC, comment_id
            "#,
        )
        .bind(video_id)
        .bind(STATUS_PUBLISHED)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Mirror externally confirmed moderation onto the local rows.
    async fn set_moderation_status(&self, comment_ids: &[String], status: &str) -> Result<u64, AppError> {
        if comment_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE comments
            SET moderation_status = $2
            WHERE comment_id = ANY($1)
            "#,
        )
        .bind(comment_ids)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Write classification verdicts for every scored comment in one
    /// statement.
    async fn apply_classifications(&self, verdicts: &[CommentVerdict]) -> Result<u64, AppError> {
        if verdicts.is_empty() {
            return Ok(0);
        }

        let mut comment_ids = Vec::with_capacity(verdicts.len());
        let mut flags = Vec::with_capacity(verdicts.len());
        let mut confidences = Vec::with_capacity(verdicts.len());

        for verdict in verdicts {
            comment_ids.push(verdict.comment_id.clone());
            flags.push(verdict.is_judi);
            confidences.push(verdict.confidence);
        }

        let result = sqlx::query(
            r#"
            UPDATE comments AS c
            SET is_judi = v.is_judi, confidence = v.confidence
            FROM UNNEST($1::text[], $2::boolean[], $3::double precision[])
                AS v(comment_id, is_judi, confidence)
            WHERE c.comment_id = v.comment_id
            "#,
        )
        .bind(&comment_ids)
        .bind(&flags)
        .bind(&confidences)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
