use crate::database::comment::CommentRepository;
use crate::error::app_error::AppError;
use crate::google::youtube::YouTubeApi;
use crate::models::comment::{ModerationRequest, ModerationResponse, STATUS_HELD_FOR_REVIEW, STATUS_PUBLISHED, STATUS_REJECTED};
use std::collections::VecDeque;
use tracing::{info, warn};
use validator::Validate;

/// Chunk sizes tried in order. A failed chunk is split to the next size
/// down; failures at the smallest size are permanent for those ids.
const MODERATION_CHUNK_SIZES: [usize; 3] = [100, 50, 25];

fn validate_request(request: &ModerationRequest) -> Result<(), AppError> {
    request.validate()?;

    let status = request.moderation_status.as_str();
    if !matches!(status, STATUS_REJECTED | STATUS_HELD_FOR_REVIEW | STATUS_PUBLISHED) {
        return Err(AppError::ValidationFailed(format!("Unknown moderation status: {status}")));
    }

    // Banning is a side effect of rejection at the provider; any other
    // status combined with a ban is a caller mistake.
    if request.ban_author && status != STATUS_REJECTED {
        return Err(AppError::ValidationFailed("ban_author requires the rejected status".to_string()));
    }

    Ok(())
}

/// Push moderation to the provider with the degrading chunk cascade.
/// Returns the ids the provider confirmed. Zero confirmations for a
/// non-empty request is an error; partial confirmation is not.
pub async fn run_cascade(
    api: &dyn YouTubeApi,
    comment_ids: &[String],
    status: &str,
    ban_author: bool,
    access_token: &str,
) -> Result<Vec<String>, AppError> {
    let mut confirmed = Vec::new();
    let mut queue: VecDeque<(Vec<String>, usize)> = comment_ids
        .chunks(MODERATION_CHUNK_SIZES[0])
        .map(|chunk| (chunk.to_vec(), 0))
        .collect();

    while let Some((chunk, level)) = queue.pop_front() {
        match api.set_moderation_status(&chunk, status, ban_author, access_token).await {
            Ok(()) => confirmed.extend(chunk),
            Err(e) => {
                if let Some(&next_size) = MODERATION_CHUNK_SIZES.get(level + 1) {
                    warn!(
                        error = %e,
                        failed = chunk.len(),
                        retry_size = next_size,
                        "moderation chunk failed, splitting"
                    );
                    for smaller in chunk.chunks(next_size) {
                        queue.push_back((smaller.to_vec(), level + 1));
                    }
                } else {
                    warn!(error = %e, failed = chunk.len(), ids = ?chunk, "moderation failed permanently for chunk");
                }
            }
        }
    }

    if confirmed.is_empty() && !comment_ids.is_empty() {
        return Err(AppError::AllModerationAttemptsFailed);
    }

    Ok(confirmed)
}

/// Moderate comments at the provider and mirror the outcome locally.
/// Only externally confirmed ids are touched in the database.
pub async fn moderate_comments<R>(repo: &R, api: &dyn YouTubeApi, request: &ModerationRequest, access_token: &str) -> Result<ModerationResponse, AppError>
where
    R: CommentRepository + Sync,
{
    validate_request(request)?;

    let confirmed = run_cascade(api, &request.comment_ids, &request.moderation_status, request.ban_author, access_token).await?;

    repo.set_moderation_status(&confirmed, &request.moderation_status).await?;

    info!(
        requested = request.comment_ids.len(),
        moderated = confirmed.len(),
        status = %request.moderation_status,
        "moderation push finished"
    );

    Ok(ModerationResponse {
        requested: request.comment_ids.len(),
        moderated: confirmed.len(),
        moderated_ids: confirmed,
    })
}
