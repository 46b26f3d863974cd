use crate::classify::model::{Classifier, ClassifierHandle, PREDICT_BATCH_SIZE};
use crate::classify::normalize::normalize;
use crate::database::comment::CommentRepository;
use crate::database::video::VideoRepository;
use crate::error::app_error::AppError;
use crate::models::comment::{Comment, CommentVerdict, PredictRequest, PredictResponse};
use tracing::info;

/// Score a set of comments in fixed-size batches. Pure: no writes, the
/// verdict list covers every input comment in order.
pub fn score_comments(classifier: &Classifier, comments: &[Comment]) -> Vec<CommentVerdict> {
    let mut verdicts = Vec::with_capacity(comments.len());

    for batch in comments.chunks(PREDICT_BATCH_SIZE) {
        for comment in batch {
            let score = classifier.score(&normalize(&comment.text));
            verdicts.push(CommentVerdict {
                comment_id: comment.comment_id.clone(),
                is_judi: score.is_judi,
                confidence: score.confidence,
            });
        }
    }

    verdicts
}

/// Classify every published comment of a video. Verdicts are written back
/// for all scored comments; only the flagged subset is returned.
pub async fn classify_video<R>(repo: &R, handle: &ClassifierHandle, request: &PredictRequest) -> Result<PredictResponse, AppError>
where
    R: VideoRepository + CommentRepository + Sync,
{
    let classifier = handle.get()?;

    if repo.get_video(&request.video_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Video {} is not known", request.video_id)));
    }

    let comments = repo.all_published_comments(&request.video_id).await?;
    let verdicts = score_comments(classifier, &comments);

    repo.apply_classifications(&verdicts).await?;

    let flagged: Vec<CommentVerdict> = verdicts.iter().filter(|v| v.is_judi).cloned().collect();

    info!(
        video_id = %request.video_id,
        scored = verdicts.len(),
        flagged = flagged.len(),
        "classification pass finished"
    );

    Ok(PredictResponse {
        video_id: request.video_id.clone(),
        scored: verdicts.len(),
        flagged,
    })
}
