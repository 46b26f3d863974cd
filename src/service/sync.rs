use crate::database::comment::CommentRepository;
use crate::database::video::VideoRepository;
use crate::error::app_error::AppError;
use crate::google::youtube::{CommentResource, YouTubeApi};
use crate::models::comment::{CommentUpsert, STATUS_PUBLISHED};
use crate::models::video::{NewVideo, VideoFetchSummary};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Watermark predicate: a comment is worth storing when its latest
/// activity is strictly after the watermark. No watermark means the video
/// has never been swept and everything is new.
pub fn comment_is_new(published_at: DateTime<Utc>, updated_at: DateTime<Utc>, watermark: Option<DateTime<Utc>>) -> bool {
    match watermark {
        None => true,
        Some(mark) => published_at.max(updated_at) > mark,
    }
}

fn to_upsert(resource: &CommentResource, video_id: &str) -> CommentUpsert {
    CommentUpsert {
        comment_id: resource.id.clone(),
        video_id: video_id.to_string(),
        author_display_name: resource.snippet.author_display_name.clone().unwrap_or_default(),
        text: resource.snippet.text().to_string(),
        published_at: resource.snippet.published_at,
        updated_at: resource.snippet.updated_or_published(),
        moderation_status: resource.snippet.moderation_status.clone().unwrap_or_else(|| STATUS_PUBLISHED.to_string()),
    }
}

/// Page through a video's comment threads, flattening top-level comments
/// and their replies into one list and dropping everything at or before
/// the watermark. Stops on a missing next-page token, or on a token equal
/// to the previous one, which some responses repeat forever.
pub async fn collect_comments(
    api: &dyn YouTubeApi,
    video_id: &str,
    access_token: &str,
    watermark: Option<DateTime<Utc>>,
) -> Result<Vec<CommentUpsert>, AppError> {
    let mut collected = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = api.list_comment_threads(video_id, access_token, page_token.as_deref()).await?;

        for thread in &page.items {
            let top = &thread.snippet.top_level_comment;
            if comment_is_new(top.snippet.published_at, top.snippet.updated_or_published(), watermark) {
                collected.push(to_upsert(top, video_id));
            }

            if let Some(replies) = &thread.replies {
                for reply in &replies.comments {
                    if comment_is_new(reply.snippet.published_at, reply.snippet.updated_or_published(), watermark) {
                        collected.push(to_upsert(reply, video_id));
                    }
                }
            }
        }

        match page.next_page_token {
            None => break,
            Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                warn!(video_id, token = %next, "comment page token repeated, stopping pagination");
                break;
            }
            Some(next) => page_token = Some(next),
        }
    }

    Ok(collected)
}

async fn sync_one_video<R>(repo: &R, api: &dyn YouTubeApi, video: NewVideo, access_token: &str) -> Result<VideoFetchSummary, AppError>
where
    R: VideoRepository + CommentRepository + Sync,
{
    let stored = repo.insert_video_if_absent(&video).await?;

    let comments = collect_comments(api, &stored.video_id, access_token, stored.last_fetch_comment).await?;
    let written = repo.upsert_comments(&comments).await?;

    // Last step on purpose: an interrupted sync keeps the old watermark
    // and the next pass re-processes the same window idempotently.
    repo.touch_last_fetch_comment(&stored.video_id).await?;

    info!(video_id = %stored.video_id, new_comments = written, "video comments synced");

    Ok(VideoFetchSummary {
        video_id: stored.video_id,
        title: stored.title,
        new_comments: comments.len(),
        error: None,
    })
}

/// Sweep the most recent playlist uploads: discover videos, sync their
/// comments, advance watermarks. A failing video is reported in its
/// summary row instead of aborting the rest of the sweep.
pub async fn sync_latest_videos<R>(repo: &R, api: &dyn YouTubeApi, playlist_id: &str, access_token: &str) -> Result<Vec<VideoFetchSummary>, AppError>
where
    R: VideoRepository + CommentRepository + Sync,
{
    let items = api.list_playlist_items(playlist_id, access_token).await?;

    let mut summaries = Vec::with_capacity(items.len());
    for item in items {
        let Some(video_id) = item.video_id() else {
            warn!(playlist_id, "playlist item without a video id, skipping");
            continue;
        };

        let video = NewVideo {
            video_id: video_id.to_string(),
            channel_id: item.snippet.channel_id.clone(),
            playlist_id: playlist_id.to_string(),
            title: item.snippet.title.clone(),
            description: item.snippet.description.clone(),
            published_at: item.snippet.published_at,
        };
        let title = video.title.clone();
        let id = video.video_id.clone();

        match sync_one_video(repo, api, video, access_token).await {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                warn!(video_id = %id, error = %e, "video sync failed");
                summaries.push(VideoFetchSummary {
                    video_id: id,
                    title,
                    new_comments: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Ok(summaries)
}
