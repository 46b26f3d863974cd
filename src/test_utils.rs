//! Scripted stand-ins for the external API and the repository, shared
//! across unit tests.

use crate::database::comment::CommentRepository;
use crate::database::video::VideoRepository;
use crate::error::app_error::AppError;
use crate::google::youtube::{
    ChannelInfo, CommentReplies, CommentResource, CommentSnippet, CommentThread, CommentThreadPage, CommentThreadSnippet, PlaylistItem,
    PlaylistItemSnippet, ResourceId, YouTubeApi,
};
use crate::models::comment::{Comment, CommentUpsert, CommentVerdict};
use crate::models::pagination::PaginationParams;
use crate::models::video::{NewVideo, Video};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

type FailurePredicate = Box<dyn Fn(&[String]) -> bool + Send + Sync>;

/// YouTube double that replays scripted responses and records every call.
pub struct ScriptedYouTube {
    playlist_items: Vec<PlaylistItem>,
    comment_pages: Mutex<VecDeque<CommentThreadPage>>,
    fail_moderation: Option<FailurePredicate>,
    moderation_calls: Mutex<Vec<Vec<String>>>,
    page_tokens: Mutex<Vec<Option<String>>>,
}

impl ScriptedYouTube {
    pub fn new() -> Self {
        Self {
            playlist_items: Vec::new(),
            comment_pages: Mutex::new(VecDeque::new()),
            fail_moderation: None,
            moderation_calls: Mutex::new(Vec::new()),
            page_tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn with_playlist_items(mut self, items: Vec<PlaylistItem>) -> Self {
        self.playlist_items = items;
        self
    }

    pub fn with_comment_pages(self, pages: Vec<CommentThreadPage>) -> Self {
        *self.comment_pages.lock().unwrap() = pages.into();
        self
    }

    /// Make moderation calls fail whenever the predicate matches the
    /// submitted chunk.
    pub fn failing_moderation_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        self.fail_moderation = Some(Box::new(predicate));
        self
    }

    /// Chunks submitted to `set_moderation_status`, in call order.
    pub fn moderation_calls(&self) -> Vec<Vec<String>> {
        self.moderation_calls.lock().unwrap().clone()
    }

    /// Page tokens passed to `list_comment_threads`, in call order.
    pub fn comment_page_tokens(&self) -> Vec<Option<String>> {
        self.page_tokens.lock().unwrap().clone()
    }
}

impl Default for ScriptedYouTube {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl YouTubeApi for ScriptedYouTube {
    async fn list_playlist_items(&self, _playlist_id: &str, _access_token: &str) -> Result<Vec<PlaylistItem>, AppError> {
        Ok(self.playlist_items.clone())
    }

    async fn list_comment_threads(&self, _video_id: &str, _access_token: &str, page_token: Option<&str>) -> Result<CommentThreadPage, AppError> {
        self.page_tokens.lock().unwrap().push(page_token.map(str::to_string));
        self.comment_pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::NotFound("comment threads".to_string()))
    }

    async fn set_moderation_status(&self, comment_ids: &[String], _status: &str, _ban_author: bool, _access_token: &str) -> Result<(), AppError> {
        self.moderation_calls.lock().unwrap().push(comment_ids.to_vec());

        if let Some(predicate) = &self.fail_moderation {
            if predicate(comment_ids) {
                return Err(AppError::Internal("scripted moderation failure".to_string()));
            }
        }

        Ok(())
    }

    async fn channel_info(&self, _access_token: &str) -> Result<Option<ChannelInfo>, AppError> {
        Ok(None)
    }
}

/// Repository double with in-memory state; records every write so tests
/// can assert what the service flows persist, and in which order.
pub struct RecordingRepository {
    videos: Mutex<HashMap<String, Video>>,
    published: Mutex<HashMap<String, Vec<Comment>>>,
    upserted_batches: Mutex<Vec<Vec<CommentUpsert>>>,
    watermark_touches: Mutex<Vec<String>>,
    status_updates: Mutex<Vec<(Vec<String>, String)>>,
    verdict_writes: Mutex<Vec<Vec<CommentVerdict>>>,
    write_log: Mutex<Vec<&'static str>>,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self {
            videos: Mutex::new(HashMap::new()),
            published: Mutex::new(HashMap::new()),
            upserted_batches: Mutex::new(Vec::new()),
            watermark_touches: Mutex::new(Vec::new()),
            status_updates: Mutex::new(Vec::new()),
            verdict_writes: Mutex::new(Vec::new()),
            write_log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_video(self, video: Video) -> Self {
        self.videos.lock().unwrap().insert(video.video_id.clone(), video);
        self
    }

    pub fn with_published_comments(self, video_id: &str, comments: Vec<Comment>) -> Self {
        self.published.lock().unwrap().insert(video_id.to_string(), comments);
        self
    }

    /// Comment batches passed to `upsert_comments`, in call order.
    pub fn upserted_batches(&self) -> Vec<Vec<CommentUpsert>> {
        self.upserted_batches.lock().unwrap().clone()
    }

    /// Video ids whose watermark was advanced, in call order.
    pub fn watermark_touches(&self) -> Vec<String> {
        self.watermark_touches.lock().unwrap().clone()
    }

    /// `(ids, status)` pairs mirrored locally, in call order.
    pub fn status_updates(&self) -> Vec<(Vec<String>, String)> {
        self.status_updates.lock().unwrap().clone()
    }

    /// Verdict batches written back, in call order.
    pub fn verdict_writes(&self) -> Vec<Vec<CommentVerdict>> {
        self.verdict_writes.lock().unwrap().clone()
    }

    /// Names of the write methods invoked, in call order.
    pub fn write_log(&self) -> Vec<&'static str> {
        self.write_log.lock().unwrap().clone()
    }
}

impl Default for RecordingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoRepository for RecordingRepository {
    async fn insert_video_if_absent(&self, video: &NewVideo) -> Result<Video, AppError> {
        let mut videos = self.videos.lock().unwrap();
        if let Some(existing) = videos.get(&video.video_id) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let stored = Video {
            video_id: video.video_id.clone(),
            channel_id: video.channel_id.clone(),
            playlist_id: video.playlist_id.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            published_at: video.published_at,
            last_fetch_comment: None,
            created_at: now,
            updated_at: now,
        };
        videos.insert(stored.video_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get_video(&self, video_id: &str) -> Result<Option<Video>, AppError> {
        Ok(self.videos.lock().unwrap().get(video_id).cloned())
    }

    async fn touch_last_fetch_comment(&self, video_id: &str) -> Result<(), AppError> {
        self.write_log.lock().unwrap().push("touch_last_fetch_comment");
        self.watermark_touches.lock().unwrap().push(video_id.to_string());
        if let Some(video) = self.videos.lock().unwrap().get_mut(video_id) {
            video.last_fetch_comment = Some(Utc::now());
        }
        Ok(())
    }

    async fn list_videos(&self, playlist_id: &str, _params: &PaginationParams) -> Result<Vec<Video>, AppError> {
        let videos = self.videos.lock().unwrap();
        Ok(videos.values().filter(|v| v.playlist_id == playlist_id).cloned().collect())
    }

    async fn count_videos(&self, playlist_id: &str) -> Result<i64, AppError> {
        let videos = self.videos.lock().unwrap();
        Ok(videos.values().filter(|v| v.playlist_id == playlist_id).count() as i64)
    }
}

#[async_trait]
impl CommentRepository for RecordingRepository {
    async fn upsert_comments(&self, batch: &[CommentUpsert]) -> Result<u64, AppError> {
        self.write_log.lock().unwrap().push("upsert_comments");
        self.upserted_batches.lock().unwrap().push(batch.to_vec());
        Ok(batch.len() as u64)
    }

    async fn list_published_comments(&self, video_id: &str, _params: &PaginationParams) -> Result<Vec<Comment>, AppError> {
        Ok(self.published.lock().unwrap().get(video_id).cloned().unwrap_or_default())
    }

    async fn count_published_comments(&self, video_id: &str) -> Result<i64, AppError> {
        Ok(self.published.lock().unwrap().get(video_id).map_or(0, Vec::len) as i64)
    }

    async fn all_published_comments(&self, video_id: &str) -> Result<Vec<Comment>, AppError> {
        Ok(self.published.lock().unwrap().get(video_id).cloned().unwrap_or_default())
    }

    async fn set_moderation_status(&self, comment_ids: &[String], status: &str) -> Result<u64, AppError> {
        self.write_log.lock().unwrap().push("set_moderation_status");
        self.status_updates.lock().unwrap().push((comment_ids.to_vec(), status.to_string()));
        Ok(comment_ids.len() as u64)
    }

    async fn apply_classifications(&self, verdicts: &[CommentVerdict]) -> Result<u64, AppError> {
        self.write_log.lock().unwrap().push("apply_classifications");
        self.verdict_writes.lock().unwrap().push(verdicts.to_vec());
        Ok(verdicts.len() as u64)
    }
}

pub fn playlist_item(video_id: &str, title: &str) -> PlaylistItem {
    PlaylistItem {
        snippet: PlaylistItemSnippet {
            title: title.to_string(),
            description: None,
            published_at: None,
            channel_id: None,
            resource_id: Some(ResourceId {
                video_id: Some(video_id.to_string()),
            }),
        },
        content_details: None,
    }
}

pub fn stored_video(video_id: &str, watermark: Option<DateTime<Utc>>) -> Video {
    let now = Utc::now();
    Video {
        video_id: video_id.to_string(),
        channel_id: None,
        playlist_id: "pl1".to_string(),
        title: format!("video {video_id}"),
        description: None,
        published_at: Some(now),
        last_fetch_comment: watermark,
        created_at: now,
        updated_at: now,
    }
}

pub fn comment_resource(id: &str, text: &str, published_at: DateTime<Utc>) -> CommentResource {
    CommentResource {
        id: id.to_string(),
        snippet: CommentSnippet {
            author_display_name: Some("scripted author".to_string()),
            text_original: Some(text.to_string()),
            text_display: None,
            published_at,
            updated_at: Some(published_at),
            moderation_status: Some("published".to_string()),
        },
    }
}

pub fn thread(top_level: CommentResource) -> CommentThread {
    CommentThread {
        snippet: CommentThreadSnippet { top_level_comment: top_level },
        replies: None,
    }
}

pub fn thread_with_replies(top_level: CommentResource, replies: Vec<CommentResource>) -> CommentThread {
    CommentThread {
        snippet: CommentThreadSnippet { top_level_comment: top_level },
        replies: Some(CommentReplies { comments: replies }),
    }
}
