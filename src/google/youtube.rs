use crate::config::YoutubeConfig;
use crate::error::app_error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

const PLAYLIST_PAGE_SIZE: u32 = 50;
const COMMENT_PAGE_SIZE: u32 = 100;

/// YouTube Data API surface used by the sync orchestrator. A trait so
/// tests can script responses without a network.
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    async fn list_playlist_items(&self, playlist_id: &str, access_token: &str) -> Result<Vec<PlaylistItem>, AppError>;

    async fn list_comment_threads(&self, video_id: &str, access_token: &str, page_token: Option<&str>) -> Result<CommentThreadPage, AppError>;

    async fn set_moderation_status(&self, comment_ids: &[String], status: &str, ban_author: bool, access_token: &str) -> Result<(), AppError>;

    async fn channel_info(&self, access_token: &str) -> Result<Option<ChannelInfo>, AppError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
    pub content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub channel_id: Option<String>,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: Option<String>,
    pub video_published_at: Option<DateTime<Utc>>,
}

impl PlaylistItem {
    /// The video id may live in either section depending on the `part`
    /// parameters the API answered with.
    pub fn video_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|d| d.video_id.as_deref())
            .or_else(|| self.snippet.resource_id.as_ref().and_then(|r| r.video_id.as_deref()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadPage {
    #[serde(default)]
    pub items: Vec<CommentThread>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    pub snippet: CommentThreadSnippet,
    pub replies: Option<CommentReplies>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSnippet {
    pub top_level_comment: CommentResource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentReplies {
    #[serde(default)]
    pub comments: Vec<CommentResource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResource {
    pub id: String,
    pub snippet: CommentSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    pub author_display_name: Option<String>,
    pub text_original: Option<String>,
    pub text_display: Option<String>,
    pub published_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub moderation_status: Option<String>,
}

impl CommentSnippet {
    /// Prefer the raw text over the HTML-rendered one.
    pub fn text(&self) -> &str {
        self.text_original.as_deref().or(self.text_display.as_deref()).unwrap_or("")
    }

    /// Updated falls back to published when the provider omits it.
    pub fn updated_or_published(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.published_at)
    }
}

#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub channel_id: String,
    pub channel_name: String,
    pub custom_url: Option<String>,
    pub uploads_playlist_id: Option<String>,
}

#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    config: YoutubeConfig,
}

impl YouTubeClient {
    pub fn new(http: reqwest::Client, config: YoutubeConfig) -> Self {
        Self { http, config }
    }

    /// Quota exhaustion and missing resources are the two provider
    /// failures callers branch on; everything else is a generic upstream
    /// error.
    async fn check_status(response: reqwest::Response, context: &str) -> Result<reqwest::Response, AppError> {
        match response.status() {
            reqwest::StatusCode::FORBIDDEN => Err(AppError::QuotaExceeded(context.to_string())),
            reqwest::StatusCode::NOT_FOUND => Err(AppError::NotFound(context.to_string())),
            _ => Ok(response.error_for_status()?),
        }
    }
}

#[async_trait]
impl YouTubeApi for YouTubeClient {
    async fn list_playlist_items(&self, playlist_id: &str, access_token: &str) -> Result<Vec<PlaylistItem>, AppError> {
        let url = format!("{}/playlistItems", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("part", "snippet,contentDetails"),
                ("playlistId", playlist_id),
                ("maxResults", &PLAYLIST_PAGE_SIZE.to_string()),
            ])
            .send()
            .await?;

        let response = Self::check_status(response, "playlist items").await?;

        #[derive(Deserialize)]
        struct PlaylistItemsResponse {
            #[serde(default)]
            items: Vec<PlaylistItem>,
        }

        let body: PlaylistItemsResponse = response.json().await?;
        Ok(body.items)
    }

    async fn list_comment_threads(&self, video_id: &str, access_token: &str, page_token: Option<&str>) -> Result<CommentThreadPage, AppError> {
        let url = format!("{}/commentThreads", self.config.base_url);
        let mut request = self.http.get(&url).bearer_auth(access_token).query(&[
            ("part", "snippet,replies"),
            ("videoId", video_id),
            ("maxResults", &COMMENT_PAGE_SIZE.to_string()),
            ("textFormat", "plainText"),
        ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = Self::check_status(request.send().await?, "comment threads").await?;
        let page: CommentThreadPage = response.json().await?;
        Ok(page)
    }

    async fn set_moderation_status(&self, comment_ids: &[String], status: &str, ban_author: bool, access_token: &str) -> Result<(), AppError> {
        let url = format!("{}/comments/setModerationStatus", self.config.base_url);
        let ids = comment_ids.join(",");
        let ban = ban_author.to_string();

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .query(&[("id", ids.as_str()), ("moderationStatus", status), ("banAuthor", ban.as_str())])
            .send()
            .await?;

        Self::check_status(response, "set moderation status").await?;
        Ok(())
    }

    async fn channel_info(&self, access_token: &str) -> Result<Option<ChannelInfo>, AppError> {
        let url = format!("{}/channels", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("part", "snippet,contentDetails"), ("mine", "true")])
            .send()
            .await?;

        let response = Self::check_status(response, "channel info").await?;

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ChannelsResponse {
            #[serde(default)]
            items: Vec<Channel>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Channel {
            id: String,
            snippet: ChannelSnippet,
            content_details: Option<ChannelContentDetails>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ChannelSnippet {
            title: String,
            custom_url: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ChannelContentDetails {
            related_playlists: Option<RelatedPlaylists>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RelatedPlaylists {
            uploads: Option<String>,
        }

        let body: ChannelsResponse = response.json().await?;

        Ok(body.items.into_iter().next().map(|channel| ChannelInfo {
            channel_id: channel.id,
            channel_name: channel.snippet.title,
            custom_url: channel.snippet.custom_url,
            uploads_playlist_id: channel.content_details.and_then(|d| d.related_playlists).and_then(|p| p.uploads),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_prefers_content_details() {
        let item: PlaylistItem = serde_json::from_value(serde_json::json!({
            "snippet": {
                "title": "t",
                "resourceId": { "videoId": "from-snippet" }
            },
            "contentDetails": { "videoId": "from-details" }
        }))
        .unwrap();
        assert_eq!(item.video_id(), Some("from-details"));
    }

    #[test]
    fn comment_snippet_falls_back_between_text_fields() {
        let snippet: CommentSnippet = serde_json::from_value(serde_json::json!({
            "textDisplay": "rendered",
            "publishedAt": "2024-06-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(snippet.text(), "rendered");
        assert_eq!(snippet.updated_or_published(), snippet.published_at);
    }

    #[test]
    fn thread_page_parses_replies() {
        let page: CommentThreadPage = serde_json::from_value(serde_json::json!({
            "items": [{
                "snippet": {
                    "topLevelComment": {
                        "id": "c1",
                        "snippet": {
                            "authorDisplayName": "A",
                            "textOriginal": "hello",
                            "publishedAt": "2024-06-01T00:00:00Z",
                            "updatedAt": "2024-06-02T00:00:00Z"
                        }
                    }
                },
                "replies": {
                    "comments": [{
                        "id": "c2",
                        "snippet": {
                            "textOriginal": "reply",
                            "publishedAt": "2024-06-03T00:00:00Z"
                        }
                    }]
                }
            }],
            "nextPageToken": "tok"
        }))
        .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].snippet.top_level_comment.id, "c1");
        assert_eq!(page.items[0].replies.as_ref().unwrap().comments[0].id, "c2");
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));
    }
}
