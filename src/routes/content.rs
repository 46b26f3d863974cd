use crate::auth::CurrentUser;
use crate::classify::model::ClassifierHandle;
use crate::classify::runner::classify_video;
use crate::database::comment::CommentRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::video::VideoRepository;
use crate::error::app_error::AppError;
use crate::google::youtube::YouTubeApi;
use crate::models::comment::{Comment, ModerationRequest, ModerationResponse, PredictRequest, PredictResponse};
use crate::models::pagination::{PaginatedResponse, PaginationParams};
use crate::models::user::User;
use crate::models::video::{Video, VideoFetchSummary};
use crate::service::moderation::moderate_comments;
use crate::service::sync::sync_latest_videos;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use std::sync::Arc;
use validator::Validate;

/// Resolve the playlist to operate on: an explicit query parameter wins,
/// otherwise the uploads playlist stored for the user at login.
async fn resolve_playlist(repo: &PostgresRepository, user: &CurrentUser, playlist_id: Option<String>) -> Result<String, AppError> {
    if let Some(id) = playlist_id {
        return Ok(id);
    }

    repo.get_user(&user.user_id)
        .await?
        .and_then(|u| u.playlist_id)
        .ok_or_else(|| AppError::InvalidRequest("No playlist_id given and none stored for this user".to_string()))
}

/// Current user's profile as stored at login
#[openapi(tag = "Content")]
#[get("/users")]
pub async fn get_current_user(repo: &State<PostgresRepository>, current_user: CurrentUser) -> Result<Json<User>, AppError> {
    let user = repo
        .get_user(&current_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// Sweep the latest playlist uploads and sync their comments
#[openapi(tag = "Content")]
#[get("/fetch-latest-videos?<playlist_id>")]
pub async fn fetch_latest_videos(
    repo: &State<PostgresRepository>,
    youtube: &State<Arc<dyn YouTubeApi>>,
    current_user: CurrentUser,
    playlist_id: Option<String>,
) -> Result<Json<Vec<VideoFetchSummary>>, AppError> {
    let playlist_id = resolve_playlist(repo, &current_user, playlist_id).await?;
    let summaries = sync_latest_videos(repo.inner(), youtube.inner().as_ref(), &playlist_id, &current_user.access_token).await?;
    Ok(Json(summaries))
}

/// Stored videos of a playlist, paginated
#[openapi(tag = "Content")]
#[get("/user_videos?<playlist_id>&<page>&<limit>")]
pub async fn get_user_videos(
    repo: &State<PostgresRepository>,
    current_user: CurrentUser,
    playlist_id: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<PaginatedResponse<Video>>, AppError> {
    let playlist_id = resolve_playlist(repo, &current_user, playlist_id).await?;
    let params = PaginationParams { page, limit };

    let videos = repo.list_videos(&playlist_id, &params).await?;
    let total = repo.count_videos(&playlist_id).await?;

    Ok(Json(PaginatedResponse::new(videos, params.effective_page(), params.effective_limit(), total)))
}

/// Published comments of a video, paginated, with classification fields
#[openapi(tag = "Content")]
#[get("/video/<video_id>?<page>&<limit>")]
pub async fn get_video_comments(
    repo: &State<PostgresRepository>,
    _current_user: CurrentUser,
    video_id: String,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<PaginatedResponse<Comment>>, AppError> {
    if repo.get_video(&video_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Video {video_id} is not known")));
    }

    let params = PaginationParams { page, limit };
    let comments = repo.list_published_comments(&video_id, &params).await?;
    let total = repo.count_published_comments(&video_id).await?;

    Ok(Json(PaginatedResponse::new(comments, params.effective_page(), params.effective_limit(), total)))
}

/// Push a moderation decision to the provider and mirror it locally
#[openapi(tag = "Content")]
#[post("/comments/delete", data = "<payload>")]
pub async fn delete_comments(
    repo: &State<PostgresRepository>,
    youtube: &State<Arc<dyn YouTubeApi>>,
    current_user: CurrentUser,
    payload: Json<ModerationRequest>,
) -> Result<Json<ModerationResponse>, AppError> {
    let response = moderate_comments(repo.inner(), youtube.inner().as_ref(), &payload, &current_user.access_token).await?;
    Ok(Json(response))
}

/// Classify every published comment of a video
#[openapi(tag = "Content")]
#[post("/predict", data = "<payload>")]
pub async fn predict(
    repo: &State<PostgresRepository>,
    classifier: &State<ClassifierHandle>,
    _current_user: CurrentUser,
    payload: Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    payload.validate()?;
    let response = classify_video(repo.inner(), classifier, &payload).await?;
    Ok(Json(response))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![
        get_current_user,
        fetch_latest_videos,
        get_user_videos,
        get_video_comments,
        delete_comments,
        predict
    ]
}
