use crate::auth::{SESSION_COOKIE, removal_cookie, session_cookie};
use crate::config::Config;
use crate::error::app_error::AppError;
use crate::service::auth::AuthService;
use rocket::State;
use rocket::http::CookieJar;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, post};
use rocket_okapi::openapi;
use serde_json::{Value, json};

// Browser redirect and cookie flows; deliberately kept out of the
// generated API docs, which cover the JSON surface under /content.

/// Begin the OAuth dance, or skip it entirely when the caller already has
/// a live session.
#[openapi(skip)]
#[get("/login")]
pub async fn login(cookies: &CookieJar<'_>, auth: &State<AuthService>, config: &State<Config>) -> Result<Redirect, AppError> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        if auth.sessions().get_session(cookie.value()).await?.is_some() {
            return Ok(Redirect::to(config.google.frontend_url.clone()));
        }
    }

    let state = auth.sessions().create_state().await?;
    Ok(Redirect::to(auth.oauth().authorize_url(&state)))
}

#[openapi(skip)]
#[get("/callback?<code>&<state>")]
pub async fn callback(
    code: Option<String>,
    state: Option<String>,
    cookies: &CookieJar<'_>,
    auth: &State<AuthService>,
    config: &State<Config>,
) -> Result<Redirect, AppError> {
    let code = code.ok_or_else(|| AppError::InvalidRequest("Missing authorization code".to_string()))?;
    let state = state.ok_or_else(|| AppError::InvalidRequest("Missing state parameter".to_string()))?;

    // One-shot: the state token is gone after this whatever happens next.
    if !auth.sessions().take_state(&state).await? {
        return Err(AppError::InvalidState);
    }

    let outcome = auth.complete_login(&code).await?;
    cookies.add(session_cookie(outcome.session_id, config));

    Ok(Redirect::to(config.google.frontend_url.clone()))
}

#[openapi(skip)]
#[post("/logout")]
pub async fn logout(cookies: &CookieJar<'_>, auth: &State<AuthService>) -> Result<Json<Value>, AppError> {
    let Some(cookie) = cookies.get(SESSION_COOKIE) else {
        return Ok(Json(json!({ "message": "No active session" })));
    };
    let session_id = cookie.value().to_string();

    let message = auth.logout(&session_id).await?;
    cookies.remove(removal_cookie());

    Ok(Json(json!({ "message": message })))
}

/// Explicit renewal, same path the request guard takes transparently.
#[openapi(skip)]
#[post("/refresh")]
pub async fn refresh(cookies: &CookieJar<'_>, auth: &State<AuthService>, config: &State<Config>) -> Result<Json<Value>, AppError> {
    let Some(cookie) = cookies.get(SESSION_COOKIE) else {
        return Err(AppError::AuthenticationRequired);
    };
    let session_id = cookie.value().to_string();

    // A still-live session does not need renewing.
    if let Some(session) = auth.sessions().get_session(&session_id).await? {
        return Ok(Json(json!({ "status": "active", "user_id": session.user_id })));
    }

    let renewed = auth.renew(&session_id).await?;
    cookies.add(session_cookie(renewed.session_id, config));

    Ok(Json(json!({ "status": "refreshed", "user_id": renewed.session.user_id })))
}

pub fn routes() -> Vec<rocket::Route> {
    rocket_okapi::openapi_get_routes![login, callback, logout, refresh]
}
