use crate::config::Config;
use crate::service::auth::AuthService;
use rocket::http::{Cookie, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::time::Duration;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use tracing::debug;

pub const SESSION_COOKIE: &str = "session_id";

/// Authenticated caller, resolved from the session cookie. A live Redis
/// session attaches directly; an expired one is renewed transparently
/// from the durable refresh token, minting a new cookie. Anything else is
/// a 401.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session_id: String,
    pub user_id: String,
    pub access_token: String,
}

/// Session cookie with the fixed policy: HTTP-only, SameSite=Lax, capped
/// max-age regardless of the Redis TTL.
pub fn session_cookie(value: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.session.secure_cookies)
        .max_age(Duration::seconds(config.session.cookie_max_age_seconds))
        .path("/")
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(auth) = request.rocket().state::<AuthService>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };
        let Some(config) = request.rocket().state::<Config>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let cookies = request.cookies();
        let Some(cookie) = cookies.get(SESSION_COOKIE) else {
            return Outcome::Error((Status::Unauthorized, ()));
        };
        let session_id = cookie.value().to_string();

        match auth.sessions().get_session(&session_id).await {
            Ok(Some(session)) => {
                let user = CurrentUser {
                    session_id,
                    user_id: session.user_id,
                    access_token: session.access_token,
                };
                request.local_cache(|| Some(user.clone()));
                Outcome::Success(user)
            }
            Ok(None) => {
                debug!("session expired, attempting renewal");
                match auth.renew(&session_id).await {
                    Ok(renewed) => {
                        cookies.add(session_cookie(renewed.session_id.clone(), config));
                        let user = CurrentUser {
                            session_id: renewed.session_id,
                            user_id: renewed.session.user_id,
                            access_token: renewed.session.access_token,
                        };
                        request.local_cache(|| Some(user.clone()));
                        Outcome::Success(user)
                    }
                    Err(_) => {
                        cookies.remove(removal_cookie());
                        Outcome::Error((Status::Unauthorized, ()))
                    }
                }
            }
            Err(_) => Outcome::Error((Status::InternalServerError, ())),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}
