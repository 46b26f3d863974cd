use crate::crypto::TokenCipher;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::google::oauth::{GoogleOAuth, decode_id_claims};
use crate::google::youtube::YouTubeApi;
use crate::models::user::{UpsertUser, User};
use crate::session::{SessionData, SessionStore};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Fallback refresh-token lifetime when the provider does not say.
const DEFAULT_REFRESH_TOKEN_LIFETIME_SECONDS: i64 = 7 * 24 * 3600;

pub struct LoginOutcome {
    pub session_id: String,
    pub user: User,
}

pub struct RenewOutcome {
    pub session_id: String,
    pub session: SessionData,
}

/// Login, renewal and logout flows. Owns the full token lifecycle:
/// Redis sessions, encrypted durable refresh tokens and the Google
/// exchanges between them.
pub struct AuthService {
    repo: PostgresRepository,
    sessions: SessionStore,
    oauth: GoogleOAuth,
    youtube: Arc<dyn YouTubeApi>,
    cipher: TokenCipher,
}

impl AuthService {
    pub fn new(repo: PostgresRepository, sessions: SessionStore, oauth: GoogleOAuth, youtube: Arc<dyn YouTubeApi>, cipher: TokenCipher) -> Self {
        Self {
            repo,
            sessions,
            oauth,
            youtube,
            cipher,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn oauth(&self) -> &GoogleOAuth {
        &self.oauth
    }

    /// Authorization-code callback: exchange the code, identify the user
    /// from the unverified ID-token claims, enrich with channel metadata
    /// when possible, persist everything and mint the session.
    pub async fn complete_login(&self, code: &str) -> Result<LoginOutcome, AppError> {
        let grant = self.oauth.exchange_code(code).await?;

        let id_token = grant.id_token.as_deref().ok_or_else(|| AppError::token_exchange("Provider did not return an ID token"))?;
        let claims = decode_id_claims(id_token)?;

        let refresh_token = grant
            .refresh_token
            .as_deref()
            .ok_or_else(|| AppError::token_exchange("Provider did not return a refresh token"))?;

        // Best effort: a missing channel must not block login.
        let channel = match self.youtube.channel_info(&grant.access_token).await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, user_id = %claims.sub, "channel lookup failed, continuing without channel data");
                None
            }
        };

        let user = self
            .repo
            .upsert_user(&UpsertUser {
                user_id: claims.sub.clone(),
                name: claims.name,
                email: claims.email,
                channel_id: channel.as_ref().map(|c| c.channel_id.clone()),
                channel_name: channel.as_ref().map(|c| c.channel_name.clone()),
                custom_url: channel.as_ref().and_then(|c| c.custom_url.clone()),
                playlist_id: channel.as_ref().and_then(|c| c.uploads_playlist_id.clone()),
            })
            .await?;

        let session_id = self
            .sessions
            .create_session_with_ttl(
                &SessionData {
                    user_id: claims.sub.clone(),
                    access_token: grant.access_token.clone(),
                },
                grant.expires_in,
            )
            .await?;

        let encrypted = self.cipher.encrypt(refresh_token)?;
        let lifetime = grant
            .refresh_token_expires_in
            .map(|s| Duration::seconds(s as i64))
            .unwrap_or_else(|| Duration::seconds(DEFAULT_REFRESH_TOKEN_LIFETIME_SECONDS));

        self.repo
            .upsert_refresh_token(&claims.sub, &session_id, &encrypted, Utc::now() + lifetime)
            .await?;

        info!(user_id = %claims.sub, "login completed");

        Ok(LoginOutcome { session_id, user })
    }

    /// Renew an expired session from its durable refresh token. Every
    /// terminal condition collapses to `AuthenticationRequired`; the
    /// caller cannot tell a stranger's cookie from a dead one.
    pub async fn renew(&self, expired_session_id: &str) -> Result<RenewOutcome, AppError> {
        let record = self
            .repo
            .get_refresh_token_by_session(expired_session_id)
            .await?
            .ok_or(AppError::AuthenticationRequired)?;

        // Expiry short-circuits before any network traffic.
        if record.is_expired(Utc::now()) {
            info!(user_id = %record.user_id, "refresh token expired, re-authentication required");
            return Err(AppError::AuthenticationRequired);
        }

        let refresh_token = self.cipher.decrypt(&record.refresh_token_encrypted)?;

        let access_token = match self.oauth.refresh_access_token(&refresh_token).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, user_id = %record.user_id, "refresh grant failed");
                return Err(AppError::AuthenticationRequired);
            }
        };

        let session = SessionData {
            user_id: record.user_id.clone(),
            access_token,
        };
        let new_session_id = self.sessions.create_session(&session).await?;

        // Conditional repoint: when two renewals race, one loses here and
        // its freshly minted session is discarded.
        let repointed = self.repo.repoint_session(&record.user_id, expired_session_id, &new_session_id).await?;
        if !repointed {
            self.sessions.delete_session(&new_session_id).await?;
            return Err(AppError::AuthenticationRequired);
        }

        info!(user_id = %record.user_id, "session renewed");

        Ok(RenewOutcome {
            session_id: new_session_id,
            session,
        })
    }

    /// Logout always destroys the local session. Revocation at the
    /// provider is best effort and only affects the reported message.
    pub async fn logout(&self, session_id: &str) -> Result<String, AppError> {
        let record = self.repo.get_refresh_token_by_session(session_id).await?;

        self.sessions.delete_session(session_id).await?;

        let Some(record) = record else {
            return Ok("Logged out, no refresh token found".to_string());
        };

        let mut message = "Logged out".to_string();
        match self.cipher.decrypt(&record.refresh_token_encrypted) {
            Ok(refresh_token) => {
                if let Err(e) = self.oauth.revoke_token(&refresh_token).await {
                    warn!(error = %e, user_id = %record.user_id, "token revocation failed");
                    message = "Logged out, token revocation failed".to_string();
                }
            }
            Err(e) => {
                warn!(error = %e, user_id = %record.user_id, "stored refresh token unreadable, skipping revocation");
                message = "Logged out, token revocation failed".to_string();
            }
        }

        self.repo.delete_refresh_token(&record.user_id).await?;

        info!(user_id = %record.user_id, "logout completed");

        Ok(message)
    }
}
