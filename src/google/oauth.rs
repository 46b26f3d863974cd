use crate::config::GoogleConfig;
use crate::error::app_error::AppError;
use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;
use tracing::warn;

/// Scopes requested at login. force-ssl is what allows moderating
/// comments on the user's behalf.
const SCOPE: &str = "openid email profile https://www.googleapis.com/auth/youtube.force-ssl";

/// Google OAuth client for the authorization-code and refresh-token
/// grants plus best-effort revocation.
#[derive(Clone)]
pub struct GoogleOAuth {
    http: reqwest::Client,
    config: GoogleConfig,
}

/// Token endpoint response. `refresh_token` is only present on the
/// authorization-code grant with offline access.
#[derive(Debug, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_in: u64,
    pub refresh_token_expires_in: Option<u64>,
}

/// Identity claims taken from the ID token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: Option<String>,
    email: Option<String>,
    name: Option<String>,
}

/// Decode the claims out of a JWT payload without verifying the
/// signature. The token arrives over TLS directly from Google's token
/// endpoint, which is the trust anchor here.
pub fn decode_id_claims(id_token: &str) -> Result<IdClaims, AppError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| AppError::token_exchange("ID token is not a JWT"))?;

    let decoded = general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AppError::token_exchange("ID token payload is not valid base64"))?;

    let raw: RawClaims = serde_json::from_slice(&decoded).map_err(|_| AppError::token_exchange("ID token payload is not valid JSON"))?;

    match (raw.sub, raw.email, raw.name) {
        (Some(sub), Some(email), Some(name)) => Ok(IdClaims { sub, email, name }),
        _ => Err(AppError::token_exchange("ID token is missing required claims")),
    }
}

impl GoogleOAuth {
    pub fn new(http: reqwest::Client, config: GoogleConfig) -> Self {
        Self { http, config }
    }

    /// Authorization URL for the login redirect. Offline access with
    /// forced consent so Google always returns a refresh token.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(SCOPE),
            urlencoding::encode(state),
        )
    }

    /// Authorization-code grant.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AppError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::token_exchange(format!("Token endpoint returned {status}")));
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|_| AppError::token_exchange("Token endpoint returned an unreadable body"))?;

        Ok(grant)
    }

    /// Refresh-token grant. Returns the new access token.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::token_exchange(format!("Refresh grant returned {status}")));
        }

        #[derive(Deserialize)]
        struct RefreshGrant {
            access_token: String,
        }

        let grant: RefreshGrant = response
            .json()
            .await
            .map_err(|_| AppError::token_exchange("Refresh grant returned an unreadable body"))?;

        Ok(grant.access_token)
    }

    /// Best-effort revocation; callers treat failure as a soft-fail.
    pub async fn revoke_token(&self, token: &str) -> Result<(), AppError> {
        let response = self.http.post(&self.config.revoke_url).form(&[("token", token)]).send().await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "token revocation was not accepted");
            return Err(AppError::token_exchange("Revocation was not accepted"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oauth() -> GoogleOAuth {
        let config = GoogleConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:8000/auth/callback".to_string(),
            ..GoogleConfig::default()
        };
        GoogleOAuth::new(reqwest::Client::new(), config)
    }

    #[test]
    fn authorize_url_requests_offline_consent() {
        let url = oauth().authorize_url("state-token");
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=state-token"));
        assert!(url.contains("youtube.force-ssl"));
        // redirect_uri must be urlencoded
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fauth%2Fcallback"));
    }

    fn fake_jwt(payload: &serde_json::Value) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(b"{\"alg\":\"RS256\"}");
        let body = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn decodes_claims_without_verifying_signature() {
        let token = fake_jwt(&serde_json::json!({
            "sub": "1069",
            "email": "owner@example.com",
            "name": "Owner",
            "aud": "ignored"
        }));
        let claims = decode_id_claims(&token).unwrap();
        assert_eq!(
            claims,
            IdClaims {
                sub: "1069".to_string(),
                email: "owner@example.com".to_string(),
                name: "Owner".to_string(),
            }
        );
    }

    #[test]
    fn missing_claims_fail_decoding() {
        let token = fake_jwt(&serde_json::json!({ "sub": "1069" }));
        assert!(decode_id_claims(&token).is_err());
        assert!(decode_id_claims("not-a-jwt").is_err());
    }
}
