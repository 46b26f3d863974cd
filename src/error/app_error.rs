use rocket::http::Status;
use rocket::response::Responder;
use rocket::{Request, Response};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use std::io::Cursor;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("Bad request: {0}")]
    InvalidRequest(String),
    #[error("Invalid state")]
    InvalidState,
    #[error("Token exchange failed")]
    TokenExchangeFailed { message: String },
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("All moderation attempts failed")]
    AllModerationAttemptsFailed,
    #[error("Internal server error")]
    Db {
        message: String,
        #[source]
        source: sqlx::error::Error,
    },
    #[error("Internal server error")]
    Cache {
        message: String,
        #[source]
        source: redis::RedisError,
    },
    #[error("Upstream request failed")]
    Http {
        message: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Internal server error")]
    Crypto { message: String },
    #[error("Internal server error")]
    ConfigurationError {
        message: String,
        #[source]
        source: figment::Error,
    },
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn db(message: impl Into<String>, source: sqlx::error::Error) -> Self {
        Self::Db {
            message: message.into(),
            source,
        }
    }

    pub fn cache(message: impl Into<String>, source: redis::RedisError) -> Self {
        Self::Cache {
            message: message.into(),
            source,
        }
    }

    pub fn http(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            message: message.into(),
            source,
        }
    }

    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::TokenExchangeFailed {
            message: message.into(),
        }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::AuthenticationRequired => Status::Unauthorized,
            AppError::InvalidRequest(_) => Status::BadRequest,
            AppError::InvalidState => Status::BadRequest,
            AppError::TokenExchangeFailed { .. } => Status::BadRequest,
            AppError::QuotaExceeded(_) => Status::TooManyRequests,
            AppError::NotFound(_) => Status::NotFound,
            AppError::ValidationFailed(_) => Status::BadRequest,
            AppError::ValidationError(_) => Status::BadRequest,
            AppError::AllModerationAttemptsFailed => Status::BadGateway,
            AppError::Db { .. } => Status::InternalServerError,
            AppError::Cache { .. } => Status::InternalServerError,
            AppError::Http { .. } => Status::BadGateway,
            AppError::Crypto { .. } => Status::InternalServerError,
            AppError::ConfigurationError { .. } => Status::InternalServerError,
            AppError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let method = req.method();
        let uri = req.uri();

        let request_id = req
            .local_cache(|| None::<crate::middleware::RequestId>)
            .as_ref()
            .map(|r| r.0.as_str())
            .unwrap_or("unknown");

        let user_id = req
            .local_cache(|| None::<crate::auth::CurrentUser>)
            .as_ref()
            .map(|u| u.user_id.clone())
            .unwrap_or_else(|| "anonymous".to_string());

        error!(
            error = ?self,
            request_id = %request_id,
            user_id = %user_id,
            method = %method,
            uri = %uri,
            "request failed"
        );

        let status = Status::from(&self);
        // Display impls carry no internals; sources stay in the log line above.
        let body = serde_json::json!({ "error": self.to_string() }).to_string();

        Response::build()
            .status(status)
            .header(rocket::http::ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};
        let mut responses = Responses::default();
        for (code, description) in [
            ("400", "Bad Request"),
            ("401", "Unauthorized"),
            ("404", "Not Found"),
            ("429", "Too Many Requests"),
            ("500", "Internal Server Error"),
            ("502", "Bad Gateway"),
        ] {
            responses.responses.insert(
                code.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }
        Ok(responses)
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::ConfigurationError {
            message: "Failed to read configuration".to_string(),
            source: e,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::db("Database error", e),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::cache("Session store error", e)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::http("Upstream request error", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_taxonomy() {
        assert_eq!(Status::from(&AppError::AuthenticationRequired), Status::Unauthorized);
        assert_eq!(Status::from(&AppError::InvalidState), Status::BadRequest);
        assert_eq!(Status::from(&AppError::QuotaExceeded("x".into())), Status::TooManyRequests);
        assert_eq!(Status::from(&AppError::NotFound("x".into())), Status::NotFound);
        assert_eq!(Status::from(&AppError::AllModerationAttemptsFailed), Status::BadGateway);
    }

    #[test]
    fn internal_errors_display_no_details() {
        let err = AppError::crypto("key material rejected: deadbeef");
        assert_eq!(err.to_string(), "Internal server error");
    }
}
