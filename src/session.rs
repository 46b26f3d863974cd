use crate::error::app_error::AppError;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload stored under `session:{id}` in Redis. The access token lives
/// only here, never in Postgres.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: String,
    pub access_token: String,
}

/// Fast session store backed by Redis. Sessions and OAuth state tokens
/// expire by TTL alone; there is no sweeper.
#[derive(Clone)]
pub struct SessionStore {
    conn: ConnectionManager,
    session_ttl_seconds: u64,
    state_ttl_seconds: u64,
}

fn session_key(session_id: &str) -> String {
    format!("session:{session_id}")
}

fn state_key(state: &str) -> String {
    format!("state:{state}")
}

impl SessionStore {
    pub fn new(conn: ConnectionManager, session_ttl_seconds: u64, state_ttl_seconds: u64) -> Self {
        Self {
            conn,
            session_ttl_seconds,
            state_ttl_seconds,
        }
    }

    /// Mint a fresh session id and store the payload with the configured TTL.
    pub async fn create_session(&self, data: &SessionData) -> Result<String, AppError> {
        self.create_session_with_ttl(data, self.session_ttl_seconds).await
    }

    /// Same, but with an explicit TTL (the provider's `expires_in` at
    /// login time).
    pub async fn create_session_with_ttl(&self, data: &SessionData, ttl_seconds: u64) -> Result<String, AppError> {
        let session_id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(data).map_err(|e| AppError::Internal(format!("Failed to serialize session payload: {e}")))?;

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(session_key(&session_id), payload, ttl_seconds).await?;

        Ok(session_id)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionData>, AppError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(session_key(session_id)).await?;

        match payload {
            Some(raw) => {
                let data = serde_json::from_str(&raw).map_err(|e| AppError::Internal(format!("Corrupt session payload: {e}")))?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(session_key(session_id)).await?;
        Ok(())
    }

    /// Mint a one-shot CSRF state token for the OAuth redirect dance.
    pub async fn create_state(&self) -> Result<String, AppError> {
        let state = Uuid::new_v4().to_string();

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(state_key(&state), "1", self.state_ttl_seconds).await?;

        Ok(state)
    }

    /// Consume a state token. Returns false when the token is unknown or
    /// already spent. One GETDEL command, so two racing callbacks
    /// presenting the same token cannot both see it.
    pub async fn take_state(&self, state: &str) -> Result<bool, AppError> {
        let mut conn = self.conn.clone();
        let taken: Option<String> = take_state_command(state).query_async(&mut conn).await?;
        Ok(taken.is_some())
    }
}

fn take_state_command(state: &str) -> redis::Cmd {
    let mut cmd = redis::cmd("GETDEL");
    cmd.arg(state_key(state));
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_keys_are_namespaced() {
        assert_eq!(session_key("abc"), "session:abc");
        assert_eq!(state_key("abc"), "state:abc");
    }

    #[test]
    fn state_consumption_is_one_atomic_command() {
        // GET followed by DEL would let two racing callbacks both pass;
        // the consume must be a single GETDEL.
        let packed = take_state_command("abc").get_packed_command();
        let rendered = String::from_utf8_lossy(&packed);
        assert!(rendered.contains("GETDEL"));
        assert!(rendered.contains("state:abc"));
    }

    #[test]
    fn session_payload_round_trips_as_json() {
        let data = SessionData {
            user_id: "google-sub-123".to_string(),
            access_token: "ya29.token".to_string(),
        };
        let raw = serde_json::to_string(&data).unwrap();
        assert!(raw.contains("\"user_id\""));
        assert!(raw.contains("\"access_token\""));
        let back: SessionData = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, data);
    }
}
