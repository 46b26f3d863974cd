use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub google: GoogleConfig,
    pub youtube: YoutubeConfig,
    pub session: SessionConfig,
    pub crypto: CryptoConfig,
    pub classifier: ClassifierConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// Default TTL for login sessions, seconds.
    pub session_ttl_seconds: u64,
    /// TTL for the one-shot OAuth state token, seconds.
    pub state_ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Where the browser lands after a successful login.
    pub frontend_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub revoke_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YoutubeConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Max-age of the session cookie, seconds. Fixed regardless of session TTL.
    pub cookie_max_age_seconds: i64,
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CryptoConfig {
    /// Base64-encoded 32-byte AES-256-GCM key for refresh-token encryption.
    pub token_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClassifierConfig {
    pub model_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub enable_swagger: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/warden_db".to_string(),
            max_connections: 16,
            min_connections: 4,
            acquire_timeout: 5,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379/0".to_string(),
            session_ttl_seconds: 3600,
            state_ttl_seconds: 300,
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8000/auth/callback".to_string(),
            frontend_url: "http://localhost:5173/dashboard".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            revoke_url: "https://oauth2.googleapis.com/revoke".to_string(),
        }
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_max_age_seconds: 3600 * 24,
            secure_cookies: false,
        }
    }
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self { token_key: String::new() }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: "model/judi-classifier.json".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            allow_credentials: true,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { enable_swagger: true }
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Warden.toml (base configuration file)
    /// 2. Environment variables (prefixed with WARDEN_)
    /// 3. DATABASE_URL / REDIS_URL environment variables (for backwards compatibility)
    pub fn load() -> Result<Self, figment::Error> {
        let figment = Figment::new()
            .merge(Toml::string(&toml::to_string(&Config::default()).unwrap()).nested())
            .merge(Toml::file("Warden.toml").nested())
            .merge(Env::prefixed("WARDEN_").split("_"))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::raw().only(&["REDIS_URL"]).map(|_| "redis.url".into()));

        figment.extract()
    }
}
