use crate::classify::model::ClassifierHandle;
use crate::config::{ClassifierConfig, Config, DatabaseConfig, RedisConfig};
use crate::crypto::TokenCipher;
use crate::database::postgres_repository::PostgresRepository;
use crate::google::oauth::GoogleOAuth;
use crate::google::youtube::{YouTubeApi, YouTubeClient};
use crate::service::auth::AuthService;
use crate::session::SessionStore;
use redis::aio::ConnectionManager;
use rocket::fairing::AdHoc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

async fn init_pool(db_config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout))
        .idle_timeout(Duration::from_secs(30))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&db_config.url)
        .await
}

pub fn stage_db(db_config: DatabaseConfig) -> AdHoc {
    AdHoc::try_on_ignite("Postgres (sqlx)", |rocket| async move {
        match init_pool(&db_config).await {
            Ok(pool) => {
                if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
                    tracing::error!("Failed to run database migrations: {}", e);
                    return Err(rocket);
                }
                tracing::info!("Database pool initialized successfully");
                Ok(rocket.manage(PostgresRepository::new(pool)))
            }
            Err(e) => {
                tracing::error!("Failed to initialize database pool: {}", e);
                Err(rocket)
            }
        }
    })
}

pub fn stage_redis(redis_config: RedisConfig) -> AdHoc {
    AdHoc::try_on_ignite("Redis session store", move |rocket| async move {
        let client = match redis::Client::open(redis_config.url.as_str()) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Invalid Redis URL: {}", e);
                return Err(rocket);
            }
        };

        match ConnectionManager::new(client).await {
            Ok(conn) => {
                tracing::info!("Redis connection established");
                let store = SessionStore::new(conn, redis_config.session_ttl_seconds, redis_config.state_ttl_seconds);
                Ok(rocket.manage(store))
            }
            Err(e) => {
                tracing::error!("Failed to connect to Redis: {}", e);
                Err(rocket)
            }
        }
    })
}

/// Google OAuth + YouTube clients and the auth service composed from the
/// already-staged repository and session store.
pub fn stage_google(config: Config) -> AdHoc {
    AdHoc::try_on_ignite("Google clients", |rocket| async move {
        let http = match reqwest::Client::builder().timeout(Duration::from_secs(30)).build() {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Failed to build HTTP client: {}", e);
                return Err(rocket);
            }
        };

        let cipher = match TokenCipher::from_base64_key(&config.crypto.token_key) {
            Ok(cipher) => cipher,
            Err(e) => {
                tracing::error!("Token encryption key rejected: {:?}", e);
                return Err(rocket);
            }
        };

        let (Some(repo), Some(sessions)) = (rocket.state::<PostgresRepository>(), rocket.state::<SessionStore>()) else {
            tracing::error!("Google clients staged before database and Redis");
            return Err(rocket);
        };
        let repo = repo.clone();
        let sessions = sessions.clone();

        let oauth = GoogleOAuth::new(http.clone(), config.google.clone());
        let youtube: Arc<dyn YouTubeApi> = Arc::new(YouTubeClient::new(http, config.youtube.clone()));
        let auth = AuthService::new(repo, sessions, oauth, youtube.clone(), cipher);

        Ok(rocket.manage(youtube).manage(auth))
    })
}

pub fn stage_classifier(classifier_config: ClassifierConfig) -> AdHoc {
    AdHoc::on_ignite("Classifier artifact", |rocket| async move {
        let handle = ClassifierHandle::from_path(Path::new(&classifier_config.model_path));
        rocket.manage(handle)
    })
}
