mod auth;
mod classify;
mod config;
mod crypto;
mod database;
mod db;
mod error;
mod google;
mod middleware;
mod models;
mod routes;
mod service;
mod session;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::db::{stage_classifier, stage_db, stage_google, stage_redis};
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::get_openapi_route;
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence for fine-grained per-module control,
    // e.g. RUST_LOG=info,comment_warden::service=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    if json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn ensure_rocket_secret_key() {
    let profile = std::env::var("ROCKET_PROFILE").unwrap_or_else(|_| "debug".to_string());

    if profile != "debug" && std::env::var("ROCKET_SECRET_KEY").is_err() {
        panic!(
            "ROCKET_SECRET_KEY is required for profile '{}'. Generate one with: openssl rand -base64 32",
            profile
        );
    }
}

fn build_cors(cors_config: &config::CorsConfig) -> CorsOptions {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    if is_wildcard && cors_config.allow_credentials {
        panic!(
            "Invalid CORS configuration: Cannot use wildcard origins (*) with credentials enabled. \
            Either set specific origins or disable credentials."
        );
    }

    let allowed_origins = if cors_config.allowed_origins.is_empty() {
        AllowedOrigins::some_exact::<&str>(&[])
    } else if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Options, Method::Head]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    }
}

fn get_swagger_config(openapi_url: &str) -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: openapi_url.to_string(),
        ..Default::default()
    }
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);
    ensure_rocket_secret_key();

    let cors = build_cors(&config.cors).to_cors().expect("Failed to create CORS fairing");

    let (content_routes, content_openapi) = app_routes::content::routes();

    let mut rocket = rocket::build()
        .attach(cors)
        .attach(RequestLogger)
        .attach(stage_db(config.database.clone()))
        .attach(stage_redis(config.redis.clone()))
        .attach(stage_google(config.clone()))
        .attach(stage_classifier(config.classifier.clone()))
        .mount("/auth", app_routes::auth::routes())
        .mount("/content", content_routes)
        .mount("/health", app_routes::health::routes())
        .register(
            "/",
            catchers![
                app_routes::error::unauthorized,
                app_routes::error::not_found,
                app_routes::error::unprocessable,
                app_routes::error::internal_error
            ],
        );

    if config.api.enable_swagger {
        let settings = rocket_okapi::settings::OpenApiSettings::default();
        rocket = rocket
            .mount("/content", vec![get_openapi_route(content_openapi, &settings)])
            .mount("/docs", make_swagger_ui(&get_swagger_config("/content/openapi.json")));
    }

    rocket.manage(config)
}
