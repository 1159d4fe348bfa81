mod auth;
mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;

pub use config::Config;

use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use crate::service::cookies::CookieSessionManager;
use crate::service::credentials::CredentialService;
use rocket::{Build, Rocket, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use tracing_subscriber::EnvFilter;

pub fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence for per-module control, e.g.
    // RUST_LOG=info,storefront::routes=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    if json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn build_cors(cors_config: &config::CorsConfig) -> CorsOptions {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    // Wildcard origins with credentials is rejected by browsers anyway.
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
        allowed_methods: vec![
            Method::Get,
            Method::Post,
            Method::Put,
            Method::Delete,
            Method::Patch,
            Method::Options,
            Method::Head,
        ]
        .into_iter()
        .map(From::from)
        .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    }
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    let cors = build_cors(&config.cors).to_cors().expect("Failed to create CORS fairing");

    let credentials = CredentialService::new(config.auth.hash_cost);
    let sessions = CookieSessionManager::new(&config.auth);

    // server.port/address and the cookie key feed Rocket's own figment so
    // one Storefront.toml configures everything. An unset cookie key falls
    // back to Rocket's per-launch random key (debug profile only).
    let mut figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()));
    if !config.auth.cookie_signing_secret.is_empty() {
        figment = figment.merge(("secret_key", config.auth.cookie_signing_secret.clone()));
    }

    rocket::custom(figment)
        .attach(cors)
        .attach(RequestLogger)
        .attach(stage_db(config.database.clone()))
        .manage(credentials)
        .manage(sessions)
        .manage(config)
        .mount("/api/v1/auth", app_routes::auth::routes())
        .mount("/api/v1/users", app_routes::user::routes())
        .mount("/api/v1/health", app_routes::health::routes())
        .register("/api/v1", app_routes::error::catchers())
}
