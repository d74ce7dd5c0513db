mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use config::Settings;
use crate::core::Matcher;
use routes::AppState;
use services::{InMemoryProfileStore, Messages, ZulipClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Logging itself is configured, so nothing can be traced before this
    let settings = Settings::load().unwrap_or_else(|e| panic!("Configuration error: {}", e));

    // Initialize logging; PAIRBOT__LOGGING__LEVEL overrides the file
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.logging.level))
        .with_target(false)
        .with_level(true);

    if settings.logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting pairing bot...");
    info!("Configuration loaded successfully");

    // Profile store, optionally seeded from disk
    let store = match &settings.store.seed_path {
        Some(path) => InMemoryProfileStore::from_file(path).await.unwrap_or_else(|e| {
            error!("Failed to load profiles from {}: {}", path, e);
            panic!("Profile store error: {}", e);
        }),
        None => {
            info!("No seed file configured, starting with an empty profile store");
            InMemoryProfileStore::new()
        }
    };
    let store = Arc::new(store);

    // Zulip client is built once here and shared by every run
    if settings.zulip.api_key.is_empty() {
        error!("Zulip API key is empty; notifications will be rejected");
    }
    let timeout = Duration::from_secs(settings.zulip.timeout_secs.unwrap_or(30));
    let notifier = ZulipClient::new(
        settings.zulip.api_url.clone(),
        settings.zulip.bot_email.clone(),
        settings.zulip.api_key.clone(),
        timeout,
    )
    .map_err(std::io::Error::other)?;
    let notifier = Arc::new(notifier);

    info!("Zulip client initialized for {}", settings.zulip.bot_email);

    let defaults = Matcher::with_default_settings();
    let matcher = Matcher::new(
        settings.matching.workers.unwrap_or(defaults.workers()),
        settings.matching.split_depth.unwrap_or(defaults.split_depth()),
    );

    let match_budget = settings.matching.budget();

    info!(
        "Matcher initialized with {} workers, split depth {}, {:?} budget",
        matcher.workers(),
        matcher.split_depth(),
        match_budget
    );

    let messages = Messages {
        matched: settings.messages.matched.clone(),
        odd_one_out: settings.messages.odd_one_out.clone(),
        solo: settings.messages.solo.clone(),
    };

    let app_state = AppState {
        store,
        notifier,
        matcher,
        match_budget,
        messages: Arc::new(messages),
        require_cron_header: settings.cron.require_header,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
