// Route exports
pub mod cron;
pub mod participants;

use crate::core::Matcher;
use crate::models::HealthResponse;
use crate::services::{InMemoryProfileStore, Messages, ZulipClient};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InMemoryProfileStore>,
    pub notifier: Arc<ZulipClient>,
    pub matcher: Matcher,
    /// Wall-clock limit handed to each matching run
    pub match_budget: Duration,
    pub messages: Arc<Messages>,
    pub require_cron_header: bool,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(cron::configure)
            .configure(participants::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    tracing::trace!("Health check ({} profiles stored)", state.store.len().await);

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
