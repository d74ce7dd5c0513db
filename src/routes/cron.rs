use crate::models::ErrorResponse;
use crate::routes::AppState;
use crate::services::run_daily;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Datelike;

/// Header set by the scheduler on genuine cron requests
const CRON_HEADER: &str = "X-Appengine-Cron";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/cron/daily", web::post().to(daily_run));
}

/// Daily trigger endpoint
///
/// POST /api/v1/cron/daily
///
/// Sends solo questions, runs the matching engine and notifies pairs.
/// Requests without the cron header are answered with 404 when the header is
/// required.
async fn daily_run(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if state.require_cron_header && !is_cron_request(&req) {
        tracing::warn!("Rejected daily run without cron header from {:?}", req.peer_addr());
        return HttpResponse::NotFound().finish();
    }

    let today = chrono::Utc::now().weekday();

    match run_daily(
        state.store.as_ref(),
        state.notifier.as_ref(),
        &state.matcher,
        state.match_budget,
        &state.messages,
        today,
    )
    .await
    {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            tracing::error!("Daily run failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Daily run failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

fn is_cron_request(req: &HttpRequest) -> bool {
    req.headers()
        .get(CRON_HEADER)
        .and_then(|value| value.to_str().ok())
        == Some("true")
}
