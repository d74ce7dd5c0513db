use crate::models::{ErrorResponse, Profile, UpdateConfigRequest, UpdateScheduleRequest};
use crate::routes::AppState;
use crate::services::{ProfileStore, StoreError};
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/participants/{id}", web::get().to(get_participant))
        .route("/participants/{id}/config", web::put().to(update_config))
        .route("/participants/{id}/schedule", web::put().to(update_schedule));
}

/// Get a stored profile
///
/// GET /api/v1/participants/{id}
async fn get_participant(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match state.store.get(&id).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => store_error_response(e),
    }
}

/// Update a participant's configuration
///
/// PUT /api/v1/participants/{id}/config
///
/// Request body:
/// ```json
/// {
///   "environment": "leetcode",
///   "experience": "medium",
///   "questionList": "topInterviewQuestions",
///   "topics": ["graphs"],
///   "soloDays": ["mon", "wed"],
///   "soloDifficulty": ["easy"],
///   "pairingDifficulty": ["medium"]
/// }
/// ```
///
/// Unknown ids get a fresh profile with this configuration.
async fn update_config(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateConfigRequest>,
) -> impl Responder {
    let id = path.into_inner();

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for config update of {}: {:?}", id, errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let mut profile = match state.store.get(&id).await {
        Ok(profile) => profile,
        Err(StoreError::NotFound(_)) => Profile::new(id.clone(), "", ""),
        Err(e) => return store_error_response(e),
    };

    if let Some(name) = &req.name {
        profile.name = name.clone();
    }
    if let Some(email) = &req.email {
        profile.email = email.clone();
    }
    profile.config = req.to_config();

    match state.store.upsert(profile.clone()).await {
        Ok(()) => {
            tracing::info!("Updated config for {}", id);
            HttpResponse::Ok().json(profile)
        }
        Err(e) => store_error_response(e),
    }
}

/// Opt in or out of tomorrow's pairing, or skip tomorrow entirely
///
/// PUT /api/v1/participants/{id}/schedule
async fn update_schedule(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateScheduleRequest>,
) -> impl Responder {
    let id = path.into_inner();

    let mut profile = match state.store.get(&id).await {
        Ok(profile) => profile,
        Err(e) => return store_error_response(e),
    };

    if let Some(pairing) = req.is_pairing_tomorrow {
        profile.is_pairing_tomorrow = pairing;
    }
    if let Some(skipping) = req.is_skipping_tomorrow {
        profile.is_skipping_tomorrow = skipping;
    }

    match state.store.upsert(profile.clone()).await {
        Ok(()) => HttpResponse::Ok().json(profile),
        Err(e) => store_error_response(e),
    }
}

fn store_error_response(err: StoreError) -> HttpResponse {
    match err {
        StoreError::NotFound(message) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Not found".to_string(),
            message,
            status_code: 404,
        }),
        StoreError::InvalidInput(message) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid input".to_string(),
            message,
            status_code: 400,
        }),
        other => {
            tracing::error!("Profile store failure: {}", other);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Profile store failure".to_string(),
                message: other.to_string(),
                status_code: 500,
            })
        }
    }
}
