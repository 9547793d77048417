//! # API REST
//!
//! REST API implementation for the patient records service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation
//! - REST-specific concerns (status codes, JSON error bodies, CORS)
//!
//! Uses `api-shared` for wire types and `patients-core` for all data operations.

#![warn(rust_2018_idioms)]

mod error;
mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use patients_core::PatientService;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

pub use error::ApiError;
pub use handlers::ApiDoc;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub patient_service: PatientService,
}

impl AppState {
    pub fn new(patient_service: PatientService) -> Self {
        Self { patient_service }
    }
}

/// Builds the full REST router.
///
/// | Method | Path |
/// |---|---|
/// | GET | `/`, `/about`, `/health` |
/// | GET | `/view`, `/patient/:patient_id`, `/sort` |
/// | POST | `/create` |
/// | PUT | `/edit/:patient_id` |
/// | DELETE | `/delete/:patient_id` |
/// | GET | `/api-docs/openapi.json` |
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/about", get(handlers::about))
        .route("/health", get(handlers::health))
        .route("/view", get(handlers::view))
        .route("/patient/:patient_id", get(handlers::view_patient))
        .route("/sort", get(handlers::sort_patients))
        .route("/create", post(handlers::create_patient))
        .route("/edit/:patient_id", put(handlers::edit_patient))
        .route("/delete/:patient_id", delete(handlers::delete_patient))
        .route("/api-docs/openapi.json", get(handlers::openapi))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Returns the OpenAPI document for the REST API.
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
