//! REST endpoint handlers.
//!
//! Handlers only translate between wire bodies and `patients-core`; all validation, merging and
//! persistence happens in [`PatientService`](patients_core::PatientService).

use crate::{ApiError, AppState};
use api_shared::{
    CreatePatientReq, ErrorRes, HealthRes, HealthService, MessageRes, PatientMapRes, PatientRes,
    SortQuery, UpdatePatientReq,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use patients_core::{PatientChanges, PatientId, SortField, SortOrder};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root,
        about,
        health,
        view,
        view_patient,
        sort_patients,
        create_patient,
        edit_patient,
        delete_patient,
    ),
    components(schemas(
        HealthRes,
        MessageRes,
        ErrorRes,
        PatientRes,
        PatientMapRes,
        CreatePatientReq,
        UpdatePatientReq,
    ))
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = MessageRes)
    )
)]
pub(crate) async fn root() -> Json<MessageRes> {
    Json(MessageRes::new("Patient management system API"))
}

#[utoipa::path(
    get,
    path = "/about",
    responses(
        (status = 200, description = "Service description", body = MessageRes)
    )
)]
pub(crate) async fn about() -> Json<MessageRes> {
    Json(MessageRes::new(
        "A fully functional API to manage your patient records efficiently.",
    ))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancer checks.
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/view",
    responses(
        (status = 200, description = "All patients keyed by identifier", body = PatientMapRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Returns every patient record, keyed by identifier.
#[axum::debug_handler]
pub(crate) async fn view(State(state): State<AppState>) -> Result<Json<PatientMapRes>, ApiError> {
    let patients = state.patient_service.list()?;
    Ok(Json(patients.iter().collect()))
}

#[utoipa::path(
    get,
    path = "/patient/{patient_id}",
    params(
        ("patient_id" = String, Path, description = "Id of the patient in the DB", example = "P001")
    ),
    responses(
        (status = 200, description = "Patient record", body = PatientRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn view_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientRes>, ApiError> {
    let id = PatientId::parse(&patient_id)?;
    let patient = state.patient_service.get(&id)?;
    Ok(Json(PatientRes::from(&patient)))
}

#[utoipa::path(
    get,
    path = "/sort",
    params(SortQuery),
    responses(
        (status = 200, description = "Patients sorted by the requested field", body = [PatientRes]),
        (status = 400, description = "Missing or invalid sort field or order", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Sorts patients by height, weight or BMI.
///
/// Parameter errors are client errors (400) rather than body validation errors (422).
#[axum::debug_handler]
pub(crate) async fn sort_patients(
    State(state): State<AppState>,
    query: Result<Query<SortQuery>, QueryRejection>,
) -> Result<Json<Vec<PatientRes>>, ApiError> {
    let Query(query) = query?;
    let field = query.sort_by.parse::<SortField>().map_err(|_| {
        ApiError::bad_request(format!(
            "Invalid field, select from {}",
            SortField::ALL.map(SortField::as_str).join(", ")
        ))
    })?;
    let order = match query.order.as_deref() {
        Some(raw) => raw
            .parse::<SortOrder>()
            .map_err(|_| ApiError::bad_request("Invalid order, select between asc and desc"))?,
        None => SortOrder::default(),
    };

    let patients = state.patient_service.sorted(field, order)?;
    Ok(Json(patients.iter().map(PatientRes::from).collect()))
}

#[utoipa::path(
    post,
    path = "/create",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = PatientRes),
        (status = 400, description = "Patient already exists or malformed JSON", body = ErrorRes),
        (status = 422, description = "Invalid patient data", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Creates a new patient record.
///
/// # Errors
/// - `400` if a patient with the same identifier already exists,
/// - `422` if any field fails validation,
/// - `500` if the patient document cannot be read or written.
#[axum::debug_handler]
pub(crate) async fn create_patient(
    State(state): State<AppState>,
    req: Result<Json<CreatePatientReq>, JsonRejection>,
) -> Result<(StatusCode, Json<PatientRes>), ApiError> {
    let Json(req) = req?;
    let (raw_id, fields) = req.into_parts();
    let id = PatientId::parse(&raw_id)?;
    let patient = state.patient_service.create(id, fields)?;
    Ok((StatusCode::CREATED, Json(PatientRes::from(&patient))))
}

#[utoipa::path(
    put,
    path = "/edit/{patient_id}",
    params(
        ("patient_id" = String, Path, description = "Id of the patient to update", example = "P001")
    ),
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Patient updated", body = PatientRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 422, description = "Invalid patient data", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Applies a partial update. Only the fields present in the body change.
#[axum::debug_handler]
pub(crate) async fn edit_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    req: Result<Json<UpdatePatientReq>, JsonRejection>,
) -> Result<Json<PatientRes>, ApiError> {
    let Json(req) = req?;
    let id = PatientId::parse(&patient_id)?;
    let changes = PatientChanges::from(req);
    let patient = state.patient_service.update(&id, &changes)?;
    Ok(Json(PatientRes::from(&patient)))
}

#[utoipa::path(
    delete,
    path = "/delete/{patient_id}",
    params(
        ("patient_id" = String, Path, description = "Id of the patient to delete", example = "P001")
    ),
    responses(
        (status = 200, description = "Patient deleted", body = MessageRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn delete_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<MessageRes>, ApiError> {
    let id = PatientId::parse(&patient_id)?;
    state.patient_service.delete(&id)?;
    Ok(Json(MessageRes::new("Patient deleted")))
}

pub(crate) async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
