use api_rest::{router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use patients_core::{InMemoryStore, JsonFileStore, PatientService, RecordStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

const SEED: &str = r#"{
  "P001": {"name": "Ananya Verma", "city": "Guwahati", "age": 28, "gender": "female", "height": 1.72, "weight": 80.0},
  "P002": {"name": "Ravi Mehta", "city": "Mumbai", "age": 35, "gender": "male", "height": 1.60, "weight": 50.0},
  "P003": {"name": "Sneha Kulkarni", "city": "Pune", "age": 22, "gender": "female", "height": 1.85, "weight": 95.0}
}"#;

fn app_with_store(store: Arc<dyn RecordStore>) -> Router {
    router(AppState::new(PatientService::new(store)))
}

fn seeded_app() -> (Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::with_document(SEED));
    (app_with_store(store.clone()), store)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_root_about_and_health() {
    let (app, _store) = seeded_app();

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Patient management system API");

    let (status, body) = send(&app, "GET", "/about", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("patient records"));

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_view_returns_all_patients_with_derived_fields() {
    let (app, _store) = seeded_app();

    let (status, body) = send(&app, "GET", "/view", None).await;
    assert_eq!(status, StatusCode::OK);

    let patients = body.as_object().unwrap();
    assert_eq!(patients.len(), 3);
    assert_eq!(body["P001"]["bmi"], 27.04);
    assert_eq!(body["P001"]["verdict"], "Overweight");
    assert_eq!(body["P002"]["verdict"], "Normal weight");
}

#[tokio::test]
async fn test_view_patient_found_and_missing() {
    let (app, _store) = seeded_app();

    let (status, body) = send(&app, "GET", "/patient/P002", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "P002");
    assert_eq!(body["name"], "Ravi Mehta");
    assert_eq!(body["bmi"], 19.53);

    let (status, body) = send(&app, "GET", "/patient/P404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Patient not found");
}

#[tokio::test]
async fn test_sort_by_bmi_and_height() {
    let (app, _store) = seeded_app();

    let (status, body) = send(&app, "GET", "/sort?sort_by=bmi", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["P002", "P001", "P003"]);

    let (status, body) = send(&app, "GET", "/sort?sort_by=bmi&order=desc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["P003", "P001", "P002"]);

    let (status, body) = send(&app, "GET", "/sort?sort_by=height&order=asc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["P002", "P001", "P003"]);
}

#[tokio::test]
async fn test_sort_rejects_bad_parameters() {
    let (app, _store) = seeded_app();

    let (status, body) = send(&app, "GET", "/sort?sort_by=age", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("height, weight, bmi"));

    let (status, body) = send(&app, "GET", "/sort?sort_by=bmi&order=sideways", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("asc"));

    let (status, body) = send(&app, "GET", "/sort", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("sort_by"));
}

#[tokio::test]
async fn test_create_patient_and_reject_duplicate() {
    let (app, store) = seeded_app();

    let new_patient = json!({
        "id": "P004",
        "name": "Arjun Das",
        "city": "Chennai",
        "age": 45,
        "gender": "Male",
        "height": 1.72,
        "weight": 80
    });

    let (status, body) = send(&app, "POST", "/create", Some(new_patient.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "P004");
    assert_eq!(body["gender"], "male");
    assert_eq!(body["bmi"], 27.04);
    assert_eq!(body["verdict"], "Overweight");

    let saved = store.document().unwrap().unwrap();
    assert!(saved.contains("\"P004\""));

    let (status, body) = send(&app, "POST", "/create", Some(new_patient)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Patient already exists");
    assert_eq!(store.document().unwrap().unwrap(), saved);
}

#[tokio::test]
async fn test_create_rejects_invalid_fields() {
    let (app, store) = seeded_app();

    let (status, body) = send(
        &app,
        "POST",
        "/create",
        Some(json!({
            "id": "P005", "name": "Old Timer", "city": "Agra",
            "age": 120, "gender": "male", "height": 1.7, "weight": 70
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("age"));

    let (status, body) = send(
        &app,
        "POST",
        "/create",
        Some(json!({
            "id": "P005", "name": "Someone", "city": "Agra",
            "age": 30, "gender": "robot", "height": 1.7, "weight": 70
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("gender"));

    let (status, body) = send(
        &app,
        "POST",
        "/create",
        Some(json!({"id": "P005", "name": "Missing Fields"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("missing field"));

    // nothing was written by the failed requests
    assert!(store.document().unwrap().unwrap().contains("\"P001\""));
    assert!(!store.document().unwrap().unwrap().contains("P005"));
}

#[tokio::test]
async fn test_edit_city_only_keeps_bmi() {
    let (app, store) = seeded_app();

    let (status, body) = send(&app, "PUT", "/edit/P001", Some(json!({"city": "Shillong"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "Shillong");
    assert_eq!(body["name"], "Ananya Verma");
    assert_eq!(body["bmi"], 27.04);
    assert_eq!(body["verdict"], "Overweight");

    let saved = store.document().unwrap().unwrap();
    assert!(saved.contains("Shillong"));
    assert!(!saved.contains("bmi"));
}

#[tokio::test]
async fn test_edit_weight_recomputes_verdict() {
    let (app, _store) = seeded_app();

    let (status, body) = send(&app, "PUT", "/edit/P001", Some(json!({"weight": 60}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bmi"], 20.28);
    assert_eq!(body["verdict"], "Normal weight");

    let (_, body) = send(&app, "GET", "/patient/P001", None).await;
    assert_eq!(body["weight"], 60.0);
    assert_eq!(body["bmi"], 20.28);
}

#[tokio::test]
async fn test_edit_rejects_unknown_patient_identifier_change_and_invalid_merge() {
    let (app, store) = seeded_app();
    let before = store.load().unwrap();

    let (status, _body) = send(&app, "PUT", "/edit/P999", Some(json!({"city": "Goa"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "PUT", "/edit/P001", Some(json!({"id": "P100"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("unknown field `id`"));

    let (status, body) = send(&app, "PUT", "/edit/P001", Some(json!({"height": 0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("height"));

    assert_eq!(store.load().unwrap(), before);
}

#[tokio::test]
async fn test_malformed_json_body_gets_detail() {
    let (app, store) = seeded_app();
    let before = store.document().unwrap();

    for (method, uri) in [("POST", "/create"), ("PUT", "/edit/P001")] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from("{\"city\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json",
            "{method} {uri}"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].is_string());
    }

    assert_eq!(store.document().unwrap(), before);
}

#[tokio::test]
async fn test_create_rejects_overflowing_bmi() {
    let (app, store) = seeded_app();

    let (status, body) = send(
        &app,
        "POST",
        "/create",
        Some(json!({
            "id": "P006", "name": "Tiny", "city": "Agra",
            "age": 30, "gender": "male", "height": 1e-200, "weight": 70
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("height"));
    assert!(!store.document().unwrap().unwrap().contains("P006"));
}

#[tokio::test]
async fn test_delete_patient() {
    let (app, _store) = seeded_app();

    let (status, body) = send(&app, "DELETE", "/delete/P002", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Patient deleted");

    let (status, _body) = send(&app, "GET", "/patient/P002", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _body) = send(&app, "DELETE", "/delete/P002", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/view", None).await;
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_corrupt_document_is_internal_error() {
    let store = Arc::new(InMemoryStore::with_document("{ not json"));
    let app = app_with_store(store);

    let (status, body) = send(&app, "GET", "/view", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Internal error");
}

#[tokio::test]
async fn test_file_backed_crud_round_trip() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("patients.json");
    let app = app_with_store(Arc::new(JsonFileStore::new(&path)));

    let (status, body) = send(&app, "GET", "/view", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_object().unwrap().is_empty());

    let (status, _body) = send(
        &app,
        "POST",
        "/create",
        Some(json!({
            "id": "P010", "name": "Kavya Iyer", "city": "Bengaluru",
            "age": 31, "gender": "female", "height": 1.58, "weight": 52
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["P010"]["city"], "Bengaluru");
    assert!(on_disk["P010"].get("bmi").is_none());
    assert!(on_disk["P010"].get("id").is_none());

    let (status, _body) = send(&app, "DELETE", "/delete/P010", None).await;
    assert_eq!(status, StatusCode::OK);

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(on_disk.as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let (app, _store) = seeded_app();

    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/create"));
    assert!(paths.contains_key("/edit/{patient_id}"));
    assert!(paths.contains_key("/sort"));
}
