//! FHIR client tests against an in-process mock FHIR server.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use cardiorisk_common::sandbox::SandboxClient;
use cardiorisk_common::CardioRiskError;
use cardiorisk_fhir::{FhirClient, FhirQuery, PatientRecord, SmartConfiguration};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer test-token")
}

async fn patient(Path(id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    if id != "p-1" {
        return (StatusCode::NOT_FOUND, Json(json!({"resourceType": "OperationOutcome"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "resourceType": "Patient",
            "name": [{"text": "Anna Lee"}],
            "birthDate": "1969-03-01",
            "gender": "female",
        })),
    )
}

async fn observation(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let value = match q.get("code").map(String::as_str) {
        Some("2093-3") => json!({"valueQuantity": {"value": 213, "unit": "mg/dL"}}),
        Some("2085-9") => json!({"valueQuantity": {"value": 50, "unit": "mg/dL"}}),
        Some("55284-4") => json!({"component": [
            {"code": {"coding": [{"code": "8480-6"}]}, "valueQuantity": {"value": 120, "unit": "mm[Hg]"}},
            {"code": {"coding": [{"code": "8462-4"}]}, "valueQuantity": {"value": 78, "unit": "mm[Hg]"}}
        ]}),
        Some("72166-2") => json!({"valueCodeableConcept": {"text": "Never smoker"}}),
        _ => return Json(json!({"resourceType": "Bundle", "total": 0, "entry": []})),
    };
    Json(json!({"resourceType": "Bundle", "total": 1, "entry": [{"resource": value}]}))
}

async fn token(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if form.get("code").map(String::as_str) != Some("good-code")
        || form.get("client_id").map(String::as_str) != Some("client-id")
    {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"})));
    }
    (
        StatusCode::OK,
        Json(json!({"access_token": "test-token", "token_type": "Bearer", "patient": "p-1"})),
    )
}

async fn spawn_mock() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let smart = json!({
        "authorization_endpoint": format!("{base}/auth/authorize"),
        "token_endpoint": format!("{base}/auth/token"),
    });
    let app = Router::new()
        .route(
            "/fhir/.well-known/smart-configuration",
            get(move || {
                let smart = smart.clone();
                async move { Json(smart) }
            }),
        )
        .route("/fhir/Patient/{id}", get(patient))
        .route("/fhir/Observation", get(observation))
        .route("/auth/token", post(token));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

fn sandbox(base: &str) -> SandboxClient {
    SandboxClient::for_urls([base], Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_launch_discovery_and_token_exchange() {
    let base = spawn_mock().await;
    let http = sandbox(&base);
    let fhir_base = format!("{base}/fhir");

    let smart = SmartConfiguration::discover(&http, &fhir_base).await.unwrap();
    assert_eq!(smart.token_endpoint, format!("{base}/auth/token"));

    let token = smart
        .exchange_code(&http, "good-code", "http://localhost/cb", "client-id")
        .await
        .unwrap();
    assert_eq!(token.access_token.expose_secret(), "test-token");
    assert_eq!(token.patient.as_deref(), Some("p-1"));

    let err = smart
        .exchange_code(&http, "bad-code", "http://localhost/cb", "client-id")
        .await
        .unwrap_err();
    assert!(matches!(err, CardioRiskError::Authorization(_)));
}

#[tokio::test]
async fn test_fetch_full_record() {
    let base = spawn_mock().await;
    let client = FhirClient::new(
        sandbox(&base),
        format!("{base}/fhir"),
        SecretString::from("test-token".to_string()),
    );

    let record = PatientRecord::fetch(&client, "p-1", 2024).await.unwrap();
    assert_eq!(record.patient.full_name(), "Anna Lee");
    assert_eq!(record.patient.age, Some(55));
    assert_eq!(record.labs.cholesterol, "213.0 mg/dL");
    assert_eq!(record.labs.hdl, "50.0 mg/dL");
    assert_eq!(record.vitals.systolic_bp, "120.0 mm[Hg]");
    assert_eq!(record.vitals.diastolic_bp, "78.0 mm[Hg]");
    assert_eq!(record.vitals.height, "No height data available due to empty bundle");
    assert_eq!(record.smoking_status, "Never smoker");
}

#[tokio::test]
async fn test_status_errors_surface() {
    let base = spawn_mock().await;
    let client = FhirClient::new(
        sandbox(&base),
        format!("{base}/fhir"),
        SecretString::from("wrong-token".to_string()),
    );
    let err = client
        .get_json(&FhirQuery::Patient { id: "p-1".into() })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_foreign_host_is_refused_before_sending() {
    let base = spawn_mock().await;
    let client = FhirClient::new(
        sandbox(&base),
        "https://elsewhere.example.org/fhir",
        SecretString::from("test-token".to_string()),
    );
    let err = client
        .get_json(&FhirQuery::Patient { id: "p-1".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, CardioRiskError::Security(_)));
}
