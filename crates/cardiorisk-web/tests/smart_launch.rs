//! Full EHR launch over real sockets against a mock FHIR server.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use cardiorisk_config::Config;
use cardiorisk_web::{router::build_router, state::AppState};
use reqwest::header;
use serde_json::{json, Value};
use url::Url;

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer launch-token")
}

async fn patient(Path(id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) || id != "p-42" {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "resourceType": "Patient",
            "name": [{"given": ["maria"], "family": "garcia"}],
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
            {"code": {"coding": [{"code": "8462-4"}]}, "valueQuantity": {"value": 80, "unit": "mm[Hg]"}}
        ]}),
        _ => return Json(json!({"resourceType": "Bundle", "total": 0, "entry": []})),
    };
    Json(json!({"resourceType": "Bundle", "total": 1, "entry": [{"resource": value}]}))
}

async fn token(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if form.get("code").map(String::as_str) != Some("auth-code") {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"})));
    }
    (
        StatusCode::OK,
        Json(json!({"access_token": "launch-token", "token_type": "Bearer", "patient": "p-42"})),
    )
}

/// Mock FHIR + authorization server; returns the FHIR base URL.
async fn spawn_fhir() -> String {
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
    format!("{base}/fhir")
}

/// The app under test. `calculator` of `None` points the form at the
/// app's own risk endpoint.
async fn spawn_app(fhir_base: &str, calculator: Option<String>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let app_base = format!("http://{}", listener.local_addr().unwrap());

    let mut config = Config::default();
    config.smart.fhir_base_url = fhir_base.to_string();
    config.smart.redirect_uri = format!("{app_base}/fhir-app/");
    config.calculator.endpoint =
        Some(calculator.unwrap_or_else(|| format!("{app_base}/calculate_ascvd_risk")));

    let app = build_router(AppState::new(config).unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    app_base
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn location(resp: &reqwest::Response) -> String {
    resp.headers()[header::LOCATION].to_str().unwrap().to_string()
}

/// Walk launch → authorize → callback and return the session cookie.
async fn launch(http: &reqwest::Client, app: &str, fhir_base: &str) -> String {
    let resp = http
        .get(format!("{app}/"))
        .query(&[("launch", "launch-123"), ("iss", fhir_base)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/authorize");
    let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let resp = http
        .get(format!("{app}/authorize"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let auth_url = Url::parse(&location(&resp)).unwrap();
    assert!(auth_url.path().ends_with("/auth/authorize"));
    let params: HashMap<String, String> = auth_url.query_pairs().into_owned().collect();
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["launch"], "launch-123");
    assert_eq!(params["aud"], fhir_base);
    assert_eq!(params["redirect_uri"], format!("{app}/fhir-app/"));
    let state = params["state"].clone();

    let resp = http
        .get(format!("{app}/fhir-app/"))
        .query(&[("state", "forged"), ("code", "auth-code")])
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = http
        .get(format!("{app}/fhir-app/"))
        .query(&[("state", state.as_str()), ("code", "auth-code")])
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/render_data");
    cookie
}

async fn submit(http: &reqwest::Client, app: &str, cookie: &str, body: &str) -> String {
    http.post(format!("{app}/render_data/submit"))
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body.to_string())
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_launch_render_and_submit() {
    let fhir = spawn_fhir().await;
    let app = spawn_app(&fhir, None).await;
    let http = client();
    let cookie = launch(&http, &app, &fhir).await;

    let resp = http
        .get(format!("{app}/render_data"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("<td>Maria Garcia</td>"));
    assert!(html.contains("<td>120.0 mm[Hg]</td>"));
    assert!(html.contains("No height data available due to empty bundle"));

    // The form posts through HttpRiskClient back to this app's endpoint.
    let html = submit(&http, &app, &cookie, "diabetes=no&smoking=yes&treatingHTN=no").await;
    assert!(html.contains("10-year ASCVD risk: "), "{html}");
    assert!(html.contains(r#"id="smokingError" hidden"#));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_calculator_shows_retry_message() {
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let fhir = spawn_fhir().await;
    let app = spawn_app(&fhir, Some(format!("http://{dead_addr}/calculate_ascvd_risk"))).await;
    let http = client();
    let cookie = launch(&http, &app, &fhir).await;

    let status = http
        .get(format!("{app}/render_data"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::OK);

    let html = submit(&http, &app, &cookie, "diabetes=no&smoking=no&treatingHTN=yes").await;
    assert!(html.contains("An error occurred during the calculation. Please try again later."));
}
