//! Patient record page and its server-side form submission.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use cardiorisk_common::{CardioRiskError, Selections};
use cardiorisk_fhir::{FhirClient, PatientRecord};
use chrono::Datelike;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use crate::derived::derived_table;
use crate::error::AppError;
use crate::form::{FormController, FormView};
use crate::render;
use crate::state::SharedState;

/// `GET /render_data`: fetch the patient's data and render the record.
#[instrument(skip(state, jar))]
pub async fn render_data(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Html<String>, AppError> {
    let (id, session) = state.sessions.lookup(&jar).await.ok_or(AppError::Unauthenticated)?;
    let token = session.token.ok_or(AppError::Unauthenticated)?;
    let patient_id = token.patient.clone().ok_or_else(|| {
        AppError::RecordFetch(CardioRiskError::Authorization(
            "access token carries no patient context".into(),
        ))
    })?;

    let client = FhirClient::new(
        state.fhir_http.clone(),
        state.config.smart.base_url(),
        SecretString::from(token.access_token.expose_secret().to_string()),
    );
    let year = chrono::Utc::now().year();
    let record = PatientRecord::fetch(&client, &patient_id, year)
        .await
        .map_err(AppError::RecordFetch)?;
    let record = Arc::new(record);

    let service = state.risk_service(id, Arc::clone(&record))?;
    let controller = Arc::new(FormController::new(service));
    let table = record.to_table();
    let derived = derived_table(&record);
    state
        .sessions
        .update(id, |s| {
            s.record = Some(record);
            s.form = Some(controller);
        })
        .await;

    info!(session = %id, "record page rendered");
    let html = render::record_page(&state.templates, &table, &derived, &Selections::default(), &FormView::new())?;
    Ok(Html(html))
}

/// `POST /render_data/submit`: run the risk form against the session's
/// record and re-render the page with the outcome.
#[instrument(skip(state, jar))]
pub async fn submit_form(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(selections): Form<Selections>,
) -> Result<Html<String>, AppError> {
    let (_, session) = state.sessions.lookup(&jar).await.ok_or(AppError::Unauthenticated)?;
    let (record, controller) = match (session.record, session.form) {
        (Some(record), Some(form)) => (record, form),
        _ => return Err(AppError::Unauthenticated),
    };

    let table = record.to_table();
    let view = match controller.submit(&table, &selections).await {
        Some(view) => view,
        None => controller.view().await,
    };
    let html = render::record_page(&state.templates, &table, &derived_table(&record), &selections, &view)?;
    Ok(Html(html))
}
