//! SMART EHR launch: launch entry point, authorization redirect, callback.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use cardiorisk_common::CardioRiskError;
use cardiorisk_fhir::smart::AuthorizationRequest;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::AppError;
use crate::session::{session_cookie, Session};
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct LaunchParams {
    #[serde(default)]
    pub launch: String,
    #[serde(default)]
    pub iss: String,
}

/// `GET|POST /` and `/index.html`: accept a launch from the registered
/// FHIR server and start a session for it.
#[instrument(skip(state, jar))]
pub async fn index(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(params): Query<LaunchParams>,
) -> Result<(CookieJar, Redirect), AppError> {
    let expected = state.config.smart.base_url();
    if params.iss.trim_end_matches('/') != expected {
        return Err(AppError::IssuerMismatch { iss: params.iss, expected: expected.to_string() });
    }

    let id = state
        .sessions
        .create(Session { launch: Some(params.launch), ..Session::default() })
        .await;
    info!(session = %id, "EHR launch accepted");
    Ok((jar.add(session_cookie(id)), Redirect::to("/authorize")))
}

/// `GET /authorize`: redirect the browser to the authorization server.
#[instrument(skip(state, jar))]
pub async fn authorize(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Redirect, AppError> {
    let (id, session) = state.sessions.lookup(&jar).await.ok_or(AppError::NoLaunch)?;
    let endpoints = state.smart().await?;

    let oauth_state = Uuid::new_v4().simple().to_string();
    let smart = &state.config.smart;
    let url = endpoints.configuration.authorization_url(&AuthorizationRequest {
        client_id: &smart.client_id,
        redirect_uri: &smart.redirect_uri,
        launch: session.launch.as_deref(),
        scope: &smart.scopes,
        state: &oauth_state,
        aud: smart.base_url(),
    })?;

    state.sessions.update(id, |s| s.oauth_state = Some(oauth_state)).await;
    Ok(Redirect::to(&url))
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
}

/// `GET|POST /fhir-app/`: verify `state`, exchange the code for a token.
#[instrument(skip(state, jar, params))]
pub async fn callback(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    let (id, session) = state.sessions.lookup(&jar).await.ok_or(AppError::InvalidState)?;
    match (&params.state, &session.oauth_state) {
        (Some(got), Some(expected)) if got == expected => {}
        _ => return Err(AppError::InvalidState),
    }
    let code = params.code.ok_or_else(|| {
        AppError::TokenExchange(CardioRiskError::Authorization("missing authorization code".into()))
    })?;

    let endpoints = state.smart().await?;
    let smart = &state.config.smart;
    let token = endpoints
        .configuration
        .exchange_code(&endpoints.http, &code, &smart.redirect_uri, &smart.client_id)
        .await
        .map_err(AppError::TokenExchange)?;

    info!(session = %id, patient = ?token.patient, "access token obtained");
    let token = Arc::new(token);
    state
        .sessions
        .update(id, |s| {
            s.token = Some(token);
            s.oauth_state = None;
        })
        .await;
    Ok(Redirect::to("/render_data"))
}
