//! `POST /calculate_ascvd_risk`

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use cardiorisk_common::{RiskRequest, RiskResponse};
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::risk::assess;
use crate::state::SharedState;

/// Combine the posted answers with the session's patient record.
#[instrument(skip(state, jar))]
pub async fn calculate_ascvd_risk(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(request): Json<RiskRequest>,
) -> Result<Json<RiskResponse>, AppError> {
    let record = state
        .sessions
        .lookup(&jar)
        .await
        .and_then(|(_, session)| session.record)
        .ok_or(AppError::Unauthenticated)?;

    let result = assess(&record, request.into());
    debug!(%result, "risk assessed");
    Ok(Json(RiskResponse { result }))
}
