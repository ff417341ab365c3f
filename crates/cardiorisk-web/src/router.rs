//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::handlers::{
    calculate::calculate_ascvd_risk,
    launch::{authorize, callback, index},
    record::{render_data, submit_form},
    system::health,
};
use crate::state::{AppState, SharedState};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let cors = cors_layer(&state.config.server.allowed_origins);
    let shared: SharedState = Arc::new(state);

    Router::new()
        // SMART launch
        .route("/",            get(index).post(index))
        .route("/index.html",  get(index).post(index))
        .route("/authorize",   get(authorize))
        .route("/fhir-app/",   get(callback).post(callback))

        // Pages
        .route("/render_data",        get(render_data))
        .route("/render_data/submit", post(submit_form))

        // API endpoints
        .route("/calculate_ascvd_risk", post(calculate_ascvd_risk))
        .route("/health",               get(health))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
