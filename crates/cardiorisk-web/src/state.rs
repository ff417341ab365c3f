//! Shared application state for the web server.

use std::sync::Arc;

use cardiorisk_common::sandbox::SandboxClient;
use cardiorisk_common::{CardioRiskError, Result};
use cardiorisk_config::Config;
use cardiorisk_fhir::{PatientRecord, SmartConfiguration};
use minijinja::Environment;
use tokio::sync::OnceCell;
use tracing::info;
use uuid::Uuid;

use crate::render;
use crate::risk::{HttpRiskClient, LocalRiskService, RiskService};
use crate::session::SessionStore;

/// Discovered SMART endpoints and a client allowed to reach them.
pub struct SmartEndpoints {
    pub configuration: SmartConfiguration,
    pub http: SandboxClient,
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: Config,
    /// Client restricted to the FHIR server's host.
    pub fhir_http: SandboxClient,
    pub sessions: SessionStore,
    pub templates: Environment<'static>,
    smart: OnceCell<SmartEndpoints>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let fhir_http = SandboxClient::for_urls(
            [config.smart.base_url()],
            config.smart.request_timeout(),
        )?;
        Ok(Self {
            fhir_http,
            sessions: SessionStore::new(
                config.server.session_ttl(),
                config.server.max_sessions,
            ),
            templates: render::environment()
                .map_err(|e| CardioRiskError::Config(format!("Invalid template: {}", e)))?,
            smart: OnceCell::new(),
            config,
        })
    }

    /// SMART configuration, discovered on first use and cached.
    pub async fn smart(&self) -> Result<&SmartEndpoints> {
        self.smart
            .get_or_try_init(|| async {
                let configuration =
                    SmartConfiguration::discover(&self.fhir_http, self.config.smart.base_url()).await?;
                let http = SandboxClient::for_urls(
                    [
                        configuration.authorization_endpoint.as_str(),
                        configuration.token_endpoint.as_str(),
                    ],
                    self.config.smart.request_timeout(),
                )?;
                info!(token_endpoint = %configuration.token_endpoint, "SMART endpoints ready");
                Ok(SmartEndpoints { configuration, http })
            })
            .await
    }

    /// Risk service for a session's form: the configured remote endpoint
    /// when there is one, otherwise in-process.
    pub fn risk_service(&self, session: Uuid, record: Arc<PatientRecord>) -> Result<Arc<dyn RiskService>> {
        match &self.config.calculator.endpoint {
            Some(endpoint) => {
                let client = HttpRiskClient::new(endpoint.clone(), self.config.calculator.request_timeout())?
                    .with_session(session.to_string());
                Ok(Arc::new(client))
            }
            None => Ok(Arc::new(LocalRiskService::new(record))),
        }
    }
}

pub type SharedState = Arc<AppState>;
