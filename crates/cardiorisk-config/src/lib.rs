//! Configuration loading for cardiorisk.
//! Reads cardiorisk.toml from the current directory or the path in the
//! CARDIORISK_CONFIG env var; selected values can be overridden from the
//! environment (or a `.env` file).

use cardiorisk_common::{CardioRiskError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub smart: SmartConfig,
    #[serde(default)]
    pub calculator: CalculatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Idle time after which a browser session is forgotten.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_host()       -> String { "127.0.0.1".to_string() }
fn default_port()       -> u16    { 4201 }
fn default_static_dir() -> String { "static".to_string() }
fn default_allowed_origins() -> Vec<String> { vec!["http://localhost".to_string()] }
fn default_session_ttl()  -> u64    { 3600 }
fn default_max_sessions() -> usize  { 10_000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            allowed_origins: default_allowed_origins(),
            session_ttl_secs: default_session_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl ServerConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// SMART on FHIR client registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartConfig {
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_fhir_base_url")]
    pub fhir_base_url: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// For EHR launch the scope must contain `launch`, not `launch/patient`.
    #[serde(default = "default_scopes")]
    pub scopes: String,
    #[serde(default = "default_fhir_timeout")]
    pub request_timeout_secs: u64,
}

fn default_client_id()     -> String { "client-id".to_string() }
fn default_fhir_base_url() -> String { "https://launch.smarthealthit.org/v/r4/fhir".to_string() }
fn default_redirect_uri()  -> String { "http://localhost:4201/fhir-app/".to_string() }
fn default_scopes()        -> String {
    "patient/Patient.rs patient/Observation.rs launch offline_access openid fhirUser".to_string()
}
fn default_fhir_timeout()  -> u64 { 10 }

impl Default for SmartConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            fhir_base_url: default_fhir_base_url(),
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
            request_timeout_secs: default_fhir_timeout(),
        }
    }
}

impl SmartConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.fhir_base_url.trim_end_matches('/')
    }
}

/// Where form submissions are scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Remote `/calculate_ascvd_risk` URL. When unset the server scores
    /// submissions in-process.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_calc_timeout")]
    pub request_timeout_secs: u64,
}

fn default_calc_timeout() -> u64 { 30 }

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self { endpoint: None, request_timeout_secs: default_calc_timeout() }
    }
}

impl CalculatorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}


impl Config {
    /// Load configuration from cardiorisk.toml.
    /// Checks CARDIORISK_CONFIG env var first, then current directory.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path = std::env::var("CARDIORISK_CONFIG")
            .unwrap_or_else(|_| "cardiorisk.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CardioRiskError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CardioRiskError::Config(e.to_string()))
    }

    /// Apply `CARDIORISK_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CARDIORISK_FHIR_BASE_URL") {
            self.smart.fhir_base_url = v;
        }
        if let Some(v) = lookup("CARDIORISK_CLIENT_ID") {
            self.smart.client_id = v;
        }
        if let Some(v) = lookup("CARDIORISK_REDIRECT_URI") {
            self.smart.redirect_uri = v;
        }
        if let Some(v) = lookup("CARDIORISK_CALCULATOR_ENDPOINT") {
            self.calculator.endpoint = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = lookup("CARDIORISK_PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| CardioRiskError::Config(format!("CARDIORISK_PORT is not a port: {v}")))?;
        }
        Ok(())
    }
}
