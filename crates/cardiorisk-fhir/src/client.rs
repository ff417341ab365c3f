//! Bearer-authenticated FHIR R4 reads.

use cardiorisk_common::sandbox::SandboxClient;
use cardiorisk_common::{CardioRiskError, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

/// A FHIR read the record page needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FhirQuery {
    /// `GET {base}/Patient/{id}`
    Patient { id: String },
    /// `GET {base}/Observation?patient=..&category=..&code=..`
    Observation {
        patient: String,
        category: Option<String>,
        code: Option<String>,
    },
}

impl FhirQuery {
    pub fn observation(patient: &str, category: &str, code: &str) -> Self {
        FhirQuery::Observation {
            patient: patient.to_string(),
            category: Some(category.to_string()),
            code: Some(code.to_string()),
        }
    }

    /// Resolve the query against `base_url`.
    pub fn url(&self, base_url: &str) -> Result<String> {
        let base = base_url.trim_end_matches('/');
        let invalid_base = |reason: String| {
            CardioRiskError::Config(format!("Invalid FHIR base URL {base}: {reason}"))
        };
        let mut url = url::Url::parse(base).map_err(|e| invalid_base(e.to_string()))?;

        match self {
            FhirQuery::Patient { id } => {
                if id.is_empty() {
                    return Err(CardioRiskError::Fhir("patient id cannot be empty".into()));
                }
                url.path_segments_mut()
                    .map_err(|_| invalid_base("cannot be a base".into()))?
                    .pop_if_empty()
                    .extend(["Patient", id.as_str()]);
            }
            FhirQuery::Observation { patient, category, code } => {
                if patient.is_empty() {
                    return Err(CardioRiskError::Fhir("patient id cannot be empty".into()));
                }
                if category.is_none() && code.is_none() {
                    return Err(CardioRiskError::Fhir(
                        "Observation search needs a category or a code".into(),
                    ));
                }
                url.path_segments_mut()
                    .map_err(|_| invalid_base("cannot be a base".into()))?
                    .pop_if_empty()
                    .push("Observation");
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("patient", patient);
                if let Some(category) = category {
                    pairs.append_pair("category", category);
                }
                if let Some(code) = code {
                    pairs.append_pair("code", code);
                }
            }
        }
        Ok(url.into())
    }
}

/// FHIR client bound to one server and one access token.
#[derive(Debug)]
pub struct FhirClient {
    http: SandboxClient,
    base_url: String,
    token: SecretString,
}

impl FhirClient {
    pub fn new(http: SandboxClient, base_url: impl Into<String>, token: SecretString) -> Self {
        Self { http, base_url: base_url.into(), token }
    }

    /// Fetch a resource as raw JSON.
    #[instrument(skip(self))]
    pub async fn get_json(&self, query: &FhirQuery) -> Result<serde_json::Value> {
        let url = query.url(&self.base_url)?;
        debug!(url = %url, "Sending FHIR request");

        let resp = self
            .http
            .get(&url)?
            .bearer_auth(self.token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/fhir+json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Request to FHIR server timed out");
                    CardioRiskError::Timeout { operation: "FHIR server".into() }
                } else {
                    error!(error = %e, "HTTP request failed");
                    CardioRiskError::Fhir(format!("Failed to connect to FHIR server: {e}"))
                }
            })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(CardioRiskError::Status {
                status: status.as_u16(),
                message: "Failed to load patient data.".into(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to decode JSON response");
            CardioRiskError::Fhir(
                "Received invalid JSON from FHIR server. The app may lack Read/Search \
                 scope for this resource or may not be registered with the EHR."
                    .into(),
            )
        })
    }
}
