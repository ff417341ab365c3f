//! Risk calculation services used by the form and the JSON endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cardiorisk_calc::pooled_cohort::ten_year_risk;
use cardiorisk_calc::{
    PooledCohortInput, PopulationGroup, Quantity, Sex, AGE_RANGE_MESSAGE, ASCVD_AGE_RANGE,
};
use cardiorisk_common::{CardioRiskError, Result, RiskAnswers, RiskRequest, RiskResponse};
use cardiorisk_fhir::PatientRecord;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::session::SESSION_COOKIE;

/// Anything that can turn an answer set into display text.
#[async_trait]
pub trait RiskService: Send + Sync {
    async fn calculate(&self, request: RiskRequest) -> Result<RiskResponse>;
}

/// Units the equations are calibrated for.
const LIPID_UNITS: &[&str] = &["mg/dL"];
const PRESSURE_UNITS: &[&str] = &["mm[Hg]", "mmHg"];

/// Compute the display text for `record` combined with `answers`.
///
/// Unusable inputs yield an explanatory sentence rather than an error, so
/// the text can go straight into the result container.
pub fn assess(record: &PatientRecord, answers: RiskAnswers) -> String {
    let patient = &record.patient;

    let age = match patient.age {
        Some(age) => age,
        None => return "Age is not available, so the 10-year risk cannot be estimated.".to_string(),
    };
    if !ASCVD_AGE_RANGE.contains(&age) {
        return AGE_RANGE_MESSAGE.to_string();
    }

    let sex: Sex = match patient.gender.parse() {
        Ok(sex) => sex,
        Err(_) => {
            return format!(
                "Gender '{}' is not supported by the Pooled Cohort Equations; risk not available.",
                patient.gender
            )
        }
    };

    let lab = |name: &str, text: &str, units: &[&str]| -> std::result::Result<f64, String> {
        Quantity::parse(text)
            .filter(|q| units.iter().any(|u| *u == q.unit_str()))
            .map(|q| q.value)
            .filter(|v| *v > 0.0)
            .ok_or_else(|| format!("{name} is not available, so the 10-year risk cannot be estimated."))
    };
    let values = lab("Total cholesterol", &record.labs.cholesterol, LIPID_UNITS).and_then(|tc| {
        let hdl = lab("HDL", &record.labs.hdl, LIPID_UNITS)?;
        let sbp = lab("Systolic blood pressure", &record.vitals.systolic_bp, PRESSURE_UNITS)?;
        Ok((tc, hdl, sbp))
    });
    let (total_cholesterol, hdl, systolic_bp) = match values {
        Ok(v) => v,
        Err(message) => return message,
    };

    let input = PooledCohortInput {
        group: PopulationGroup::determine(&patient.race, sex),
        age,
        total_cholesterol,
        hdl,
        systolic_bp,
        answers,
    };
    match ten_year_risk(&input) {
        Ok(estimate) => estimate.to_string(),
        Err(e) => format!("10-year ASCVD risk not available: {e}"),
    }
}

/// Computes the risk in-process from a fetched record.
pub struct LocalRiskService {
    record: Arc<PatientRecord>,
}

impl LocalRiskService {
    pub fn new(record: Arc<PatientRecord>) -> Self {
        Self { record }
    }
}

#[async_trait]
impl RiskService for LocalRiskService {
    async fn calculate(&self, request: RiskRequest) -> Result<RiskResponse> {
        Ok(RiskResponse { result: assess(&self.record, request.into()) })
    }
}

/// Posts the answer set to a `/calculate_ascvd_risk` endpoint.
#[derive(Debug, Clone)]
pub struct HttpRiskClient {
    client: Client,
    endpoint: String,
    session: Option<String>,
}

impl HttpRiskClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CardioRiskError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, endpoint: endpoint.into(), session: None })
    }

    /// Send `session` as the session cookie so the endpoint can find the
    /// patient record.
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }
}

#[async_trait]
impl RiskService for HttpRiskClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn calculate(&self, request: RiskRequest) -> Result<RiskResponse> {
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(session) = &self.session {
            builder = builder.header(reqwest::header::COOKIE, format!("{SESSION_COOKIE}={session}"));
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CardioRiskError::Timeout { operation: "risk calculation".to_string() }
            } else {
                CardioRiskError::Http(e)
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CardioRiskError::Status {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        let body: RiskResponse = resp.json().await?;
        debug!(result = %body.result, "risk response received");
        Ok(body)
    }
}
