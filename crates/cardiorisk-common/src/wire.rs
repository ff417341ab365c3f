//! JSON bodies exchanged with `POST /calculate_ascvd_risk`.

use serde::{Deserialize, Serialize};

use crate::questions::RiskAnswers;

/// Request body. Missing flags are treated as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRequest {
    #[serde(default)]
    pub has_diabetes: bool,
    #[serde(default)]
    pub is_smoking: bool,
    #[serde(default)]
    pub is_treating_hypertension: bool,
}

impl From<RiskAnswers> for RiskRequest {
    fn from(a: RiskAnswers) -> Self {
        Self {
            has_diabetes: a.has_diabetes,
            is_smoking: a.is_smoking,
            is_treating_hypertension: a.is_treating_hypertension,
        }
    }
}

impl From<RiskRequest> for RiskAnswers {
    fn from(r: RiskRequest) -> Self {
        Self {
            has_diabetes: r.has_diabetes,
            is_smoking: r.is_smoking,
            is_treating_hypertension: r.is_treating_hypertension,
        }
    }
}

/// Response body: opaque display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskResponse {
    pub result: String,
}
