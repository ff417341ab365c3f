use thiserror::Error;

#[derive(Debug, Error)]
pub enum CardioRiskError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("FHIR resource error: {0}")]
    Fhir(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calculation error: {0}")]
    Calculation(String),

    #[error("Request to {operation} timed out")]
    Timeout { operation: String },

    #[error("Upstream returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network capabilities capped: {0}")]
    Security(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardioRiskError {
    /// HTTP status an upstream failure should surface as.
    pub fn status_code(&self) -> u16 {
        match self {
            CardioRiskError::Authorization(_) => 401,
            CardioRiskError::Timeout { .. } => 504,
            CardioRiskError::Status { status, .. } => *status,
            CardioRiskError::Config(_) | CardioRiskError::Calculation(_) => 400,
            CardioRiskError::Security(_) => 403,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, CardioRiskError>;
