//! SMART App Launch: discovery, authorization request, token exchange.
//!
//! Discovery: `{iss}/.well-known/smart-configuration`
//! Token exchange uses the public-client flow: no secret, `client_id` in
//! the form body.

use cardiorisk_common::sandbox::SandboxClient;
use cardiorisk_common::{CardioRiskError, Result};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

/// The subset of `.well-known/smart-configuration` the launch needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SmartConfiguration {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
}

/// Parameters of the authorization redirect.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest<'a> {
    pub client_id: &'a str,
    pub redirect_uri: &'a str,
    /// Opaque launch token from the EHR; absent for standalone launch.
    pub launch: Option<&'a str>,
    pub scope: &'a str,
    pub state: &'a str,
    /// FHIR base URL the token is meant for.
    pub aud: &'a str,
}

/// Token endpoint response.
#[derive(Debug)]
pub struct TokenResponse {
    pub access_token: SecretString,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    /// Patient in context, set for EHR launch with `launch` scope.
    pub patient: Option<String>,
    pub refresh_token: Option<SecretString>,
}

#[derive(Deserialize)]
struct RawTokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: Option<u64>,
    scope: Option<String>,
    patient: Option<String>,
    refresh_token: Option<String>,
}

fn default_token_type() -> String { "Bearer".to_string() }

impl From<RawTokenResponse> for TokenResponse {
    fn from(raw: RawTokenResponse) -> Self {
        Self {
            access_token: SecretString::from(raw.access_token),
            token_type: raw.token_type,
            expires_in: raw.expires_in,
            scope: raw.scope,
            patient: raw.patient,
            refresh_token: raw.refresh_token.map(SecretString::from),
        }
    }
}

impl TokenResponse {
    /// Parses a token endpoint JSON body.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawTokenResponse = serde_json::from_str(body)?;
        Ok(raw.into())
    }
}

impl SmartConfiguration {
    /// Fetch the SMART configuration advertised by `base_url`.
    #[instrument(skip(http))]
    pub async fn discover(http: &SandboxClient, base_url: &str) -> Result<Self> {
        let url = format!(
            "{}/.well-known/smart-configuration",
            base_url.trim_end_matches('/')
        );
        let resp = http
            .get(&url)?
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CardioRiskError::Status {
                status: resp.status().as_u16(),
                message: "SMART configuration unavailable".to_string(),
            });
        }
        let config: SmartConfiguration = resp.json().await?;
        debug!(
            authorize = %config.authorization_endpoint,
            token = %config.token_endpoint,
            "SMART configuration discovered"
        );
        Ok(config)
    }

    /// Build the URL the browser is redirected to for authorization.
    pub fn authorization_url(&self, req: &AuthorizationRequest<'_>) -> Result<String> {
        let mut params = vec![
            ("response_type", "code"),
            ("client_id", req.client_id),
            ("redirect_uri", req.redirect_uri),
            ("scope", req.scope),
            ("state", req.state),
            ("aud", req.aud),
        ];
        if let Some(launch) = req.launch {
            params.push(("launch", launch));
        }
        let url = Url::parse_with_params(&self.authorization_endpoint, &params).map_err(|e| {
            CardioRiskError::Config(format!(
                "Invalid authorization endpoint {}: {}",
                self.authorization_endpoint, e
            ))
        })?;
        Ok(url.into())
    }

    /// Exchange an authorization code for an access token.
    #[instrument(skip(self, http, code))]
    pub async fn exchange_code(
        &self,
        http: &SandboxClient,
        code: &str,
        redirect_uri: &str,
        client_id: &str,
    ) -> Result<TokenResponse> {
        let resp = http
            .post(&self.token_endpoint)?
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", client_id),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(CardioRiskError::Authorization(format!(
                "token endpoint returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }
        TokenResponse::from_json(&body)
    }
}
