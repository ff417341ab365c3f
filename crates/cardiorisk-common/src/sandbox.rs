use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::CardioRiskError;

/// An HTTP client that only allows requests to approved hosts.
/// Access tokens are only ever attached to requests built through it,
/// so a misconfigured link cannot leak them to a foreign server.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a client whose allowlist holds the hosts of `urls`.
    pub fn for_urls<'a>(
        urls: impl IntoIterator<Item = &'a str>,
        timeout: Duration,
    ) -> Result<Self, CardioRiskError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| CardioRiskError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let mut sandbox = Self { client, allowlist: HashSet::new() };
        for url in urls {
            let host = Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .ok_or_else(|| CardioRiskError::Config(format!("Not an absolute URL: {}", url)))?;
            sandbox.allow_domain(&host);
        }
        Ok(sandbox)
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, CardioRiskError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, CardioRiskError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }

    fn check(&self, url: &str) -> Result<(), CardioRiskError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(CardioRiskError::Security(format!(
                "host not in allowlist for URL {}",
                url
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox() -> SandboxClient {
        SandboxClient::for_urls(
            ["https://launch.smarthealthit.org/v/r4/fhir"],
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[test]
    fn test_allows_configured_host_and_subdomains() {
        let s = sandbox();
        assert!(s.is_allowed("https://launch.smarthealthit.org/v/r4/fhir/Patient/1"));
        assert!(s.is_allowed("https://auth.launch.smarthealthit.org/token"));
    }

    #[test]
    fn test_rejects_foreign_host() {
        let s = sandbox();
        assert!(!s.is_allowed("https://evil.example.com/Patient/1"));
        assert!(!s.is_allowed("not a url"));
        assert!(matches!(
            s.get("https://evil.example.com/"),
            Err(CardioRiskError::Security(_))
        ));
    }

    #[test]
    fn test_relative_url_is_config_error() {
        let err = SandboxClient::for_urls(["/relative"], Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, CardioRiskError::Config(_)));
    }
}
