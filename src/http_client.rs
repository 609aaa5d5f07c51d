//! HTTP client abstraction for the Gemini REST API.
//!
//! The generator only needs one verb, so the seam is a single JSON POST that
//! hands back the status code and body for the caller to interpret.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Status and raw body of an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP seam; tests replace it with a canned-response mock.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot be
    /// read. Non-2xx statuses are not errors at this level.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse>;
}

const USER_AGENT: &str = concat!("genie-cli/", env!("CARGO_PKG_VERSION"));

/// Production client backed by a shared `reqwest` connection pool.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                debug!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        let request = headers
            .iter()
            .fold(self.client.post(url), |request, (name, value)| {
                request.header(*name, *value)
            });

        let response = request.json(body).send().await?;
        let status = response.status().as_u16();
        debug!("HTTP {} from {}", status, response.url().path());

        Ok(HttpResponse {
            status,
            body: response.text().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("genie-cli/"));
    }

    #[test]
    fn test_success_range() {
        let ok = HttpResponse { status: 200, body: String::new() };
        let created = HttpResponse { status: 201, body: String::new() };
        let forbidden = HttpResponse { status: 403, body: String::new() };
        assert!(ok.is_success());
        assert!(created.is_success());
        assert!(!forbidden.is_success());
    }
}
