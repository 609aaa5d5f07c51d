//! Google Gemini implementation of [`TextGenerator`].

use crate::error::{GenieError, GenieResult};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::text_generator::{ChatSession, ChatTurn, GeneratorFactory, TextGenerator};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Where requests go and which model answers them.
#[derive(Debug, Clone)]
pub struct GeminiEndpoint {
    pub base_url: String,
    pub model: String,
}

impl GeminiEndpoint {
    /// Defaults, overridden by `GEMINI_BASE_URL` and `GENIE_MODEL`.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("GENIE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }

    fn generate_url(&self) -> String {
        let model_path = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!("{}/{}:generateContent", self.base_url.trim_end_matches('/'), model_path)
    }
}

impl Default for GeminiEndpoint {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: Option<String>,
    status: Option<String>,
}

fn error_message(body: &str, status: u16) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Option<GeminiError>,
    }

    match serde_json::from_str::<Envelope>(body).ok().and_then(|e| e.error) {
        Some(err) => {
            let message = err.message.unwrap_or_else(|| "unknown error".to_string());
            match err.status {
                Some(status) => format!("{} ({})", message, status),
                None => message,
            }
        }
        None => format!("Gemini API error (HTTP {})", status),
    }
}

fn contents_json(turns: &[ChatTurn]) -> Value {
    Value::Array(
        turns
            .iter()
            .map(|turn| json!({ "role": turn.role.as_str(), "parts": [{ "text": turn.text }] }))
            .collect(),
    )
}

/// Posts one `generateContent` request and extracts the candidate text.
async fn request_content(
    http: &dyn HttpClient,
    endpoint: &GeminiEndpoint,
    api_key: &str,
    turns: &[ChatTurn],
    generation_config: Option<&Value>,
) -> GenieResult<String> {
    let mut body = json!({ "contents": contents_json(turns) });
    if let Some(config) = generation_config {
        body["generationConfig"] = config.clone();
    }

    let url = endpoint.generate_url();
    debug!("POST {} ({} turns)", url, turns.len());

    let response = http
        .post_json(
            &url,
            &[("x-goog-api-key", api_key), ("content-type", "application/json")],
            &body,
        )
        .await
        .map_err(|e| GenieError::Remote(format!("Failed to reach Gemini: {}", e)))?;

    if !response.is_success() {
        warn!("Gemini returned HTTP {}", response.status);
        return Err(GenieError::Remote(error_message(&response.body, response.status)));
    }

    let parsed: GeminiResponse = serde_json::from_str(&response.body)
        .map_err(|e| GenieError::Remote(format!("Failed to parse Gemini response: {}", e)))?;

    if let Some(err) = parsed.error {
        return Err(GenieError::Remote(
            err.message.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    let text: String = parsed
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GenieError::Remote(
            "Gemini returned no text (the response may have been blocked)".to_string(),
        ));
    }
    Ok(text)
}

pub struct GeminiClient {
    http: Arc<dyn HttpClient>,
    endpoint: GeminiEndpoint,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: Arc<dyn HttpClient>, endpoint: GeminiEndpoint, api_key: &str) -> Self {
        Self {
            http,
            endpoint,
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> GenieResult<String> {
        request_content(
            self.http.as_ref(),
            &self.endpoint,
            &self.api_key,
            &[ChatTurn::user(prompt)],
            None,
        )
        .await
    }

    fn start_session(&self, history: Vec<ChatTurn>) -> Box<dyn ChatSession> {
        Box::new(GeminiSession {
            http: Arc::clone(&self.http),
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            history,
            generation_config: json!({ "maxOutputTokens": 1000, "temperature": 0.7 }),
        })
    }
}

/// Conversation that resends the whole history on every turn.
pub struct GeminiSession {
    http: Arc<dyn HttpClient>,
    endpoint: GeminiEndpoint,
    api_key: String,
    history: Vec<ChatTurn>,
    generation_config: Value,
}

#[async_trait]
impl ChatSession for GeminiSession {
    async fn send(&mut self, message: &str) -> GenieResult<String> {
        let mut turns = self.history.clone();
        turns.push(ChatTurn::user(message));

        let reply = request_content(
            self.http.as_ref(),
            &self.endpoint,
            &self.api_key,
            &turns,
            Some(&self.generation_config),
        )
        .await?;

        turns.push(ChatTurn::model(reply.clone()));
        self.history = turns;
        Ok(reply)
    }
}

pub struct GeminiFactory {
    http: Arc<dyn HttpClient>,
    endpoint: GeminiEndpoint,
}

impl GeminiFactory {
    pub fn new(http: Arc<dyn HttpClient>, endpoint: GeminiEndpoint) -> Self {
        Self { http, endpoint }
    }

    pub fn from_env() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()), GeminiEndpoint::from_env())
    }
}

impl GeneratorFactory for GeminiFactory {
    fn connect(&self, api_key: &str) -> Box<dyn TextGenerator> {
        info!("Using Gemini model {}", self.endpoint.model);
        Box::new(GeminiClient::new(Arc::clone(&self.http), self.endpoint.clone(), api_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpResponse;
    use std::sync::Mutex;

    /// Mock HTTP client that replays canned responses and records requests.
    struct MockHttpClient {
        responses: Mutex<Vec<HttpResponse>>,
        requests: Mutex<Vec<(String, Vec<(String, String)>, Value)>>,
    }

    impl MockHttpClient {
        fn new(responses: Vec<(u16, &str)>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .rev()
                        .map(|(status, body)| HttpResponse { status, body: body.to_string() })
                        .collect(),
                ),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn request_bodies(&self) -> Vec<Value> {
            self.requests.lock().unwrap().iter().map(|r| r.2.clone()).collect()
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            headers: &[(&str, &str)],
            body: &Value,
        ) -> anyhow::Result<HttpResponse> {
            self.requests.lock().unwrap().push((
                url.to_string(),
                headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                body.clone(),
            ));
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| anyhow::anyhow!("no more responses"))
        }
    }

    fn text_response(text: &str) -> String {
        json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
            .to_string()
    }

    fn client(http: &Arc<MockHttpClient>) -> GeminiClient {
        let http: Arc<dyn HttpClient> = http.clone();
        GeminiClient::new(http, GeminiEndpoint::default(), "AIzaTestKey")
    }

    #[test]
    fn test_generate_url_adds_models_prefix() {
        let endpoint = GeminiEndpoint {
            base_url: "https://example.test/v1beta/".to_string(),
            model: "gemini-1.5-flash".to_string(),
        };
        assert_eq!(
            endpoint.generate_url(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text_and_sends_key_header() {
        let body = text_response("A short summary.");
        let http = MockHttpClient::new(vec![(200, body.as_str())]);

        let text = client(&http).generate("Summarize").await.unwrap();
        assert_eq!(text, "A short summary.");

        let requests = http.requests.lock().unwrap();
        let (url, headers, body) = &requests[0];
        assert!(url.ends_with("models/gemini-1.5-flash:generateContent"));
        assert!(headers.contains(&("x-goog-api-key".to_string(), "AIzaTestKey".to_string())));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Summarize");
        assert!(body.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn test_http_error_surfaces_service_message() {
        let error_body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let http = MockHttpClient::new(vec![(400, error_body)]);

        let err = client(&http).generate("hi").await.unwrap_err();
        assert!(matches!(err, GenieError::Remote(_)));
        assert_eq!(err.to_string(), "API key not valid. (INVALID_ARGUMENT)");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_remote_error() {
        let http = MockHttpClient::new(vec![(200, r#"{"candidates":[]}"#)]);
        let err = client(&http).generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("no text"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_remote_error() {
        let http = MockHttpClient::new(vec![]);
        let err = client(&http).generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("Failed to reach Gemini"));
    }

    #[tokio::test]
    async fn test_session_resends_history_with_generation_config() {
        let first = text_response("Hello there!");
        let second = text_response("Rust is great.");
        let http = MockHttpClient::new(vec![(200, first.as_str()), (200, second.as_str())]);

        let mut session = client(&http).start_session(Vec::new());
        assert_eq!(session.send("hi").await.unwrap(), "Hello there!");
        assert_eq!(session.send("tell me about rust").await.unwrap(), "Rust is great.");

        let bodies = http.request_bodies();
        let contents = bodies[1]["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "Hello there!");
        assert_eq!(bodies[1]["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[tokio::test]
    async fn test_failed_turn_is_not_added_to_history() {
        let reply = text_response("ok");
        let http = MockHttpClient::new(vec![(500, "{}"), (200, reply.as_str())]);

        let mut session = client(&http).start_session(Vec::new());
        assert!(session.send("first").await.is_err());
        session.send("second").await.unwrap();

        let bodies = http.request_bodies();
        assert_eq!(bodies[1]["contents"].as_array().unwrap().len(), 1);
    }
}
