//! Google Gemini provider implementation.
//!
//! Uses the Generative Language REST API directly:
//! - `models/{model}:countTokens` for the token oracle's `count`
//! - `models/{model}:generateContent` for `generate`
//! - `models` listing for health checks
//!
//! Authentication is the `x-goog-api-key` header. The whole prompt is sent
//! as a single user-role content part; transcript structure lives in the
//! rendered text itself.

use async_trait::async_trait;
use docchat_core::error::OracleError;
use docchat_core::oracle::TokenOracle;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Finish reasons that mean the response was withheld by a safety filter.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
    "RECITATION",
];

/// Gemini `countTokens` / `generateContent` client.
pub struct GeminiOracle {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiOracle {
    /// Create a new Gemini oracle with the default model and a 120s timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            client: build_client(Duration::from_secs(120)),
        }
    }

    /// Use a specific model. A leading `models/` is accepted and stripped.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = model.trim_start_matches("models/").to_string();
        self
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn model_url(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    fn request_body(text: &str) -> GenerateRequest<'_> {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text }],
            }],
        }
    }

    async fn post(&self, url: &str, text: &str) -> Result<reqwest::Response, OracleError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&Self::request_body(text))
            .send()
            .await
            .map_err(map_transport_error)?;

        check_status(response).await
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(
                error = %e,
                timeout_secs = timeout.as_secs(),
                "HTTP client build failed, using default client without timeout"
            );
            reqwest::Client::default()
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> OracleError {
    if e.is_timeout() {
        OracleError::Timeout(e.to_string())
    } else {
        OracleError::Network(e.to_string())
    }
}

/// Map non-success HTTP statuses onto the oracle error taxonomy.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, OracleError> {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(OracleError::RateLimited { retry_after_secs });
    }

    if status == 401 || status == 403 {
        return Err(OracleError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ));
    }

    if !(200..300).contains(&status) {
        let error_body = response.text().await.unwrap_or_default();
        warn!(status, body = %error_body, "Gemini returned error");
        let message = serde_json::from_str::<ApiErrorEnvelope>(&error_body)
            .map(|e| e.error.message)
            .unwrap_or(error_body);
        return Err(OracleError::ApiError {
            status_code: status,
            message,
        });
    }

    Ok(response)
}

#[async_trait]
impl TokenOracle for GeminiOracle {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn count(&self, text: &str) -> Result<usize, OracleError> {
        debug!(model = %self.model, bytes = text.len(), "Counting tokens");

        let response = self.post(&self.model_url("countTokens"), text).await?;
        let body: CountTokensResponse =
            response.json().await.map_err(|e| OracleError::ApiError {
                status_code: 200,
                message: format!("Failed to parse countTokens response: {e}"),
            })?;

        Ok(body.total_tokens)
    }

    async fn generate(&self, text: &str) -> Result<String, OracleError> {
        debug!(model = %self.model, bytes = text.len(), "Sending generateContent request");

        let response = self.post(&self.model_url("generateContent"), text).await?;
        let body: GenerateResponse =
            response.json().await.map_err(|e| OracleError::ApiError {
                status_code: 200,
                message: format!("Failed to parse generateContent response: {e}"),
            })?;

        if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(OracleError::ContentPolicyRejected(format!(
                "prompt blocked: {reason}"
            )));
        }

        let candidate = body.candidates.into_iter().next().ok_or_else(|| {
            OracleError::ContentPolicyRejected("response blocked or empty".into())
        })?;

        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|r| BLOCKED_FINISH_REASONS.contains(r))
        {
            return Err(OracleError::ContentPolicyRejected(format!(
                "response withheld: {reason}"
            )));
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(OracleError::ContentPolicyRejected(
                "response blocked or empty".into(),
            ));
        }

        Ok(text)
    }

    async fn health_check(&self) -> Result<bool, OracleError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(map_transport_error)?;

        Ok(response.status().is_success())
    }
}

// ── Gemini API wire types ─────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountTokensResponse {
    total_tokens: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn oracle_for(server: &MockServer) -> GeminiOracle {
        GeminiOracle::new("test-key")
            .with_model("models/gemini-test")
            .with_base_url(server.uri())
    }

    #[test]
    fn model_prefix_is_stripped() {
        let oracle = GeminiOracle::new("k").with_model("models/gemini-2.5-pro");
        assert_eq!(oracle.model(), "gemini-2.5-pro");
        assert!(
            oracle
                .model_url("countTokens")
                .ends_with("/models/gemini-2.5-pro:countTokens")
        );
    }

    #[tokio::test]
    async fn count_reads_total_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:countTokens"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "hello there" }] }]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "totalTokens": 42 })),
            )
            .mount(&server)
            .await;

        let tokens = oracle_for(&server).count("hello there").await.unwrap();
        assert_eq!(tokens, 42);
    }

    #[tokio::test]
    async fn generate_joins_candidate_parts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "Chapter 3 " }, { "text": "covers pricing." }]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let reply = oracle_for(&server).generate("What is in chapter 3?").await.unwrap();
        assert_eq!(reply, "Chapter 3 covers pricing.");
    }

    #[tokio::test]
    async fn blocked_prompt_is_policy_rejection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = oracle_for(&server).generate("anything").await.unwrap_err();
        assert!(matches!(err, OracleError::ContentPolicyRejected(_)));
        assert!(!err.is_unavailable());
    }

    #[tokio::test]
    async fn safety_finish_reason_is_policy_rejection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let err = oracle_for(&server).generate("anything").await.unwrap_err();
        assert!(matches!(err, OracleError::ContentPolicyRejected(_)));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:countTokens"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = oracle_for(&server).count("hi").await.unwrap_err();
        assert!(matches!(err, OracleError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:countTokens"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
            .mount(&server)
            .await;

        let err = oracle_for(&server).count("hi").await.unwrap_err();
        match err {
            OracleError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 30),
            other => panic!("Expected RateLimited, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_carries_api_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:countTokens"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 400, "message": "model not found", "status": "INVALID_ARGUMENT" }
            })))
            .mount(&server)
            .await;

        let err = oracle_for(&server).count("hi").await.unwrap_err();
        match err {
            OracleError::ApiError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 400);
                assert_eq!(message, "model not found");
            }
            other => panic!("Expected ApiError, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let oracle = GeminiOracle::new("k").with_base_url("http://127.0.0.1:1");
        let err = oracle.count("hi").await.unwrap_err();
        assert!(matches!(err, OracleError::Network(_) | OracleError::Timeout(_)));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn configured_timeout_applies_to_requests() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:countTokens"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "totalTokens": 1 }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let oracle = oracle_for(&server).with_timeout(Duration::from_millis(200));
        let err = oracle.count("hi").await.unwrap_err();

        assert!(matches!(err, OracleError::Timeout(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn health_check_lists_models() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{ "name": "models/gemini-test" }]
            })))
            .mount(&server)
            .await;

        assert!(oracle_for(&server).health_check().await.unwrap());
    }
}
