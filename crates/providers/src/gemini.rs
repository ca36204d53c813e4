//! Google Gemini generator implementation.
//!
//! Talks to the `generateContent` REST endpoint directly.
//!
//! Features:
//! - API key passed as a query parameter (not a header)
//! - Per-request sampling knobs mapped to `generationConfig`
//! - Candidate text extraction with an explicit empty-response error

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use wayfinder_core::error::GeneratorError;
use wayfinder_core::generate::{GenerateRequest, Generator};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TOP_P: f32 = 0.9;
const DEFAULT_TOP_K: u32 = 40;

/// Gemini `generateContent` API generator.
pub struct GeminiGenerator {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiGenerator {
    /// Create a new Gemini generator for one model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Map a request to the Gemini wire format.
    fn request_body(request: &GenerateRequest) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "parts": [{ "text": request.prompt }]
            }],
            "generationConfig": {
                "temperature": request.temperature,
                "topP": DEFAULT_TOP_P,
                "topK": DEFAULT_TOP_K,
                "maxOutputTokens": request.max_tokens,
            }
        })
    }

    /// Pull the generated text out of the first candidate.
    fn text_from_response(response: GeminiResponse) -> Result<String, GeneratorError> {
        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, GeneratorError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = Self::request_body(&request);

        debug!(
            generator = "gemini",
            model = %self.model,
            prompt_chars = request.prompt.len(),
            "Sending generation request"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout(e.to_string())
                } else {
                    GeneratorError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GeneratorError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(GeneratorError::AuthenticationFailed(
                "Invalid Google AI API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(GeneratorError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: GeminiResponse = response.json().await.map_err(|e| {
            GeneratorError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Gemini response: {e}"),
            }
        })?;

        Self::text_from_response(api_resp)
    }
}

// --- Gemini API response types ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
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
    #[serde(default)]
    text: String,
}
