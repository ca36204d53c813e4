//! The text-generation seam.

use async_trait::async_trait;

use crate::error::GeneratorError;

/// One generation request: a fully rendered prompt plus sampling knobs.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Hard cap on generated tokens.
    pub max_tokens: u32,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: 0.7,
            max_tokens: 800,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Turns a prompt into generated text.
///
/// Implementations wrap one model endpoint; callers never care which.
/// Failures are expected and must be mapped to [`GeneratorError`], never
/// panicked on.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for logs (e.g. "gemini").
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerateRequest) -> Result<String, GeneratorError>;
}
