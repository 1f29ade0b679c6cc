use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::generate::{build_prompt, Generator, SYSTEM_PROMPT};
use crate::{Error, Result};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_DEFAULT_MODEL: &str = "llama3-8b-8192";

const MAX_TOKENS: u32 = 1000;

/// Generator backed by Groq's OpenAI-compatible chat completions API.
///
/// Requests are blocking and bounded by the configured timeout; a timeout
/// surfaces as [`Error::Generation`] and is never retried.
#[derive(Debug, Clone)]
pub struct GroqGenerator {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GroqGenerator {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, GROQ_DEFAULT_MODEL, GROQ_BASE_URL, Duration::from_secs(30))
    }

    /// Create a generator against any OpenAI-compatible endpoint.
    pub fn with_options(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("Groq API key cannot be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl Generator for GroqGenerator {
    fn generate(&mut self, context: &str, query: &str) -> Result<String> {
        let start_time = Instant::now();

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(context, query),
                },
            ],
            temperature: 0.0,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::Generation(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            error!(%status, "Groq API error: {body}");
            return Err(Error::Generation(format!("Groq API returned {status}: {body}")));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Generation(format!("malformed response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("empty response from Groq".to_string()))?;

        debug!(model = %self.model, elapsed = ?start_time.elapsed(), "generated response");
        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}
