use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::http_client::openai_client;
use crate::config::Settings;
use crate::error::BackendError;

/// System message sent with every classification request
const SYSTEM_PROMPT: &str =
    "You are a librarian that classifies documents. Respond only with a valid JSON object.";

/// A language model that turns one prompt into one text reply.
///
/// Implementations make exactly one request per call: no retries, no caching.
pub trait ModelBackend {
    fn query(&self, prompt: &str) -> Result<String, BackendError>;
}

impl<B: ModelBackend + ?Sized> ModelBackend for Box<B> {
    fn query(&self, prompt: &str) -> Result<String, BackendError> {
        (**self).query(prompt)
    }
}

/// Message in the chat request
#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// API request body
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    messages: Vec<Message<'a>>,
}

/// API response body
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
    #[allow(dead_code)] // Required for JSON deserialization but value not used
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// API error response
#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI chat completions client
pub struct OpenAiClient {
    client: &'static Client,
    api_key: String,
    model: String,
    max_tokens: usize,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, model: &str, max_tokens: usize, base_url: &str) -> Self {
        Self {
            client: openai_client(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.api_key,
            &settings.llm_model_name,
            settings.max_num_tokens,
            &settings.api_base_url,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: prompt,
                },
            ],
        }
    }
}

impl ModelBackend for OpenAiClient {
    fn query(&self, prompt: &str) -> Result<String, BackendError> {
        tracing::debug!(
            "[OpenAI] Sending {} char prompt to model {}",
            prompt.len(),
            self.model
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(prompt))
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::warn!("[OpenAI] API error: {} - {}", status, message);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: message,
            });
        }

        parse_chat_response(&body)
    }
}

/// Pull the first choice's text out of a chat completion body
fn parse_chat_response(body: &str) -> Result<String, BackendError> {
    let api_response: ChatResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))?;

    let content = api_response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(BackendError::EmptyReply);
    }

    Ok(content)
}
