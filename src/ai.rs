use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::env;
use std::time::Duration;
use tracing::{error, info};

use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const MAX_COMPLETION_TOKENS: usize = 1024;
const REQUEST_TIMEOUT_SECS: u64 = 90;

/// Chat-completion seam used by match generation and email drafting.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Completion expected to contain a single JSON object.
    async fn complete_json(&self, prompt: &str) -> Result<String, AppError>;
    /// Free-form text completion.
    async fn complete_text(&self, prompt: &str) -> Result<String, AppError>;
}

/// Chat completions request structure
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Chat message structure
#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// Chat completions response structure
#[derive(Deserialize, Debug)]
struct ChatApiResponse {
    choices: Vec<ChatApiChoice>,
}

/// Choice within the chat completions response
#[derive(Deserialize, Debug)]
struct ChatApiChoice {
    message: ChatApiMessage,
}

/// Message content within the response choice
#[derive(Deserialize, Debug)]
struct ChatApiMessage {
    content: String,
}

/// Function to get the completion API key from environment
fn get_api_key() -> Result<String, AppError> {
    // Try to get API key from environment variable
    match env::var("OPENAI_API_KEY") {
        Ok(key) => Ok(key),
        Err(_) => {
            // Try to load from .env file if not found in environment
            if dotenvy::dotenv().is_ok() {
                match env::var("OPENAI_API_KEY") {
                    Ok(key) => Ok(key),
                    Err(_) => Err(AppError::CompletionError(
                        "OPENAI_API_KEY not found in environment or .env file".to_string(),
                    )),
                }
            } else {
                Err(AppError::CompletionError(
                    "OPENAI_API_KEY not found in environment and failed to load .env file"
                        .to_string(),
                ))
            }
        }
    }
}

/// Client for any OpenAI-compatible chat completions endpoint.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Reads OPENAI_BASE_URL and OPENAI_MODEL; the API key is looked up
    /// per call so the server can boot without one.
    pub fn from_env() -> Result<Self, AppError> {
        let base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            model,
        })
    }

    async fn call_completions_api(
        &self,
        prompt: &str,
        json_object: bool,
    ) -> Result<String, AppError> {
        let api_key = get_api_key()?;

        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
            response_format: json_object.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!("Network error calling completions API: {}", e);
                AppError::CompletionError(format!("Failed to call completions API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!("Completions API Error - Status: {}, Body: {}", status, error_text);
            return Err(AppError::CompletionError(format!(
                "Completions API returned error status: {}",
                status
            )));
        }

        let api_response = response.json::<ChatApiResponse>().await.map_err(|e| {
            error!("Failed to parse completions API JSON response: {}", e);
            AppError::CompletionError(format!("Failed to parse completions API response: {}", e))
        })?;

        // Extract the content from the first choice's message
        if let Some(choice) = api_response.choices.first() {
            info!(
                "Received completion from model. Content length: {}",
                choice.message.content.len()
            );
            Ok(choice.message.content.clone())
        } else {
            error!("Completions API returned no choices in the response.");
            Err(AppError::CompletionError(
                "Completions API returned no choices".to_string(),
            ))
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete_json(&self, prompt: &str) -> Result<String, AppError> {
        self.call_completions_api(prompt, true).await
    }

    async fn complete_text(&self, prompt: &str) -> Result<String, AppError> {
        self.call_completions_api(prompt, false).await
    }
}

/// Pull a JSON object out of a model reply, tolerating Markdown fences and
/// surrounding prose. Returns an empty object when nothing parses.
pub fn extract_json_object(response: &str) -> Value {
    // Remove Markdown code block if present
    let trimmed = response.trim();
    let json_str = if trimmed.starts_with("```json") {
        trimmed
            .trim_start_matches("```json")
            .trim()
            .trim_end_matches("```")
            .trim()
    } else if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```")
            .trim()
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    };

    if let Ok(value) = serde_json::from_str::<Value>(json_str) {
        if value.is_object() {
            return value;
        }
    }

    // Fallback: try to extract the first {...} block
    if let (Some(start), Some(end)) = (json_str.find('{'), json_str.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&json_str[start..=end]) {
                if value.is_object() {
                    return value;
                }
            }
        }
    }

    error!(
        "Failed to parse model reply as JSON object: starts_with={:?}",
        json_str.chars().take(20).collect::<String>()
    );
    Value::Object(Map::new())
}
