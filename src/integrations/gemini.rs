//! Google Gemini API Client.
//!
//! Supports:
//! - Chat completions with conversation history and a system instruction
//! - Text embeddings (single and batched)
//!
//! The base URL is overridable so tests can point the client at a mock
//! server. The API key comes from configuration, never from source.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;
use crate::error::{Error, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Request timeout for both chat and embedding calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini batchEmbedContents accepts up to 100 items; stay well below.
const EMBED_BATCH_SIZE: usize = 48;

/// Per-input character cap for embedding requests. Longer inputs are
/// truncated with a warning before they are sent.
const EMBED_MAX_CHARS: usize = 10_000;

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Wire name used by the Gemini contents array.
    fn gemini_role(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "model",
        }
    }
}

/// One turn of a conversation, also used as the transcript element.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Google Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    embed_model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a client from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?;
        let mut client = Self::new(api_key, &config.chat_model, &config.embed_model)?;
        client.temperature = config.temperature;
        client.max_output_tokens = config.max_output_tokens;
        if let Some(url) = &config.base_url {
            client.base_url = url.trim_end_matches('/').to_string();
        }
        Ok(client)
    }

    /// Create a client with an API key and model names.
    pub fn new<S: Into<String>>(api_key: S, chat_model: &str, embed_model: &str) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("Gemini API key is empty".to_string()));
        }

        let http = Client::builder()
            .user_agent("pantai_chat/0.1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: GEMINI_API_URL.to_string(),
            chat_model: chat_model.to_string(),
            embed_model: embed_model.to_string(),
            temperature: 0.2,
            max_output_tokens: 4096,
        })
    }

    /// Override the API base URL (tests, proxies).
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Chat completion over a whole conversation.
    ///
    /// Turns are sent in order; the last one is expected to be the user's
    /// current message. Failures map to `Error::Model`.
    pub async fn generate(&self, system: Option<&str>, turns: &[ChatMessage]) -> Result<String> {
        let payload = GenerateRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: turn.role.gemini_role().to_string(),
                    parts: vec![Part {
                        text: turn.content.clone(),
                    }],
                })
                .collect(),
            generation_config: Some(GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            }),
            system_instruction: system.map(|text| SystemInstruction {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }),
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.chat_model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Model(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Model(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Model(format!("Gemini error {}: {}", status, text)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Model(format!("Invalid Gemini response: {}", e)))?;

        parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Model("Empty response from Gemini".to_string()))
    }

    /// Embed a single text. Failures map to `Error::Query`.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(std::slice::from_ref(&text.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Query("Embedding response was empty".to_string()))
    }

    /// Embed many texts, batching requests to stay under API limits.
    /// Inputs longer than [`EMBED_MAX_CHARS`] characters are truncated.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/models/{}:batchEmbedContents?key={}",
            self.base_url, self.embed_model, self.api_key
        );

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let overlong = batch
                .iter()
                .filter(|t| t.chars().count() > EMBED_MAX_CHARS)
                .count();
            if overlong > 0 {
                warn!(
                    "Truncating {} embedding input(s) to {} chars",
                    overlong, EMBED_MAX_CHARS
                );
            }

            let payload = BatchEmbedRequest {
                requests: batch
                    .iter()
                    .map(|text| EmbedRequest {
                        model: format!("models/{}", self.embed_model),
                        content: EmbedContent {
                            parts: vec![Part {
                                text: truncate_chars(text, EMBED_MAX_CHARS),
                            }],
                        },
                    })
                    .collect(),
            };

            let response = self
                .http
                .post(&url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| Error::Query(format!("Embedding request failed: {}", e)))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| Error::Query(format!("Failed to read response: {}", e)))?;

            if !status.is_success() {
                return Err(Error::Query(format!("Embedding error {}: {}", status, text)));
            }

            let parsed: BatchEmbedResponse = serde_json::from_str(&text)
                .map_err(|e| Error::Query(format!("Invalid embedding response: {}", e)))?;

            if parsed.embeddings.len() != batch.len() {
                return Err(Error::Query(format!(
                    "Embedding count mismatch: sent {}, received {}",
                    batch.len(),
                    parsed.embeddings.len()
                )));
            }

            for embedding in parsed.embeddings {
                if embedding.values.is_empty() {
                    return Err(Error::Query("Embedding response was empty".to_string()));
                }
                vectors.push(embedding.values);
            }
        }

        Ok(vectors)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// === Request/response structures ===

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "systemInstruction")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Embedding>,
}

#[derive(Debug, Deserialize)]
struct Embedding {
    #[serde(default)]
    values: Vec<f32>,
}
