//! Hosted model client.
//!
//! Relays the session history plus the augmented user turn to the Gemini
//! `generateContent` REST endpoint and returns the reply text.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::LlmError;
use crate::session::{Role, Turn};

/// Anything that can turn a conversation into one reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, history: &[Turn], prompt: &str) -> Result<String, LlmError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Content {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

pub struct LLMWorker {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
    http_client: reqwest::Client,
}

impl LLMWorker {
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::ClientBuild)?;
        info!("LLM worker initialized with model {} at {}", model, base_url);
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            temperature: 0.7,
            max_output_tokens: 2048,
            http_client,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn to_contents(history: &[Turn], prompt: &str) -> Vec<Content> {
        history
            .iter()
            .map(|turn| (turn.role, turn.text.as_str()))
            .chain(std::iter::once((Role::User, prompt)))
            .map(|(role, text)| Content {
                role: Some(match role {
                    Role::User => "user".to_string(),
                    Role::Model => "model".to_string(),
                }),
                parts: vec![Part { text: Some(text.to_string()) }],
            })
            .collect()
    }
}

#[async_trait]
impl CompletionBackend for LLMWorker {
    async fn complete(&self, history: &[Turn], prompt: &str) -> Result<String, LlmError> {
        debug!("Sending {} turns to {}", history.len() + 1, self.model);
        let request = GenerateContentRequest {
            contents: Self::to_contents(history, prompt),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .http_client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let completion: GenerateContentResponse = response.json().await?;
        let text: String = completion
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
