use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ContentGenerator;
use crate::config::AppConfig;
use crate::error::GenerationError;

/// A simple (role, content) pair for building the messages array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Prompt plus sampling parameters for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub repetition_penalty: Option<f32>,
}

impl GenerationRequest {
    pub fn prompt(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            max_tokens,
            temperature,
            top_p: None,
            repetition_penalty: None,
        }
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn repetition_penalty(mut self, penalty: f32) -> Self {
        self.repetition_penalty = Some(penalty);
        self
    }
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repetition_penalty: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Hugging Face inference router (OpenAI-compatible chat completions).
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl LlmClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.huggingface_api_key.clone(),
            model: config.model_name.clone(),
            url: config.inference_url.clone(),
        }
    }

    fn body<'a>(&'a self, request: &'a GenerationRequest) -> CompletionBody<'a> {
        CompletionBody {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            repetition_penalty: request.repetition_penalty,
        }
    }
}

#[async_trait]
impl ContentGenerator for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.body(request))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let completion: CompletionResponse = resp.json().await?;
        if let Some(usage) = &completion.usage {
            tracing::debug!(
                "Completion used {} prompt / {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        completion_text(completion)
    }
}

fn completion_text(completion: CompletionResponse) -> Result<String, GenerationError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}
