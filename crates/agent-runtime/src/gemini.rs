//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` for the Google Generative Language API.
//! The API key is sent only to the configured Google endpoint, in the
//! `x-goog-api-key` header.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo,
        TokenUsage,
    },
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Official Generative Language API endpoint
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key for the model service
    pub api_key: String,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.into(),
            timeout_secs: 120,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Gemini LLM provider
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create from configuration
    pub fn from_config(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Convert agent messages to Gemini contents.
    ///
    /// System messages become the system instruction. Tool observations are
    /// sent as user context. Consecutive messages with the same role are
    /// merged into one content with several parts.
    fn convert_messages(messages: &[Message]) -> (Option<GeminiSystemInstruction>, Vec<GeminiContent>) {
        let mut system_parts = Vec::new();
        let mut contents: Vec<GeminiContent> = Vec::new();

        for msg in messages {
            let role = match msg.role {
                Role::System => {
                    system_parts.push(GeminiPart { text: msg.content.clone() });
                    continue;
                }
                Role::User | Role::Tool => "user",
                Role::Assistant => "model",
            };

            let part = GeminiPart { text: msg.content.clone() };
            match contents.last_mut() {
                Some(last) if last.role == role => last.parts.push(part),
                _ => contents.push(GeminiContent {
                    role: role.to_string(),
                    parts: vec![part],
                }),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(GeminiSystemInstruction { parts: system_parts })
        };

        (system, contents)
    }

    fn build_request(messages: &[Message], options: &GenerationOptions) -> GeminiRequest {
        let (system_instruction, contents) = Self::convert_messages(messages);

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: GeminiGenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
                max_output_tokens: options.max_tokens,
                stop_sequences: options.stop_sequences.clone(),
            },
        }
    }

    /// Convert Gemini response to agent completion
    fn convert_completion(response: GeminiResponse, model: &str) -> Result<Completion> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".into());
            return Err(AgentError::Provider(format!("Gemini returned no answer: {}", reason)));
        };

        let content = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join(""))
            .unwrap_or_default();

        let finish_reason = candidate.finish_reason.as_deref().map(map_finish_reason);

        Ok(Completion {
            content,
            model: model.to_string(),
            usage: response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
            truncated: finish_reason == Some(FinishReason::Length),
            finish_reason,
        })
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url.trim_end_matches('/'))
    }
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::ContentFilter,
        _ => FinishReason::Error,
    }
}

/// Map a non-success HTTP status to the agent error taxonomy
fn map_status(status: StatusCode, body: &str) -> AgentError {
    let detail = format!("Gemini API error ({}): {}", status, body);
    match status {
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
        s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
        _ => AgentError::Provider(detail),
    }
}

fn map_transport(err: &reqwest::Error) -> AgentError {
    if err.is_timeout() || err.is_connect() {
        AgentError::ProviderUnavailable(err.to_string())
    } else {
        AgentError::Provider(err.to_string())
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        let models = self.list_models().await.unwrap_or_default();

        Ok(ProviderInfo {
            name: "Gemini".into(),
            models,
            supports_tools: false, // tool requests travel as fenced text blocks
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = Self::build_request(messages, options);
        let url = format!("{}/{}:generateContent", self.models_url(), options.model);

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }

        let body = response.text().await.map_err(|e| map_transport(&e))?;
        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| AgentError::Parse(format!("Gemini response: {}", e)))?;

        Self::convert_completion(parsed, &options.model)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self.client
            .get(self.models_url())
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body));
        }

        let list: GeminiModelList = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;

        Ok(list
            .models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.trim_start_matches("models/").to_string(),
                name: m.display_name.unwrap_or(m.name),
                context_length: m.input_token_limit,
            })
            .collect())
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    display_name: Option<String>,
    input_token_limit: Option<u32>,
}
