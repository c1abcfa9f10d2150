use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    User,
    Assistant,
}

impl From<SenderType> for String {
    fn from(val: SenderType) -> Self {
        val.as_str().into()
    }
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match &self {
            SenderType::User => "user",
            SenderType::Assistant => "assistant",
        }
    }
}

/// A single chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: SenderType,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: SenderType, text: &str) -> Self {
        Self {
            text: text.to_string(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// Sampling settings sent with every generate request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateSettings {
    pub temperature: f32,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self { temperature: 0.7 }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionMetrics {
    pub prompt_tokens: u32,
    pub prompt_eval_latency_ms: f32,
    pub completion_tokens: u32,
    pub completion_latency_ms: f32,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub finish_reason: Option<String>,
    pub metrics: CompletionMetrics,
}

/// A text generation backend. One request, one complete response.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(
        &self,
        prompt: &str,
        settings: &GenerateSettings,
    ) -> Result<CompletionResponse>;
}
