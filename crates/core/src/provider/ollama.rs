use crate::completion::{
    CompletionMetrics, CompletionModel, CompletionResponse, GenerateSettings,
};
use crate::model::ModelConfig;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

#[derive(Debug, Clone, Deserialize)]
struct OllamaSettings {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default)]
    model: Option<String>,
}

fn default_host() -> String {
    DEFAULT_OLLAMA_HOST.to_string()
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    prompt_eval_duration: Option<u64>,
    #[serde(default)]
    eval_count: Option<u32>,
    #[serde(default)]
    eval_duration: Option<u64>,
}

impl GenerateResponse {
    fn metrics(&self) -> CompletionMetrics {
        // Durations are reported in nanoseconds
        let to_ms = |ns: Option<u64>| ns.map(|n| n as f32 / 1_000_000.0).unwrap_or(0.0);
        CompletionMetrics {
            prompt_tokens: self.prompt_eval_count.unwrap_or(0),
            prompt_eval_latency_ms: to_ms(self.prompt_eval_duration),
            completion_tokens: self.eval_count.unwrap_or(0),
            completion_latency_ms: to_ms(self.eval_duration),
        }
    }
}

/// Text generation through an Ollama server's `/api/generate` endpoint.
pub struct OllamaModel {
    model: String,
    host: String,
    client: Client,
}

impl OllamaModel {
    pub fn new(model_config: ModelConfig) -> Result<Self> {
        let settings: OllamaSettings = serde_yaml::from_value(
            serde_yaml::to_value(&model_config.settings)
                .map_err(|_e| anyhow!("Invalid settings structure"))?,
        )
        .context("Invalid ollama model settings")?;

        let model = settings
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| model_config.name.clone());
        if model.is_empty() {
            return Err(anyhow!("'model' setting is required for ollama model"));
        }

        Ok(Self {
            model,
            host: settings.host.trim_end_matches('/').to_string(),
            client: Client::new(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl CompletionModel for OllamaModel {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(
        &self,
        prompt: &str,
        settings: &GenerateSettings,
    ) -> Result<CompletionResponse> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            temperature: settings.temperature,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.host))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Ollama request failed with status {}: {}",
                status,
                text
            ));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse JSON response from Ollama")?;
        debug!(
            done_reason = ?body.done_reason,
            eval_count = ?body.eval_count,
            "Received completion"
        );

        let metrics = body.metrics();
        Ok(CompletionResponse {
            text: body.response,
            finish_reason: body.done_reason,
            metrics,
        })
    }
}
