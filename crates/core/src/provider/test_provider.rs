//! A mock LLM provider for unit testing purposes.
use crate::completion::{
    CompletionMetrics, CompletionModel, CompletionResponse, GenerateSettings,
};
use crate::model::ModelConfig;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Mutex;

/// A mock `CompletionModel` for use in unit tests.
///
/// The `response_mode` setting controls what it generates:
/// - `""` (default): echoes the prompt back as `echo: <prompt>`.
/// - `"error"`: fails every request.
///
/// Every prompt received is recorded and available through `prompts()`.
#[derive(Debug)]
pub struct TestProviderModel {
    config: ModelConfig,
    prompts: Mutex<Vec<String>>,
}

impl TestProviderModel {
    pub fn new(config: ModelConfig) -> Result<Self> {
        Ok(Self {
            config,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn with_mode(mode: &str) -> Self {
        let mut config = ModelConfig {
            name: "test-model".to_string(),
            provider: crate::model::ModelProvider::Test,
            settings: Default::default(),
        };
        config.set_setting("response_mode", mode);
        Self {
            config,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionModel for TestProviderModel {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn complete(
        &self,
        prompt: &str,
        _settings: &GenerateSettings,
    ) -> Result<CompletionResponse> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let response_mode: String = self.config.get_setting("response_mode").unwrap_or_default();
        match response_mode.as_str() {
            "error" => Err(anyhow!("TestProviderModel error")),
            _ => Ok(CompletionResponse {
                text: format!("echo: {prompt}"),
                finish_reason: Some("stop".to_string()),
                metrics: CompletionMetrics::default(),
            }),
        }
    }
}
