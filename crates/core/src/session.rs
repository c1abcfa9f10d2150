//! A session is the shared context between a human and the AI assistant for
//! the lifetime of one chat. Only the transcript is kept; nothing is persisted.
use crate::{
    completion::{ChatMessage, CompletionModel, CompletionResponse, GenerateSettings, SenderType},
    model::ModelConfig,
};
use anyhow::{Context, Result, anyhow};
use std::ops::RangeInclusive;
use tracing::{debug, instrument};

/// Temperatures accepted by the chat session.
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.1..=2.0;

fn check_temperature(temperature: f32) -> Result<()> {
    if !TEMPERATURE_RANGE.contains(&temperature) {
        return Err(anyhow!(
            "Temperature must be between {} and {}, got {temperature}",
            TEMPERATURE_RANGE.start(),
            TEMPERATURE_RANGE.end()
        ));
    }
    Ok(())
}

/// Ordered list of chat turns.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: SenderType, text: &str) {
        self.messages.push(ChatMessage::new(sender, text));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn last_assistant_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == SenderType::Assistant)
    }
}

/// A chat with a single model.
pub struct ChatSession {
    model: Box<dyn CompletionModel + Send + Sync>,
    transcript: Transcript,
    settings: GenerateSettings,
}

impl ChatSession {
    /// Create a new session with the given model configuration
    pub fn new(model_config: ModelConfig, settings: GenerateSettings) -> Result<Self> {
        check_temperature(settings.temperature)?;
        let model = crate::get_completion_llm(model_config)
            .context("Failed to initialize session model")?;
        Self::with_model(model, settings)
    }

    pub fn with_model(
        model: Box<dyn CompletionModel + Send + Sync>,
        settings: GenerateSettings,
    ) -> Result<Self> {
        check_temperature(settings.temperature)?;
        Ok(Self {
            model,
            transcript: Transcript::new(),
            settings,
        })
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn settings(&self) -> &GenerateSettings {
        &self.settings
    }

    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        check_temperature(temperature)?;
        self.settings.temperature = temperature;
        Ok(())
    }

    /// Sends one user prompt and records the exchange.
    ///
    /// Both turns are appended only after the model answered, so a failed
    /// request leaves the transcript as it was.
    #[instrument(skip(self, prompt), fields(model = %self.model.name()))]
    pub async fn send(&mut self, prompt: &str) -> Result<CompletionResponse> {
        if prompt.trim().is_empty() {
            return Err(anyhow!("Prompt is empty"));
        }

        let response = self.model.complete(prompt, &self.settings).await?;

        self.transcript.push(SenderType::User, prompt);
        self.transcript.push(SenderType::Assistant, &response.text);
        debug!(turns = self.transcript.len(), "Chat round trip complete");
        Ok(response)
    }

    /// Clear the conversation history
    pub fn clear(&mut self) {
        self.transcript.clear();
    }
}
