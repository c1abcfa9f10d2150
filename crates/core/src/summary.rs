//! Summarization prompts for extracted content.
use crate::completion::{CompletionModel, CompletionResponse, GenerateSettings};
use crate::text::{CONTENT_LIMIT, truncate_chars};
use anyhow::{Context, Result};
use tracing::instrument;

/// Where the content being summarized came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Website,
    ImageText,
}

impl ContentKind {
    pub fn prompt(&self, content: &str) -> String {
        match self {
            ContentKind::Website => format!(
                "Please analyze and summarize the following website content \
                 in a clear and concise way:\n\n{content}"
            ),
            ContentKind::ImageText => format!(
                "Please analyze and summarize the following text extracted \
                 from an image:\n\n{content}"
            ),
        }
    }
}

/// Asks the model for a summary of at most `CONTENT_LIMIT` characters of `content`.
#[instrument(skip(model, content, settings), fields(model = %model.name()))]
pub async fn summarize(
    model: &dyn CompletionModel,
    kind: ContentKind,
    content: &str,
    settings: &GenerateSettings,
) -> Result<CompletionResponse> {
    let prompt = kind.prompt(truncate_chars(content, CONTENT_LIMIT));
    model
        .complete(&prompt, settings)
        .await
        .context("Failed to analyze content with the model")
}
