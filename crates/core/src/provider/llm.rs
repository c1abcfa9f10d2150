use crate::completion::CompletionModel;
use crate::model::ModelProvider;
use crate::provider::ollama;
use anyhow::Result;
use tracing::instrument;

#[instrument(skip(model_config))]
pub fn get_completion_llm(
    model_config: crate::model::ModelConfig,
) -> Result<Box<dyn CompletionModel + Send + Sync>> {
    match model_config.provider {
        ModelProvider::Ollama => {
            let model = ollama::OllamaModel::new(model_config)?;
            Ok(Box::new(model))
        }
        #[cfg(test)]
        ModelProvider::Test => {
            let model = crate::provider::test_provider::TestProviderModel::new(model_config)?;
            Ok(Box::new(model))
        }
    }
}
