use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

pub mod providers;
use providers::imgflip::ImgflipProvider;

/// A captionable meme image offered by a provider.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct MemeTemplate {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub box_count: u32,
}

/// Account used to caption images.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// One caption request: a template and the top and bottom text.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionRequest {
    pub template_id: String,
    pub text0: String,
    pub text1: String,
    pub credentials: Credentials,
}

impl CaptionRequest {
    pub fn validate(&self) -> Result<(), MemeError> {
        if !self.credentials.is_complete() {
            return Err(MemeError::MissingCredentials);
        }
        if self.template_id.is_empty() {
            return Err(MemeError::InvalidRequest("template id is empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum MemeError {
    #[error("Please set your Imgflip credentials in environment variables!")]
    MissingCredentials,
    #[error("Invalid caption request: {0}")]
    InvalidRequest(String),
    #[error("API Error: {0}")]
    Api(String),
}

/// A trait for meme generation services.
#[async_trait]
pub trait MemeProvider: Send + Sync {
    /// Lists the templates that can be captioned.
    async fn templates(&self) -> Result<Vec<MemeTemplate>>;

    /// Captions a template and returns the URL of the generated image.
    async fn caption(&self, request: &CaptionRequest) -> Result<String>;
}

/// Configuration for the meme tool.
#[derive(Deserialize, Debug)]
pub struct MemeToolConfig {
    #[serde(default = "default_provider")]
    provider: String,
    #[serde(flatten)]
    credentials: Credentials,
    #[serde(flatten)]
    provider_config: serde_yaml::Value,
}

fn default_provider() -> String {
    "imgflip".to_string()
}

/// A tool for listing templates and generating memes.
pub struct MemeTool {
    provider: Arc<dyn MemeProvider>,
    credentials: Credentials,
}

impl MemeTool {
    /// Creates a new MemeTool from a configuration value.
    pub fn from_config(config_value: &serde_yaml::Value) -> Result<Self> {
        let config_value = if config_value.is_null() {
            serde_yaml::Value::Mapping(Default::default())
        } else {
            config_value.clone()
        };
        let config: MemeToolConfig =
            serde_yaml::from_value(config_value).context("Failed to parse meme tool config")?;
        let provider: Arc<dyn MemeProvider> = match config.provider.as_str() {
            "imgflip" => Arc::new(
                ImgflipProvider::from_config(&config.provider_config)
                    .context("Failed to configure imgflip provider")?,
            ),
            _ => return Err(anyhow!("Unsupported meme provider: {}", config.provider)),
        };

        Ok(Self {
            provider,
            credentials: config.credentials,
        })
    }

    pub fn with_provider(provider: Arc<dyn MemeProvider>, credentials: Credentials) -> Self {
        Self {
            provider,
            credentials,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_complete()
    }

    pub async fn templates(&self) -> Result<Vec<MemeTemplate>> {
        self.provider
            .templates()
            .await
            .context("Error fetching meme templates")
    }

    /// Captions `template` with the configured account.
    #[instrument(skip(self, template), fields(template = %template.id))]
    pub async fn generate(
        &self,
        template: &MemeTemplate,
        top_text: &str,
        bottom_text: &str,
    ) -> Result<String> {
        let request = CaptionRequest {
            template_id: template.id.clone(),
            text0: top_text.to_string(),
            text1: bottom_text.to_string(),
            credentials: self.credentials.clone(),
        };
        request.validate()?;
        self.provider
            .caption(&request)
            .await
            .context("Error generating meme")
    }
}

/// The template list currently on display.
///
/// A refresh only replaces the list when the provider returned templates.
#[derive(Debug, Default, Clone)]
pub struct TemplateCatalog {
    templates: Vec<MemeTemplate>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn templates(&self) -> &[MemeTemplate] {
        &self.templates
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn find(&self, key: &str) -> Option<&MemeTemplate> {
        find_template(&self.templates, key)
    }

    /// Fetches templates from `tool`, returning how many are now listed.
    pub async fn refresh(&mut self, tool: &MemeTool) -> Result<usize> {
        let templates = tool.templates().await?;
        if templates.is_empty() {
            return Err(anyhow!(
                "Unable to fetch meme templates. Please try again later."
            ));
        }
        self.templates = templates;
        Ok(self.templates.len())
    }
}

/// Looks a template up by id, then by case-insensitive name.
pub fn find_template<'a>(templates: &'a [MemeTemplate], key: &str) -> Option<&'a MemeTemplate> {
    let key = key.trim();
    templates.iter().find(|t| t.id == key).or_else(|| {
        let key = key.to_lowercase();
        templates.iter().find(|t| t.name.to_lowercase() == key)
    })
}

/// Downloads a generated meme and stores it as a PNG file.
#[instrument(skip(client))]
pub async fn download_meme(client: &Client, url: &str, path: &Path) -> Result<()> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download meme from {url}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Meme download failed with status {status}"));
    }
    let bytes = response.bytes().await.context("Failed to read meme image")?;
    let image = image::load_from_memory(&bytes).context("Downloaded meme is not an image")?;

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("Failed to encode meme as PNG")?;
    tokio::fs::write(path, &png)
        .await
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    debug!(bytes = png.len(), "Saved meme");
    Ok(())
}
