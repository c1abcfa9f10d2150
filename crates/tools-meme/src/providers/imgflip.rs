use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{instrument, warn};
use url::Url;

use crate::{CaptionRequest, MemeError, MemeProvider, MemeTemplate};

pub const DEFAULT_BASE_URL: &str = "https://api.imgflip.com";

// Structs for deserializing responses from the Imgflip API
#[derive(Deserialize, Debug)]
struct MemesData {
    memes: Vec<MemeTemplate>,
}

#[derive(Deserialize, Debug)]
struct GetMemesResponse {
    data: MemesData,
}

#[derive(Deserialize, Debug)]
struct CaptionData {
    url: String,
}

#[derive(Deserialize, Debug)]
struct CaptionResponse {
    success: bool,
    #[serde(default)]
    data: Option<CaptionData>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ImgflipConfig {
    #[serde(default = "default_base_url")]
    base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// A meme provider backed by the Imgflip API.
#[derive(Debug)]
pub struct ImgflipProvider {
    base_url: Url,
    client: Client,
}

impl ImgflipProvider {
    /// Creates a new ImgflipProvider from a configuration value.
    pub fn from_config(config_value: &serde_yaml::Value) -> Result<Self> {
        let config: ImgflipConfig = serde_yaml::from_value(config_value.clone())
            .context("Failed to parse imgflip provider config")?;
        // Endpoints are joined relative to the base, which needs a trailing slash
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        Ok(Self {
            base_url: Url::parse(&base)
                .with_context(|| format!("Invalid base_url for Imgflip: {}", config.base_url))?,
            client: Client::new(),
        })
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        self.base_url
            .join(name)
            .with_context(|| format!("Invalid Imgflip endpoint: {name}"))
    }
}

#[async_trait]
impl MemeProvider for ImgflipProvider {
    #[instrument(skip(self))]
    async fn templates(&self) -> Result<Vec<MemeTemplate>> {
        let response = self
            .client
            .get(self.endpoint("get_memes")?)
            .send()
            .await
            .context("Failed to send request to Imgflip API")?;

        // Anything but 200 means "no templates right now"
        if response.status() != StatusCode::OK {
            warn!(status = %response.status(), "Imgflip returned no templates");
            return Ok(Vec::new());
        }

        let memes: GetMemesResponse = response
            .json()
            .await
            .context("Failed to parse JSON response from Imgflip API")?;
        Ok(memes.data.memes)
    }

    #[instrument(skip(self, request), fields(template = %request.template_id))]
    async fn caption(&self, request: &CaptionRequest) -> Result<String> {
        let form = [
            ("template_id", request.template_id.as_str()),
            ("username", request.credentials.username.as_str()),
            ("password", request.credentials.password.as_str()),
            ("text0", request.text0.as_str()),
            ("text1", request.text1.as_str()),
        ];

        let response = self
            .client
            .post(self.endpoint("caption_image")?)
            .form(&form)
            .send()
            .await
            .context("Failed to send request to Imgflip API")?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Imgflip API request failed with status {}: {}",
                status,
                text
            ));
        }

        let caption: CaptionResponse = response
            .json()
            .await
            .context("Failed to parse JSON response from Imgflip API")?;

        match (caption.success, caption.data) {
            (true, Some(data)) => Ok(data.url),
            (true, None) => Err(anyhow!("Imgflip API returned no image URL")),
            (false, _) => Err(MemeError::Api(
                caption
                    .error_message
                    .unwrap_or_else(|| "Unknown error".to_string()),
            )
            .into()),
        }
    }
}
