use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use url::Url;

/// File extensions accepted for local uploads.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Url(String),
}

/// A decoded image, re-encoded as PNG for the OCR engines.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

fn check_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(anyhow!(
            "Unsupported image file '{}', expected one of: {}",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        ))
    }
}

async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let url = Url::parse(url.trim()).with_context(|| format!("Invalid image URL: {url}"))?;
    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("Failed to send request to {url}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Request to {url} failed with status {status}"));
    }
    let bytes = response
        .bytes()
        .await
        .context("Failed to read image body")?;
    Ok(bytes.to_vec())
}

/// Decodes `bytes` as an image and re-encodes it as PNG.
pub fn decode_image(bytes: &[u8]) -> Result<LoadedImage> {
    let image = image::load_from_memory(bytes).context("Data is not a decodable image")?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("Failed to encode image as PNG")?;
    Ok(LoadedImage {
        png,
        width: image.width(),
        height: image.height(),
    })
}

/// Reads an image from disk or the network and checks that it decodes.
#[instrument(skip(client))]
pub async fn load_image(client: &Client, source: &ImageSource) -> Result<LoadedImage> {
    let bytes = match source {
        ImageSource::File(path) => {
            check_extension(path)?;
            tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read image file '{}'", path.display()))?
        }
        ImageSource::Url(url) => fetch_bytes(client, url)
            .await
            .context("Error loading image from URL")?,
    };
    debug!(bytes = bytes.len(), "Loaded image data");
    decode_image(&bytes)
}
