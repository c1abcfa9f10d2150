//! Text extraction from images.
mod source;
mod tesseract;

#[cfg(feature = "leptess")]
mod libtess;

pub use source::{ImageSource, LoadedImage, SUPPORTED_EXTENSIONS, decode_image, load_image};
pub use tesseract::TesseractCli;

#[cfg(feature = "leptess")]
pub use libtess::LeptessEngine;

use crate::completion::{CompletionModel, GenerateSettings};
use crate::config::{OcrConfig, OcrEngineKind};
use crate::summary::{ContentKind, summarize};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{instrument, warn};

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine '{0}' is not installed or not on PATH")]
    NotInstalled(String),
    #[error("OCR failed with exit code {status}: {stderr}")]
    Failed { status: i32, stderr: String },
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR engine '{0}' is not available in this build")]
    Unavailable(String),
}

/// Something that can read the text in a PNG image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_text(&self, png: &[u8]) -> Result<String, OcrError>;
}

/// Builds the engine selected in the configuration.
pub fn get_ocr_engine(config: &OcrConfig) -> Result<Arc<dyn OcrEngine>, OcrError> {
    match config.engine {
        OcrEngineKind::Tesseract => Ok(Arc::new(TesseractCli::new(
            &config.binary,
            &config.language,
            config.data_path.clone(),
        ))),
        #[cfg(feature = "leptess")]
        OcrEngineKind::Leptess => Ok(Arc::new(LeptessEngine::new(
            &config.language,
            config.data_path.clone(),
        ))),
        #[cfg(not(feature = "leptess"))]
        OcrEngineKind::Leptess => Err(OcrError::Unavailable("leptess".to_string())),
    }
}

/// The result of analyzing one image.
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    /// Text recognized in the image, untruncated.
    pub text: String,
    pub analysis: String,
}

/// Runs OCR on the image and asks the model to summarize the recognized text.
#[instrument(skip_all, fields(width = image.width, height = image.height))]
pub async fn analyze_image(
    model: &dyn CompletionModel,
    ocr: &dyn OcrEngine,
    image: &LoadedImage,
    settings: &GenerateSettings,
) -> Result<ImageAnalysis> {
    let text = ocr
        .extract_text(&image.png)
        .await
        .context("Error performing OCR")?;
    if text.is_empty() {
        warn!("OCR found no text in image");
    }

    let response = summarize(model, ContentKind::ImageText, &text, settings).await?;
    Ok(ImageAnalysis {
        text,
        analysis: response.text,
    })
}
