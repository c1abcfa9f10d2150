use super::{OcrEngine, OcrError};
use async_trait::async_trait;
use tracing::instrument;

/// In-process OCR through libtesseract.
#[derive(Debug, Clone)]
pub struct LeptessEngine {
    language: String,
    data_path: Option<String>,
}

impl LeptessEngine {
    pub fn new(language: &str, data_path: Option<String>) -> Self {
        Self {
            language: language.to_string(),
            data_path,
        }
    }
}

#[async_trait]
impl OcrEngine for LeptessEngine {
    #[instrument(skip(self, png), fields(bytes = png.len()))]
    async fn extract_text(&self, png: &[u8]) -> Result<String, OcrError> {
        let language = self.language.clone();
        let data_path = self.data_path.clone();
        let png = png.to_vec();

        // libtesseract blocks, keep it off the runtime threads
        tokio::task::spawn_blocking(move || {
            let mut lt = leptess::LepTess::new(data_path.as_deref(), &language)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(&png)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            let text = lt
                .get_utf8_text()
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(text.trim().to_string())
        })
        .await
        .map_err(|e| OcrError::Engine(e.to_string()))?
    }
}
