use super::{OcrEngine, OcrError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

/// OCR through the `tesseract` command line program.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: String,
    language: String,
    data_path: Option<String>,
}

impl TesseractCli {
    pub fn new(binary: &str, language: &str, data_path: Option<String>) -> Self {
        Self {
            binary: binary.to_string(),
            language: language.to_string(),
            data_path,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("stdin").arg("stdout").arg("-l").arg(&self.language);
        if let Some(dir) = &self.data_path {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    #[instrument(skip(self, png), fields(binary = %self.binary, bytes = png.len()))]
    async fn extract_text(&self, png: &[u8]) -> Result<String, OcrError> {
        let mut child = self.command().spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OcrError::NotInstalled(self.binary.clone())
            } else {
                OcrError::Io(e)
            }
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            // The exit status decides success when the reader quits early
            match stdin.write_all(png).await {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
            drop(stdin);
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(chars = text.len(), "OCR complete");
        Ok(text)
    }
}
