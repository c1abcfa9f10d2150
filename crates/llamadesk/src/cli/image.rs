use anyhow::{Result, anyhow};
use clap::{ArgGroup, Args};
use llamadesk_core::completion::{CompletionModel, GenerateSettings};
use llamadesk_core::config::Config;
use llamadesk_core::ocr::{
    ImageAnalysis, ImageSource, OcrEngine, analyze_image, get_ocr_engine, load_image,
};
use reqwest::Client;
use std::path::PathBuf;

use super::task_model;
use crate::ux::{GenerationSpinner, MessageType, format_section, style_text};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "url"])))]
pub struct ImageArgs {
    /// Local image file (png, jpg or jpeg).
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Image URL.
    #[arg(short, long)]
    url: Option<String>,
}

impl ImageArgs {
    fn source(self) -> Result<ImageSource> {
        match (self.file, self.url) {
            (Some(path), _) => Ok(ImageSource::File(path)),
            (None, Some(url)) => Ok(ImageSource::Url(url)),
            (None, None) => Err(anyhow!("Please provide an image file or URL")),
        }
    }
}

fn render(analysis: &ImageAnalysis) -> String {
    let mut output = String::new();
    if analysis.text.is_empty() {
        output.push_str(&style_text("No text found in the image.", MessageType::Warning).to_string());
        output.push_str("\n\n");
    }
    output.push_str(&format_section("Extracted Text:", &analysis.text));
    output.push_str("\n\n");
    output.push_str(&format_section("Analysis:", &analysis.analysis));
    output
}

async fn analyze(
    model: &dyn CompletionModel,
    ocr: &dyn OcrEngine,
    client: &Client,
    source: &ImageSource,
    settings: &GenerateSettings,
) -> Result<String> {
    let image = load_image(client, source).await?;

    let spinner = GenerationSpinner::new("Reading image...".to_string());
    let result = analyze_image(model, ocr, &image, settings).await;
    spinner.clear();
    Ok(render(&result?))
}

pub async fn execute(args: ImageArgs, config: &Config) -> Result<()> {
    let source = args.source()?;
    let ocr = get_ocr_engine(&config.ocr)?;
    let (model, settings) = task_model(&config.task)?;
    let client = Client::new();

    let output = analyze(model.as_ref(), ocr.as_ref(), &client, &source, &settings).await?;
    println!("{output}");
    Ok(())
}
