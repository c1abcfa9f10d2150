use anyhow::Result;
use llamadesk_core::completion::{CompletionModel, GenerateSettings};
use llamadesk_core::config::{Config, WebConfig};
use llamadesk_core::web::{WebsiteAnalysis, analyze_website};
use reqwest::Client;

use super::task_model;
use crate::ux::{GenerationSpinner, format_section};

fn render(analysis: &WebsiteAnalysis) -> String {
    format!(
        "{}\n\n{}",
        format_section("Website Content:", &analysis.content),
        format_section("Analysis:", &analysis.analysis)
    )
}

async fn analyze(
    model: &dyn CompletionModel,
    client: &Client,
    web: &WebConfig,
    url: &str,
    settings: &GenerateSettings,
) -> Result<String> {
    let spinner = GenerationSpinner::new(format!("Analyzing {url}..."));
    let result = analyze_website(model, client, web, url, settings).await;
    spinner.clear();
    Ok(render(&result?))
}

pub async fn execute(url: &str, config: &Config) -> Result<()> {
    let (model, settings) = task_model(&config.task)?;
    let client = Client::new();
    let output = analyze(model.as_ref(), &client, &config.web, url, &settings).await?;
    println!("{output}");
    Ok(())
}
