use anyhow::{Result, anyhow};
use clap::Subcommand;
use llamadesk_core::config::Config;
use llamadesk_tools_meme::{MemeError, MemeTemplate, MemeTool, TemplateCatalog, download_meme};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ux::{GenerationSpinner, MessageType, style_text};

#[derive(Subcommand, Debug)]
pub enum MemeCommand {
    /// List the available meme templates.
    List {
        /// Only show templates whose name contains this text.
        #[arg(short, long)]
        filter: Option<String>,

        /// Maximum number of templates to show.
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Caption a template with top and bottom text.
    Generate {
        /// Template id or name.
        #[arg(short, long)]
        template: String,

        /// Text at the top of the image.
        #[arg(long, default_value = "")]
        top: String,

        /// Text at the bottom of the image.
        #[arg(long, default_value = "")]
        bottom: String,

        /// Save the generated meme as a PNG file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn format_template(template: &MemeTemplate) -> String {
    format!(
        "{:>10}  {} ({} boxes, {}x{}) {}",
        template.id,
        template.name,
        template.box_count,
        template.width,
        template.height,
        template.url
    )
}

async fn list(tool: &MemeTool, filter: Option<&str>, limit: usize) -> Result<String> {
    let mut catalog = TemplateCatalog::new();
    catalog.refresh(tool).await?;

    let filter = filter.map(str::to_lowercase);
    let lines: Vec<String> = catalog
        .templates()
        .iter()
        .filter(|t| {
            filter
                .as_deref()
                .is_none_or(|f| t.name.to_lowercase().contains(f))
        })
        .take(limit)
        .map(format_template)
        .collect();

    if lines.is_empty() {
        return Ok("No templates match.".to_string());
    }
    Ok(lines.join("\n"))
}

async fn generate(
    tool: &MemeTool,
    client: &Client,
    template: &str,
    top: &str,
    bottom: &str,
    output: Option<&Path>,
) -> Result<String> {
    if !tool.has_credentials() {
        return Err(MemeError::MissingCredentials.into());
    }

    let mut catalog = TemplateCatalog::new();
    catalog.refresh(tool).await?;
    let template = catalog
        .find(template)
        .ok_or_else(|| anyhow!("Unknown meme template: {template}"))?;

    let spinner = GenerationSpinner::new(format!("Generating meme from {}...", template.name));
    let result = tool.generate(template, top, bottom).await;
    spinner.clear();
    let url = result?;
    info!(%url, "Generated meme");

    let mut lines = vec![
        format!("Template: {} {}", template.name, template.url),
        style_text("Meme generated successfully!", MessageType::Success).to_string(),
        url.clone(),
    ];
    if let Some(path) = output {
        download_meme(client, &url, path).await?;
        lines.push(format!("Saved to {}", path.display()));
    }
    Ok(lines.join("\n"))
}

pub async fn execute(command: MemeCommand, config: &Config) -> Result<()> {
    let tool = MemeTool::from_config(&config.meme)?;
    let output = match command {
        MemeCommand::List { filter, limit } => list(&tool, filter.as_deref(), limit).await?,
        MemeCommand::Generate {
            template,
            top,
            bottom,
            output,
        } => {
            let client = Client::new();
            generate(&tool, &client, &template, &top, &bottom, output.as_deref()).await?
        }
    };
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llamadesk_tools_meme::{CaptionRequest, Credentials, MemeProvider};
    use std::io::Cursor;
    use std::sync::Arc;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    struct StubProvider {
        templates: Vec<MemeTemplate>,
        image_url: String,
    }

    #[async_trait]
    impl MemeProvider for StubProvider {
        async fn templates(&self) -> Result<Vec<MemeTemplate>> {
            Ok(self.templates.clone())
        }

        async fn caption(&self, request: &CaptionRequest) -> Result<String> {
            assert_eq!(request.template_id, "61579");
            assert_eq!(request.text0, "one does not simply");
            Ok(self.image_url.clone())
        }
    }

    fn template(id: &str, name: &str) -> MemeTemplate {
        MemeTemplate {
            id: id.to_string(),
            name: name.to_string(),
            url: format!("https://i.imgflip.com/{id}.jpg"),
            width: 568,
            height: 335,
            box_count: 2,
        }
    }

    fn tool(templates: Vec<MemeTemplate>, image_url: &str, credentials: Credentials) -> MemeTool {
        MemeTool::with_provider(
            Arc::new(StubProvider {
                templates,
                image_url: image_url.to_string(),
            }),
            credentials,
        )
    }

    fn credentials() -> Credentials {
        Credentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        }
    }

    fn catalog() -> Vec<MemeTemplate> {
        vec![
            template("181913649", "Drake Hotline Bling"),
            template("61579", "One Does Not Simply"),
            template("87743020", "Two Buttons"),
        ]
    }

    #[tokio::test]
    async fn test_list_filters_and_limits() {
        let tool = tool(catalog(), "", Credentials::default());

        let all = list(&tool, None, 2).await.unwrap();
        assert_eq!(all.lines().count(), 2);
        assert!(all.contains("Drake Hotline Bling"));

        let filtered = list(&tool, Some("buttons"), 20).await.unwrap();
        assert_eq!(filtered.lines().count(), 1);
        assert!(filtered.contains(
            "87743020  Two Buttons (2 boxes, 568x335) https://i.imgflip.com/87743020.jpg"
        ));

        let none = list(&tool, Some("nothing"), 20).await.unwrap();
        assert_eq!(none, "No templates match.");
    }

    #[tokio::test]
    async fn test_list_without_templates_fails() {
        let tool = tool(Vec::new(), "", Credentials::default());
        let err = list(&tool, None, 20).await.unwrap_err();
        assert!(err.to_string().contains("Unable to fetch meme templates"));
    }

    #[tokio::test]
    async fn test_generate_requires_credentials() {
        let tool = tool(catalog(), "", Credentials::default());
        let err = generate(&tool, &Client::new(), "61579", "a", "b", None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please set your Imgflip credentials in environment variables!"
        );
    }

    #[tokio::test]
    async fn test_generate_unknown_template() {
        let tool = tool(catalog(), "", credentials());
        let err = generate(&tool, &Client::new(), "Distracted Boyfriend", "a", "b", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown meme template"));
    }

    #[tokio::test]
    async fn test_generate_by_name_and_save() {
        let server = MockServer::start().await;
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(image::RgbImage::new(3, 3))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        Mock::given(method("GET"))
            .and(path("/meme.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png))
            .mount(&server)
            .await;

        let image_url = format!("{}/meme.jpg", server.uri());
        let tool = tool(catalog(), &image_url, credentials());
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("meme.png");

        let output = generate(
            &tool,
            &Client::new(),
            "one does not simply",
            "one does not simply",
            "write rust without tests",
            Some(&output_path),
        )
        .await
        .unwrap();

        assert!(output.starts_with(
            "Template: One Does Not Simply https://i.imgflip.com/61579.jpg"
        ));
        assert!(output.contains("Meme generated successfully!"));
        assert!(output.contains(&image_url));
        assert!(output.contains("Saved to"));
        assert!(output_path.exists());
    }
}
