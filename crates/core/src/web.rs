//! Website content fetching and extraction.
use crate::completion::{CompletionModel, GenerateSettings};
use crate::config::WebConfig;
use crate::summary::{ContentKind, summarize};
use crate::text::clean_text;
use anyhow::{Context, Result, anyhow};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::{Client, header::USER_AGENT};
use tracing::{debug, instrument};
use url::Url;

static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid regex")
});
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
// Block-level tags separate words, inline tags do not
static BLOCK_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)</?(?:address|article|aside|blockquote|body|br|dd|div|dl|dt|footer|form|h[1-6]|head|header|hr|html|li|main|nav|ol|p|pre|section|table|tbody|td|tfoot|th|thead|title|tr|ul)\b[^>]*>",
    )
    .expect("valid regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));

/// The result of analyzing one page.
#[derive(Debug, Clone)]
pub struct WebsiteAnalysis {
    pub url: String,
    /// Cleaned page text, untruncated.
    pub content: String,
    pub analysis: String,
}

/// Validates that `input` is an absolute http(s) URL.
pub fn parse_page_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Please enter a URL"));
    }
    let url = Url::parse(trimmed).with_context(|| format!("Invalid URL: {trimmed}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(anyhow!("Unsupported URL scheme: {scheme}")),
    }
}

/// Downloads the raw HTML of a page.
#[instrument(skip(client, user_agent))]
pub async fn fetch_page(client: &Client, url: &Url, user_agent: &str) -> Result<String> {
    let response = client
        .get(url.clone())
        .header(USER_AGENT, user_agent)
        .send()
        .await
        .with_context(|| format!("Failed to send request to {url}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Request to {url} failed with status {status}"));
    }

    let body = response
        .text()
        .await
        .context("Failed to read response body")?;
    debug!(bytes = body.len(), "Fetched page");
    Ok(body)
}

fn decode_entity(caps: &Captures) -> String {
    let entity = &caps[1];
    let decoded = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some(' '),
            _ => None,
        }
    };
    decoded.map_or_else(|| caps[0].to_string(), String::from)
}

/// Returns the visible text of an HTML document, with scripts and styles removed.
pub fn extract_text(html: &str) -> String {
    let without_code = SCRIPT_OR_STYLE.replace_all(html, " ");
    let without_comments = COMMENT.replace_all(&without_code, " ");
    let without_blocks = BLOCK_TAG.replace_all(&without_comments, " ");
    let without_tags = TAG.replace_all(&without_blocks, "");
    let decoded = ENTITY.replace_all(&without_tags, decode_entity);
    clean_text(&decoded)
}

/// Fetches a page, extracts its text and asks the model to summarize it.
#[instrument(skip(model, client, web, settings))]
pub async fn analyze_website(
    model: &dyn CompletionModel,
    client: &Client,
    web: &WebConfig,
    url: &str,
    settings: &GenerateSettings,
) -> Result<WebsiteAnalysis> {
    let url = parse_page_url(url)?;
    let html = fetch_page(client, &url, &web.user_agent)
        .await
        .context("Error fetching website content")?;
    let content = extract_text(&html);

    let response = summarize(model, ContentKind::Website, &content, settings).await?;
    Ok(WebsiteAnalysis {
        url: url.to_string(),
        content,
        analysis: response.text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_provider::TestProviderModel;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Rust &amp; Friends</title>
  <style>body { color: red; }</style>
  <script type="text/javascript">var x = "<b>not text</b>";</script>
</head>
<body>
  <!-- hidden comment -->
  <h1>Hello,   world!</h1>
  <p>Fish &lt;3 chips &#8212; every day&#33;</p>
  <SCRIPT>alert(1)</SCRIPT>
</body>
</html>"#;

    #[test]
    fn test_extract_text_removes_code_and_markup() {
        let text = extract_text(PAGE);
        assert_eq!(text, "Rust Friends Hello, world! Fish 3 chips every day!");
    }

    #[test]
    fn test_extract_text_joins_inline_markup() {
        assert_eq!(
            extract_text("<p>H<sub>2</sub>O and <a href='#'>link</a>s</p>"),
            "H2O and links"
        );
        assert_eq!(
            extract_text("<ul><li>one</li><li><b>two</b></li></ul><br/>three"),
            "one two three"
        );
        assert_eq!(extract_text("<pre>a</pre><p>b</p>"), "a b");
    }

    #[test]
    fn test_extract_text_keeps_unknown_entities() {
        assert_eq!(extract_text("<p>a&unknown;b</p>"), "aunknownb");
    }

    #[test]
    fn test_parse_page_url() {
        assert!(parse_page_url("https://example.com").is_ok());
        assert_eq!(
            parse_page_url("  ").unwrap_err().to_string(),
            "Please enter a URL"
        );
        assert!(parse_page_url("example.com").is_err());
        assert!(
            parse_page_url("ftp://example.com")
                .unwrap_err()
                .to_string()
                .contains("Unsupported URL scheme")
        );
    }

    #[tokio::test]
    async fn test_analyze_website_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .and(header("user-agent", "test-agent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let model = TestProviderModel::with_mode("");
        let web = WebConfig {
            user_agent: "test-agent/1.0".to_string(),
        };
        let url = format!("{}/article", server.uri());
        let analysis = analyze_website(
            &model,
            &Client::new(),
            &web,
            &url,
            &GenerateSettings::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            analysis.content,
            "Rust Friends Hello, world! Fish 3 chips every day!"
        );
        assert!(analysis.analysis.starts_with("echo: Please analyze"));
        assert!(analysis.analysis.ends_with(&analysis.content));
    }

    #[tokio::test]
    async fn test_analyze_website_fetch_error_skips_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let model = TestProviderModel::with_mode("");
        let err = analyze_website(
            &model,
            &Client::new(),
            &WebConfig::default(),
            &server.uri(),
            &GenerateSettings::default(),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Error fetching website content"));
        assert!(format!("{err:#}").contains("503"));
        assert!(model.prompts().is_empty());
    }
}
