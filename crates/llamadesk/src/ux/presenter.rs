use console::{Style, StyledObject};
use llamadesk_core::completion::CompletionMetrics;
use llamadesk_core::text::{DISPLAY_LIMIT, preview};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Prompt,
    Heading,
    Footer,
    Success,
    Warning,
    Error,
}

pub fn style_text(text: &str, style: MessageType) -> StyledObject<&str> {
    let style_obj = match style {
        MessageType::Prompt => Style::new().blue().bold(),
        MessageType::Heading => Style::new().bold(),
        MessageType::Footer => Style::new().white().dim(),
        MessageType::Success => Style::new().green(),
        MessageType::Warning => Style::new().yellow(),
        MessageType::Error => Style::new().red().bold(),
    };
    style_obj.apply_to(text)
}

/// A titled block of text, shortened to the display limit.
pub fn format_section(title: &str, body: &str) -> String {
    format!(
        "{}\n{}",
        style_text(title, MessageType::Heading),
        preview(body, DISPLAY_LIMIT)
    )
}

pub fn format_footer_metrics(metrics: &CompletionMetrics, finish_reason: Option<&str>) -> String {
    let mut footer_complete = String::from("◼ Completed");
    if let Some(reason) = finish_reason {
        footer_complete.push_str(&format!(" ({reason})"));
    }
    footer_complete.push('.');

    let mut details = Vec::new();

    if metrics.prompt_eval_latency_ms > 0.0 {
        details.push(format!(
            "{:.2}s to first token",
            metrics.prompt_eval_latency_ms / 1000.0
        ));
    }
    if metrics.completion_latency_ms > 0.0 {
        details.push(format!(
            "{:.2}s total",
            (metrics.prompt_eval_latency_ms + metrics.completion_latency_ms) / 1000.0
        ));
    }

    if metrics.completion_tokens > 0 && metrics.completion_latency_ms > 0.0 {
        let tokens_per_sec =
            metrics.completion_tokens as f32 * 1000.0 / metrics.completion_latency_ms;
        details.push(format!("{tokens_per_sec:.2} tokens/s"));
    }

    if metrics.completion_tokens > 0 {
        details.push(format!("{} completion tokens", metrics.completion_tokens));
    }
    if metrics.prompt_tokens > 0 {
        details.push(format!("{} prompt tokens", metrics.prompt_tokens));
    }

    let footer = if details.is_empty() {
        footer_complete
    } else {
        format!("{} {}", footer_complete, details.join(". "))
    };

    style_text(&footer, MessageType::Footer).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_styles() {
        let styled = style_text("test", MessageType::Error);
        assert_eq!(
            styled.force_styling(true).to_string(),
            "\u{1b}[31m\u{1b}[1mtest\u{1b}[0m"
        );
    }

    #[test]
    fn test_format_footer_metrics() {
        console::set_colors_enabled(false);
        let metrics = CompletionMetrics {
            prompt_tokens: 10,
            prompt_eval_latency_ms: 500.0,
            completion_tokens: 40,
            completion_latency_ms: 2000.0,
        };
        let footer = format_footer_metrics(&metrics, Some("stop"));
        assert_eq!(
            footer,
            "◼ Completed (stop). 0.50s to first token. 2.50s total. 20.00 tokens/s. 40 completion tokens. 10 prompt tokens"
        );

        let bare = format_footer_metrics(&CompletionMetrics::default(), None);
        assert_eq!(bare, "◼ Completed.");
    }

    #[test]
    fn test_format_section_truncates_body() {
        console::set_colors_enabled(false);
        let body = "z".repeat(DISPLAY_LIMIT + 10);
        let section = format_section("Extracted Text:", &body);
        let (title, shown) = section.split_once('\n').unwrap();
        assert_eq!(title, "Extracted Text:");
        assert_eq!(shown.len(), DISPLAY_LIMIT + 3);
        assert!(shown.ends_with("..."));
    }
}
