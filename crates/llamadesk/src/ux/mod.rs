mod presenter;
mod progress;

pub use presenter::{MessageType, format_footer_metrics, format_section, style_text};
pub use progress::GenerationSpinner;

use console::style;

pub fn present_error(error: anyhow::Error) {
    let error_text = style("ERROR:").red().bold();
    eprintln!("\n{error_text} {error:#}");
}
