//! Event rendering for stdout.

use mcwatch_core::LogEvent;

use crate::cli::OutputFormat;

pub fn render_event(event: &LogEvent, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string(event)?,
        OutputFormat::Text => event.to_string(),
    })
}
