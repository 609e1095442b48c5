//! Printing of command results on stdout.

use std::io::Write as _;

use serde::Serialize;

use crate::cli::OutputFormat;

/// `value` as JSON: indented for `json`, on one line for `raw`.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value),
        OutputFormat::Raw => serde_json::to_string(value),
    }?;
    Ok(text)
}

/// Write a build summary or resolved configuration to stdout.
pub fn print_result<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let text = render(value, format)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}
