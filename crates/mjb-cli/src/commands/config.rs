use crate::cli::{ConfigArgs, OutputFormat};
use crate::output::print_result;

/// Handle `mjb config`.
pub fn handle(args: &ConfigArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = super::resolve_config(&args.config)?;
    print_result(&config, format)
}
