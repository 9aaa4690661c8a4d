//! Validation command handler

use super::utils::build_pipeline;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use std::sync::Arc;
use tracing::{info, instrument};

/// Handle the validate command
///
/// Compiling the rule set is the validation; any construction error is
/// returned and sets the exit code.
#[instrument(skip_all)]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("validate_command");

    let pipeline = build_pipeline(config, &args.rules, Arc::new(output.console_sink()))?;
    info!(rules = pipeline.rule_count(), "Rule set is valid");

    output.section("Compiled Rules")?;
    output.rules(pipeline.rules())?;
    output.success(&format!("✓ {} rule(s) compiled", pipeline.rule_count()))?;
    Ok(())
}
