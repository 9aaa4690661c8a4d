//! Compile command handler

use crate::cli::CompileArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use metafield_core::CompiledPattern;
use serde::Serialize;

#[derive(Serialize)]
struct CompiledView<'a> {
    template: &'a str,
    pattern: &'a str,
    groups: &'a [String],
}

/// Handle the compile command
pub fn handle_compile(args: CompileArgs, output: &mut OutputWriter) -> Result<()> {
    let pattern = CompiledPattern::compile(&args.template)?;

    match output.format() {
        crate::cli::OutputFormat::Human => output.writeln(pattern.as_str()),
        _ => output.data(&CompiledView {
            template: &args.template,
            pattern: pattern.as_str(),
            groups: pattern.group_names(),
        }),
    }
}
