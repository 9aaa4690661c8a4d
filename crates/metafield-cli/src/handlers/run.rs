//! Run command handler

use super::utils::build_pipeline;
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, RunSummary};
use crate::records::{read_records, render_records, save_records};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Handle the run command
#[instrument(skip_all, fields(records = ?args.records))]
pub fn handle_run(args: RunArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::new("run_command");

    let sink = Arc::new(output.console_sink());
    let pipeline = build_pipeline(config, &args.rules, sink.clone())?;
    info!(rules = pipeline.rule_count(), "Rule set compiled");

    let mut batch = read_records(args.records.as_deref())?;
    debug!(records = batch.records.len(), shape = ?batch.shape, "Records loaded");

    let progress = output.progress_bar(batch.records.len() as u64, "records");
    if let Some(pb) = &progress {
        sink.attach_progress(pb.clone());
    }

    let records = std::mem::take(&mut batch.records);
    let (records, stats) = pipeline.run_batch(records.into_iter().inspect(|_| {
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }));
    batch.records = records;

    if let Some(pb) = sink.detach_progress() {
        pb.finish_and_clear();
    }

    match &args.save_to {
        Some(path) => {
            save_records(path, &batch)?;
            output.success(&format!(
                "Saved {} record(s) to {}",
                batch.records.len(),
                path.display()
            ))?;
        }
        None => {
            let rendered = render_records(&batch, output.format())?;
            output.write_formatted(&rendered)?;
        }
    }

    let summary = RunSummary {
        records: batch.records.len(),
        pipeline: stats,
        duration_ms: timer.elapsed().as_millis() as u64,
    };
    info!(
        records = summary.records,
        warnings = stats.warnings,
        fields_written = stats.fields_written,
        "Run finished"
    );
    if args.stats {
        output.stats(&summary)?;
    }

    Ok(())
}
