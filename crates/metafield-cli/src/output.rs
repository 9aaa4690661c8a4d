//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output in
//! various formats (JSON, YAML, human-readable), progress indicators, and the
//! console sink that shows rule notices while records are processed.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use metafield_core::{Notice, NoticeLevel, NoticeSink, PipelineStats, Rule};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;
use std::time::Duration;
use tracing::trace;

/// Prefix shown before informational rule notices
pub const NOTICE_PREFIX: &str = "[metadata]";

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a compiled rule set
    fn format_rules(&self, rules: &[Rule]) -> Result<String>;

    /// Format run statistics
    fn format_stats(&self, stats: &RunSummary) -> Result<String>;
}

/// Statistics for one `run` invocation
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunSummary {
    pub records: usize,
    #[serde(flatten)]
    pub pipeline: PipelineStats,
    pub duration_ms: u64,
}

/// Serializable view of a compiled rule
#[derive(Debug, Serialize)]
struct RuleView<'a> {
    index: usize,
    action: String,
    field: &'a str,
    pattern: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    replacement: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups: Option<&'a [String]>,
}

impl<'a> RuleView<'a> {
    fn new(index: usize, rule: &'a Rule) -> Self {
        match rule {
            Rule::Interpret(r) => Self {
                index,
                action: rule.kind().to_string(),
                field: r.template(),
                pattern: r.pattern().as_str(),
                replacement: None,
                groups: Some(r.pattern().group_names()),
            },
            Rule::Replace(r) => Self {
                index,
                action: rule.kind().to_string(),
                field: r.field(),
                pattern: r.search().as_str(),
                replacement: Some(r.replacement()),
                groups: None,
            },
        }
    }
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_rules(&self, rules: &[Rule]) -> Result<String> {
        let views: Vec<RuleView<'_>> = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| RuleView::new(i, rule))
            .collect();

        match self {
            OutputFormat::Human => Ok(format_rules_human(&views)),
            _ => self.format(&views),
        }
    }

    fn format_stats(&self, stats: &RunSummary) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format!(
                "Processed {} record(s) with {} rule application(s): {} field(s) written, {} warning(s) in {}ms",
                stats.records,
                stats.pipeline.rules_applied,
                stats.pipeline.fields_written,
                stats.pipeline.warnings,
                stats.duration_ms
            )),
            _ => self.format(stats),
        }
    }
}

fn format_rules_human(views: &[RuleView<'_>]) -> String {
    let mut output = String::new();
    for view in views {
        output.push_str(&format!("{}. {} {}\n", view.index + 1, view.action, view.field));
        output.push_str(&format!("   pattern: {}\n", view.pattern));
        if let Some(groups) = view.groups {
            if !groups.is_empty() {
                output.push_str(&format!("   groups:  {}\n", groups.join(", ")));
            }
        }
        if let Some(replacement) = view.replacement {
            output.push_str(&format!("   replace: {:?}\n", replacement));
        }
    }
    output
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stderr().is_terminal(),
            quiet,
            verbose,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false,
            quiet,
            verbose,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Disable progress indicators
    pub fn disable_progress(&mut self) {
        self.show_progress = false;
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");
        self.write_formatted(&formatted)
    }

    /// Write text that is already formatted, ending it with a newline
    pub fn write_formatted(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }

    /// Write a compiled rule set
    pub fn rules(&mut self, rules: &[Rule]) -> Result<()> {
        let formatted = self.format.format_rules(rules)?;
        self.write_formatted(&formatted)
    }

    /// Write run statistics
    pub fn stats(&mut self, stats: &RunSummary) -> Result<()> {
        let formatted = self.format.format_stats(stats)?;
        self.write_formatted(&formatted)
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress || length < 2 {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Create a notice sink that matches this writer's settings
    pub fn console_sink(&self) -> ConsoleSink {
        ConsoleSink::new(self.use_color, self.quiet, self.verbose)
    }
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Notice sink that prints rule notices to stderr
///
/// Info notices are shown unless quiet, debug notices only with `-v`, and
/// warnings always. Lines are printed around an attached progress bar so the
/// bar is not torn.
pub struct ConsoleSink {
    use_color: bool,
    quiet: bool,
    verbose: u8,
    progress: Mutex<Option<ProgressBar>>,
}

impl ConsoleSink {
    pub fn new(use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            use_color,
            quiet,
            verbose,
            progress: Mutex::new(None),
        }
    }

    /// Print around `pb` until it is detached
    pub fn attach_progress(&self, pb: ProgressBar) {
        *self.lock_progress() = Some(pb);
    }

    /// Stop printing around the progress bar, handing it back
    pub fn detach_progress(&self) -> Option<ProgressBar> {
        self.lock_progress().take()
    }

    fn lock_progress(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The line shown for `notice`, or `None` if it is filtered out
    pub fn render(&self, notice: &Notice) -> Option<String> {
        match notice.level {
            NoticeLevel::Debug if self.verbose == 0 => None,
            NoticeLevel::Info if self.quiet => None,
            NoticeLevel::Debug => {
                let line = format!("[debug] {} {}", NOTICE_PREFIX, notice.message);
                Some(if self.use_color {
                    line.dimmed().to_string()
                } else {
                    line
                })
            }
            NoticeLevel::Info => Some(format!("{} {}", NOTICE_PREFIX, notice.message)),
            NoticeLevel::Warning => Some(if self.use_color {
                format!("{} {}", "WARNING:".yellow().bold(), notice.message)
            } else {
                format!("WARNING: {}", notice.message)
            }),
        }
    }
}

impl NoticeSink for ConsoleSink {
    fn report(&self, notice: &Notice) {
        let Some(line) = self.render(notice) else {
            return;
        };

        match self.lock_progress().as_ref() {
            Some(pb) => pb.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
