//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Args, Parser, Subcommand, ValueEnum};
use metafield_core::{Result as CoreResult, RuleSpec};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Metafield CLI - Parse and rewrite media metadata fields
///
/// Applies an ordered list of INTERPRET and REPLACE rules to metadata
/// records read from JSON or YAML files.
#[derive(Parser, Debug)]
#[command(
    name = "metafield",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "METAFIELD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: human, or `output.format` from config]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply rules to one or more metadata records
    Run(RunArgs),

    /// Compile a rule set and show the resulting patterns
    Validate(ValidateArgs),

    /// Show the regular expression compiled from a template
    Compile(CompileArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Rule sources shared by `run` and `validate`
#[derive(Args, Debug, Default, Clone)]
pub struct RuleArgs {
    /// YAML or JSON file holding a list of rules
    #[arg(short = 'r', long = "rules", value_name = "RULES_FILE")]
    pub rules_file: Option<PathBuf>,

    /// Parse fields with a FROM:TO specification (repeatable)
    #[arg(short = 'p', long = "parse", value_name = "FROM:TO")]
    pub parse: Vec<String>,

    /// Replace text in a field using a regex; `\1` or `\g<name>` insert groups (repeatable)
    #[arg(
        long = "replace",
        num_args = 3,
        value_names = ["FIELD", "REGEX", "REPLACE"],
        action = clap::ArgAction::Append
    )]
    pub replace: Vec<String>,
}

impl RuleArgs {
    /// Rules given on the command line, `--parse` before `--replace`
    pub fn command_line_specs(&self) -> CoreResult<Vec<RuleSpec>> {
        let mut specs = self
            .parse
            .iter()
            .map(|raw| raw.parse::<RuleSpec>())
            .collect::<CoreResult<Vec<_>>>()?;

        specs.extend(
            self.replace
                .chunks_exact(3)
                .map(|triple| RuleSpec::replace(&triple[0], &triple[1], &triple[2])),
        );
        Ok(specs)
    }

    /// Check if no rule source was given
    pub fn is_empty(&self) -> bool {
        self.rules_file.is_none() && self.parse.is_empty() && self.replace.is_empty()
    }
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Records file (JSON object, JSON array, JSON lines or YAML); stdin if omitted
    #[arg(value_name = "RECORDS")]
    pub records: Option<PathBuf>,

    #[command(flatten)]
    pub rules: RuleArgs,

    /// Save the transformed records to a file
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,

    /// Show run statistics
    #[arg(long)]
    pub stats: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub rules: RuleArgs,
}

/// Arguments for the compile command
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Template such as "%(artist)s - %(track)s", or a bare field name
    #[arg(value_name = "TEMPLATE")]
    pub template: String,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show current configuration values
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Force overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    #[default]
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stderr().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
