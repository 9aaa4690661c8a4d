//! Shared utilities for command handlers

use crate::cli::RuleArgs;
use crate::config::{Config, FileFormat};
use crate::error::{Error, Result};
use metafield_core::{MetadataPipeline, NoticeSink, PipelineBuilder, RuleSpec};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// One entry of a rules file: a tagged spec or a `FROM:TO` shorthand
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RuleEntry {
    Spec(RuleSpec),
    Shorthand(String),
}

/// A rules file is a bare list or a document with a `rules` key
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RulesFile {
    List(Vec<RuleEntry>),
    Document { rules: Vec<RuleEntry> },
}

/// Load the rule list from a YAML or JSON rules file
pub fn load_rules_file(path: &Path) -> Result<Vec<RuleSpec>> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;

    let parsed: RulesFile = match FileFormat::from_path(path) {
        FileFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: format!("a YAML rule list ({})", e),
        })?,
        FileFormat::Toml => toml::from_str(&content)?,
        FileFormat::Json => serde_json::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: format!("a JSON rule list ({})", e),
        })?,
    };

    let entries = match parsed {
        RulesFile::List(entries) | RulesFile::Document { rules: entries } => entries,
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            RuleEntry::Spec(spec) => Ok(spec),
            RuleEntry::Shorthand(raw) => Ok(raw.parse::<RuleSpec>()?),
        })
        .collect()
}

/// Gather every rule for a command, in application order
///
/// Config rules come first, then the rules file, then `--parse` flags, then
/// `--replace` flags.
pub fn collect_rule_specs(config: &Config, args: &RuleArgs) -> Result<Vec<RuleSpec>> {
    let mut specs = config.rules.clone();

    if let Some(path) = &args.rules_file {
        let from_file = load_rules_file(path)?;
        tracing::debug!(path = %path.display(), rules = from_file.len(), "Loaded rules file");
        specs.extend(from_file);
    }

    specs.extend(args.command_line_specs()?);
    Ok(specs)
}

/// Compile the rule set for a command into a pipeline
pub fn build_pipeline(
    config: &Config,
    args: &RuleArgs,
    sink: Arc<dyn NoticeSink>,
) -> Result<MetadataPipeline> {
    let specs = collect_rule_specs(config, args)?;
    if specs.is_empty() {
        return Err(Error::invalid_args(
            "no rules given; use --parse, --replace, --rules or a config file",
        ));
    }

    let resolver = config.template_resolver();
    tracing::debug!(
        rules = specs.len(),
        na_placeholder = resolver.na_placeholder(),
        "Building metadata pipeline"
    );

    let pipeline = PipelineBuilder::new()
        .specs(specs)
        .resolver(Arc::new(resolver))
        .sink(sink)
        .build()?;
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn rules_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_rules_file_mixes_specs_and_shorthands() {
        let file = rules_file(
            ".yaml",
            r#"
- "title:%(artist)s - %(track)s"
- action: replace
  field: track
  search: '\s*\(Official Video\)'
  replace: ""
"#,
        );

        let specs = load_rules_file(file.path()).unwrap();
        assert_eq!(
            specs,
            vec![
                RuleSpec::interpret("title", "%(artist)s - %(track)s"),
                RuleSpec::replace("track", r"\s*\(Official Video\)", ""),
            ]
        );
    }

    #[test]
    fn test_rules_file_document_form() {
        let file = rules_file(
            ".json",
            r#"{"rules": [{"action": "interpret", "from": "title", "to": "%(n)s"}]}"#,
        );
        assert_eq!(
            load_rules_file(file.path()).unwrap(),
            vec![RuleSpec::interpret("title", "%(n)s")]
        );
    }

    #[test]
    fn test_bad_shorthand_in_rules_file() {
        let file = rules_file(".yaml", "- no colon\n");
        let err = load_rules_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(metafield_core::Error::MalformedShorthand { .. })
        ));
    }

    #[test]
    fn test_rule_order() {
        let file = rules_file(".yaml", "- \"uploader:%(channel)s\"\n");
        let config = Config {
            rules: vec![RuleSpec::from_title("%(artist)s - %(track)s")],
            ..Config::default()
        };
        let args = RuleArgs {
            rules_file: Some(file.path().to_path_buf()),
            parse: vec!["track:%(song)s".to_string()],
            replace: vec!["song".to_string(), "a".to_string(), "b".to_string()],
        };

        let specs = collect_rule_specs(&config, &args).unwrap();
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0], RuleSpec::interpret("title", "%(artist)s - %(track)s"));
        assert_eq!(specs[1], RuleSpec::interpret("uploader", "%(channel)s"));
        assert_eq!(specs[2], RuleSpec::interpret("track", "%(song)s"));
        assert_eq!(specs[3], RuleSpec::replace("song", "a", "b"));
    }

    #[test]
    fn test_empty_rule_set_is_rejected() {
        let sink = Arc::new(metafield_core::CollectingSink::new());
        let err = build_pipeline(&Config::default(), &RuleArgs::default(), sink).unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
    }

    #[test]
    fn test_invalid_rule_index_counts_config_rules() {
        let config = Config {
            rules: vec![RuleSpec::replace("title", "a", "b")],
            ..Config::default()
        };
        let args = RuleArgs {
            replace: vec!["title".to_string(), "(".to_string(), "".to_string()],
            ..RuleArgs::default()
        };
        let sink = Arc::new(metafield_core::CollectingSink::new());

        let err = build_pipeline(&config, &args, sink).unwrap_err();
        assert!(err.to_string().starts_with("Rule #1 is invalid"));
    }
}
