//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Environment variables (`METAFIELD_CONFIG` selects the file)
//!
//! A config file can carry a base rule set that runs before any rules given
//! on the command line.

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use metafield_core::{FieldTemplateResolver, RuleSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rules applied before any command-line rules
    pub rules: Vec<RuleSpec>,

    /// Template resolver settings
    pub resolver: ResolverSection,

    /// Output settings
    pub output: OutputSection,

    /// Logging settings
    pub logging: LoggingSection,
}

/// Template resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSection {
    /// Text substituted for absent fields in INTERPRET sources
    pub na_placeholder: String,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Output format used when `--output` is not given
    pub format: OutputFormat,

    /// Use colored output
    pub color: bool,

    /// Show progress indicators for batches
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error) used when `-v` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Log format (compact, full, json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            na_placeholder: metafield_core::template::DEFAULT_NA_PLACEHOLDER.to_string(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
            progress: true,
        }
    }
}

/// Serialization format of a file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    /// Pick a format from the path's extension, JSON when unknown
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match FileFormat::from_path(path) {
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
            FileFormat::Json => serde_json::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Path of the per-user config file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("metafield").join("config.yaml"))
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".metafield.yaml"),
            PathBuf::from(".metafield.yml"),
            PathBuf::from(".metafield.json"),
            PathBuf::from(".metafield.toml"),
        ];

        if let Some(path) = Self::user_config_path() {
            paths.push(path);
        }

        paths
    }

    /// Template resolver configured by the `resolver` section
    pub fn template_resolver(&self) -> FieldTemplateResolver {
        FieldTemplateResolver::new().with_na_placeholder(self.resolver.na_placeholder.clone())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match FileFormat::from_path(path) {
            FileFormat::Yaml => serde_yaml::to_string(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_config(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.rules.is_empty());
        assert_eq!(config.resolver.na_placeholder, "NA");
        assert_eq!(config.output.format, OutputFormat::Human);
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_load_yaml_rules() {
        let file = temp_config(
            ".yaml",
            r#"
rules:
  - action: interpret
    from: title
    to: "%(artist)s - %(track)s"
  - action: replace
    field: artist
    search: '\s+'
    replace: _
resolver:
  na_placeholder: "?"
"#,
        );

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(
            config.rules,
            vec![
                RuleSpec::interpret("title", "%(artist)s - %(track)s"),
                RuleSpec::replace("artist", r"\s+", "_"),
            ]
        );
        assert_eq!(config.resolver.na_placeholder, "?");
        // Untouched sections keep their defaults
        assert!(config.output.progress);
    }

    #[test]
    fn test_load_toml() {
        let file = temp_config(
            ".toml",
            r#"
[output]
format = "json-pretty"
color = false

[logging]
level = "debug"

[[rules]]
action = "replace"
field = "title"
search = "(?i)\\s*\\(official video\\)"
replace = ""
"#,
        );

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.output.format, OutputFormat::JsonPretty);
        assert!(!config.output.color);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.rules.len(), 1);
    }

    #[test]
    fn test_load_json() {
        let file = temp_config(
            ".json",
            r#"{"rules": [{"action": "interpret", "from": "%(title)s", "to": "%(n)s"}]}"#,
        );
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.rules, vec![RuleSpec::interpret("%(title)s", "%(n)s")]);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let file = temp_config(".yaml", "rules:\n  - action: delete\n    field: title\n");
        assert!(matches!(Config::from_file(file.path()), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_action_tag_is_case_insensitive() {
        let file = temp_config(
            ".yaml",
            "rules:\n  - action: Interpret\n    from: title\n    to: \"%(n)s\"\n",
        );
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.rules, vec![RuleSpec::interpret("title", "%(n)s")]);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            rules: vec![RuleSpec::from_title("%(artist)s - %(track)s")],
            ..Config::default()
        };

        for name in ["config.yaml", "config.json", "config.toml"] {
            let path = dir.path().join("nested").join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config, "{}", name);
        }
    }

    #[test]
    fn test_template_resolver_uses_placeholder() {
        use metafield_core::{Record, TemplateResolver};

        let mut config = Config::default();
        config.resolver.na_placeholder = "unknown".to_string();
        let resolver = config.template_resolver();
        assert_eq!(resolver.na_placeholder(), "unknown");
        assert_eq!(resolver.resolve("%(missing)s", &Record::new()), "unknown");
    }
}
