//! Reading and writing metadata records
//!
//! Records arrive as a single JSON object, a JSON array of objects, a JSON
//! lines stream, or the YAML equivalents. The layout of the input is kept so
//! the output can be written back the same way.

use crate::cli::OutputFormat;
use crate::config::FileFormat;
use crate::error::{Error, Result};
use crate::output::OutputFormatter;
use metafield_core::Record;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

/// How the records were laid out in their source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// One object
    Single,
    /// A list of objects
    Array,
    /// One JSON object per line
    Lines,
}

/// Records read from one source
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    pub records: Vec<Record>,
    pub shape: RecordShape,
}

impl RecordBatch {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Self {
                records: items
                    .into_iter()
                    .map(Record::try_from)
                    .collect::<metafield_core::Result<Vec<_>>>()?,
                shape: RecordShape::Array,
            }),
            other => Ok(Self {
                records: vec![Record::try_from(other)?],
                shape: RecordShape::Single,
            }),
        }
    }

    fn from_lines(content: &str) -> Result<Self> {
        let records = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| -> Result<Record> {
                let value: Value = serde_json::from_str(line)?;
                Ok(Record::try_from(value)?)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            records,
            shape: RecordShape::Lines,
        })
    }
}

/// Parse records from text
///
/// With no format hint, JSON is tried first, then JSON lines, then YAML.
pub fn parse_records(content: &str, format: Option<FileFormat>) -> Result<RecordBatch> {
    match format {
        Some(FileFormat::Yaml) => RecordBatch::from_value(serde_yaml::from_str(content)?),
        Some(FileFormat::Toml) => Err(Error::invalid_args(
            "records cannot be read from TOML; use JSON or YAML",
        )),
        Some(FileFormat::Json) => match serde_json::from_str::<Value>(content) {
            Ok(value) => RecordBatch::from_value(value),
            Err(e) if content.trim().lines().count() > 1 => {
                tracing::debug!("Not a single JSON document ({}), trying JSON lines", e);
                RecordBatch::from_lines(content)
            }
            Err(e) => Err(e.into()),
        },
        None => parse_records(content, Some(FileFormat::Json)).or_else(|json_err| {
            tracing::debug!("Not JSON ({}), trying YAML", json_err);
            serde_yaml::from_str::<Value>(content)
                .map_err(|_| json_err)
                .and_then(RecordBatch::from_value)
        }),
    }
}

/// Read records from a file, or from stdin when no path is given
pub fn read_records(path: Option<&Path>) -> Result<RecordBatch> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            let content = std::fs::read_to_string(path)?;
            let format = path.extension().map(|_| FileFormat::from_path(path));
            parse_records(&content, format).map_err(|e| match e {
                Error::Json(_) | Error::Yaml(_) => Error::InvalidFormat {
                    path: path.to_path_buf(),
                    expected: format!("JSON or YAML records ({})", e),
                },
                other => other,
            })
        }
        None => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            parse_records(&content, None)
        }
    }
}

/// Render records in the given output format, keeping the input layout
pub fn render_records(batch: &RecordBatch, format: OutputFormat) -> Result<String> {
    match (batch.shape, format) {
        (RecordShape::Single, _) if batch.records.len() == 1 => format.format(&batch.records[0]),
        (RecordShape::Lines, OutputFormat::Json) => {
            let mut out = String::new();
            for record in &batch.records {
                out.push_str(&serde_json::to_string(record)?);
                out.push('\n');
            }
            Ok(out)
        }
        _ => format.format(&batch.records),
    }
}

/// Write records to a file, picking the format from its extension
pub fn save_records(path: &Path, batch: &RecordBatch) -> Result<()> {
    let format = match FileFormat::from_path(path) {
        FileFormat::Yaml => OutputFormat::Yaml,
        FileFormat::Json if batch.shape == RecordShape::Lines => OutputFormat::Json,
        FileFormat::Json => OutputFormat::JsonPretty,
        FileFormat::Toml => {
            return Err(Error::InvalidFormat {
                path: PathBuf::from(path),
                expected: "a .json, .jsonl or .yaml extension".to_string(),
            })
        }
    };

    let mut content = render_records(batch, format)?;
    if !content.ends_with('\n') {
        content.push('\n');
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
