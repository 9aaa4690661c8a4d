//! Format-string to pattern compilation
//!
//! Converts a template such as `%(artist)s - %(title)s` into the regular
//! expression `(?P<artist>.+) \- (?P<title>.+)`: literal runs are escaped and
//! each placeholder becomes a greedy named group. Templates without any
//! placeholder are taken to be a ready-made pattern and used as is.
//!
//! Copyright (c) 2025 Metafield Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::template::{field_to_template, parse_placeholder};
use regex::Regex;
use std::collections::HashSet;

/// A piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text that must match itself
    Literal(&'a str),
    /// A `%(name)s` placeholder
    Placeholder(&'a str),
}

/// Split a template into literal runs and placeholders, in source order
pub fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = template[cursor..].find('%') {
        let pos = cursor + offset;
        match parse_placeholder(&template[pos..]) {
            Some((name, consumed)) => {
                if pos > literal_start {
                    out.push(Segment::Literal(&template[literal_start..pos]));
                }
                out.push(Segment::Placeholder(name));
                cursor = pos + consumed;
                literal_start = cursor;
            }
            None => cursor = pos + 1,
        }
    }

    if literal_start < template.len() {
        out.push(Segment::Literal(&template[literal_start..]));
    }
    out
}

/// Translate a template into pattern text without compiling it
///
/// Bare field names are expanded first. Returns the template unchanged when it
/// contains no placeholder.
pub fn format_to_regex(template: &str) -> Result<String> {
    let template = field_to_template(template);
    let parts = segments(&template);

    if !parts.iter().any(|s| matches!(s, Segment::Placeholder(_))) {
        return Ok(template.into_owned());
    }

    let mut seen = HashSet::new();
    let mut regex = String::with_capacity(template.len() * 2);
    for part in parts {
        match part {
            Segment::Literal(text) => regex.push_str(&regex::escape(text)),
            Segment::Placeholder(name) => {
                if !seen.insert(name) {
                    return Err(Error::DuplicateGroup {
                        name: name.to_string(),
                        template: template.to_string(),
                    });
                }
                regex.push_str(&format!("(?P<{}>.+)", name));
            }
        }
    }
    Ok(regex)
}

/// A target format compiled once and reused for every record
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    format: String,
    regex: Regex,
    groups: Vec<String>,
}

impl CompiledPattern {
    /// Compile a target format
    pub fn compile(format: &str) -> Result<Self> {
        let pattern = format_to_regex(format)?;
        let regex = Regex::new(&pattern).map_err(|source| Error::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        let groups = regex
            .capture_names()
            .flatten()
            .map(str::to_string)
            .collect();

        Ok(Self {
            format: format.to_string(),
            regex,
            groups,
        })
    }

    /// The format this pattern was compiled from
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The generated pattern text
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Named groups in the order they appear in the pattern
    pub fn group_names(&self) -> &[String] {
        &self.groups
    }

    /// Search anywhere in `text`, returning each named group's capture
    ///
    /// Groups that did not take part in the match map to `None`.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Vec<(&str, Option<&'t str>)>> {
        let caps = self.regex.captures(text)?;
        Some(
            self.groups
                .iter()
                .map(|name| (name.as_str(), caps.name(name).map(|m| m.as_str())))
                .collect(),
        )
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format && self.as_str() == other.as_str()
    }
}
