//! Metadata rule engine
//!
//! This module compiles user-supplied rule specifications once and applies
//! them, in order, to metadata records. Two kinds of rule exist: INTERPRET
//! parses fields out of a template with a placeholder format, REPLACE runs a
//! regex substitution on one text field.
//!
//! # Module Organization
//!
//! - [`types`] - Rule specifications and action kinds
//! - [`pattern`] - Format string to regex compilation
//! - [`rule`] - Compiled rules and their application
//! - [`pipeline`] - Ordered application to records
//! - [`builder`] - Fluent builder API for pipelines
//!
//! # Examples
//!
//! ```
//! use metafield_core::{PipelineBuilder, Record};
//! use serde_json::json;
//!
//! let pipeline = PipelineBuilder::new()
//!     .shorthand("title:%(artist)s - %(track)s")
//!     .replace("artist", r"\s+", " ")
//!     .build()
//!     .unwrap();
//!
//! let record = Record::try_from(json!({"title": "Some   Band - Song"})).unwrap();
//! let record = pipeline.run(record);
//!
//! assert_eq!(record.get_str("artist"), Some("Some Band"));
//! assert_eq!(record.get_str("track"), Some("Song"));
//! ```
//!
//! Copyright (c) 2025 Metafield Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod pattern;
pub mod pipeline;
pub mod rule;
pub mod types;


#[cfg(test)]
mod prop_tests;

pub use builder::PipelineBuilder;
pub use pattern::{format_to_regex, CompiledPattern};
pub use pipeline::{MetadataPipeline, PipelineStats};
pub use rule::{InterpretRule, ReplaceRule, Rule, RuleOutcome};
pub use types::{ActionKind, RuleSpec};
