//! Metafield Core - Rule engine for interpreting and rewriting media metadata
//!
//! This crate takes a record of named fields describing a media item and
//! applies an ordered list of user rules to it: INTERPRET rules parse new
//! fields out of existing ones using `%(name)s` formats, REPLACE rules run
//! regex substitutions on text fields.
//!
//! # Main Components
//!
//! - **Error Handling**: Construction-time error types using `thiserror`
//! - **Records**: The field map rules read and write
//! - **Templates**: The resolver seam used to build the text INTERPRET matches
//! - **Notices**: Non-fatal per-record reports routed to a host sink
//! - **Rules**: Pattern compilation, rule application and the pipeline
//!
//! # Example
//!
//! ```
//! use metafield_core::{MetadataPipeline, Record, RuleSpec};
//! use serde_json::json;
//!
//! let pipeline = MetadataPipeline::new([
//!     RuleSpec::interpret("title", "%(artist)s - %(track)s"),
//!     RuleSpec::replace("description", "foo", "baz"),
//! ])
//! .unwrap();
//!
//! let record = Record::try_from(json!({
//!     "title": "Artist - Song",
//!     "description": "foo bar foo",
//! }))
//! .unwrap();
//!
//! let record = pipeline.run(record);
//! assert_eq!(record.get_str("artist"), Some("Artist"));
//! assert_eq!(record.get_str("description"), Some("baz bar baz"));
//! ```

pub mod error;
pub mod notice;
pub mod record;
pub mod rules;
pub mod template;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use notice::{CollectingSink, Notice, NoticeLevel, NoticeSink, TracingSink};
pub use record::{value_type_name, Record};
pub use rules::{
    ActionKind, CompiledPattern, InterpretRule, MetadataPipeline, PipelineBuilder, PipelineStats,
    ReplaceRule, Rule, RuleOutcome, RuleSpec,
};
pub use template::{field_to_template, FieldTemplateResolver, TemplateResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
