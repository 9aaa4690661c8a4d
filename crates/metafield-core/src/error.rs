//! Error types for the metafield core library
//!
//! Every error in this module is a construction-time error: it is raised while
//! a rule set is being validated and compiled, never while a record is being
//! processed. Per-record problems are reported as notices instead
//! (see [`crate::notice`]).

use thiserror::Error;

/// Main error type for metafield operations
#[derive(Error, Debug)]
pub enum Error {
    /// The rule kind tag is not one of the known actions
    #[error("Unknown action '{action}': expected one of interpret, replace")]
    UnknownAction { action: String },

    /// A rule kind was given the wrong number of arguments
    #[error("Invalid arguments for {action} action: expected {expected}, got {found}")]
    InvalidArguments {
        action: String,
        expected: usize,
        found: usize,
    },

    /// A tagged rule spec is missing one of its kind's arguments
    #[error("Missing '{name}' for {action} action")]
    MissingArgument { action: String, name: &'static str },

    /// A `FROM:TO` shorthand without an unescaped colon
    #[error("Invalid field specification: it should be FROM:TO, not {spec:?}")]
    MalformedShorthand { spec: String },

    /// The same placeholder appears twice in one template
    #[error("Duplicate capture group '{name}' in template {template:?}")]
    DuplicateGroup { name: String, template: String },

    /// Regular expression failed to compile
    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// REPLACE replacement text with a bad escape or group reference
    #[error("Invalid replacement {replacement:?}: {reason}")]
    Replacement { replacement: String, reason: String },

    /// A rule in an ordered rule set failed to compile
    #[error("Rule #{index} is invalid: {source}")]
    InvalidRule {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// Input could not be treated as a record
    #[error("Invalid record: expected an object, found {found}")]
    InvalidRecord { found: String },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an error with the position of the rule that produced it
    pub fn at_rule(self, index: usize) -> Self {
        Error::InvalidRule {
            index,
            source: Box::new(self),
        }
    }

    /// Get the innermost error, skipping rule position wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::InvalidRule { source, .. } => source.root(),
            other => other,
        }
    }
}
