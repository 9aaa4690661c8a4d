//! Rule specifications
//!
//! A [`RuleSpec`] is the uncompiled, serializable description of one rule.
//! Specs come from code, from config files (tagged by `action`) or from the
//! `FROM:TO` command-line shorthand.
//!
//! Copyright (c) 2025 Metafield Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of rule the engine knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Parse fields out of a template with a format
    Interpret,
    /// Regex search and replace within one field
    Replace,
}

impl ActionKind {
    /// Number of arguments a spec of this kind takes
    pub fn arity(self) -> usize {
        match self {
            ActionKind::Interpret => 2,
            ActionKind::Replace => 3,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Interpret => write!(f, "interpret"),
            ActionKind::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            // legacy names
            "interpret" | "interpretter" => Ok(ActionKind::Interpret),
            "replace" | "replacer" => Ok(ActionKind::Replace),
            _ => Err(Error::UnknownAction {
                action: s.to_string(),
            }),
        }
    }
}

// Tags parse through `FromStr`: any case, legacy names included
impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let action = String::deserialize(deserializer)?;
        action.parse().map_err(de::Error::custom)
    }
}

/// Description of one rule before compilation
///
/// Serializes with a lowercase `action` tag. Deserializing accepts any tag
/// [`ActionKind`] parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase", try_from = "TaggedSpec")]
pub enum RuleSpec {
    /// Resolve `from` against the record and parse it with the `to` format
    Interpret { from: String, to: String },
    /// Replace every match of `search` in `field` with `replace`
    Replace {
        field: String,
        search: String,
        replace: String,
    },
}

impl RuleSpec {
    pub fn interpret(from: impl Into<String>, to: impl Into<String>) -> Self {
        RuleSpec::Interpret {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn replace(
        field: impl Into<String>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        RuleSpec::Replace {
            field: field.into(),
            search: search.into(),
            replace: replace.into(),
        }
    }

    /// Parse the `title` field with `format`
    pub fn from_title(format: impl Into<String>) -> Self {
        RuleSpec::interpret("title", format)
    }

    /// Build a spec from an action tag and its positional arguments
    pub fn from_parts<S: AsRef<str>>(action: &str, args: &[S]) -> Result<Self> {
        let kind: ActionKind = action.parse()?;
        if args.len() != kind.arity() {
            return Err(Error::InvalidArguments {
                action: kind.to_string(),
                expected: kind.arity(),
                found: args.len(),
            });
        }

        let arg = |i: usize| args[i].as_ref().to_string();
        Ok(match kind {
            ActionKind::Interpret => RuleSpec::Interpret {
                from: arg(0),
                to: arg(1),
            },
            ActionKind::Replace => RuleSpec::Replace {
                field: arg(0),
                search: arg(1),
                replace: arg(2),
            },
        })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            RuleSpec::Interpret { .. } => ActionKind::Interpret,
            RuleSpec::Replace { .. } => ActionKind::Replace,
        }
    }
}

/// Wire form of a [`RuleSpec`] before its arguments are checked
#[derive(Deserialize)]
struct TaggedSpec {
    action: ActionKind,
    from: Option<String>,
    to: Option<String>,
    field: Option<String>,
    search: Option<String>,
    replace: Option<String>,
}

impl TryFrom<TaggedSpec> for RuleSpec {
    type Error = Error;

    fn try_from(tagged: TaggedSpec) -> Result<Self> {
        let action = tagged.action;
        let required = |value: Option<String>, name: &'static str| {
            value.ok_or_else(|| Error::MissingArgument {
                action: action.to_string(),
                name,
            })
        };

        Ok(match action {
            ActionKind::Interpret => RuleSpec::Interpret {
                from: required(tagged.from, "from")?,
                to: required(tagged.to, "to")?,
            },
            ActionKind::Replace => RuleSpec::Replace {
                field: required(tagged.field, "field")?,
                search: required(tagged.search, "search")?,
                replace: required(tagged.replace, "replace")?,
            },
        })
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSpec::Interpret { from, to } => write!(f, "interpret {:?} as {:?}", from, to),
            RuleSpec::Replace {
                field,
                search,
                replace,
            } => write!(f, "replace {:?} with {:?} in {}", search, replace, field),
        }
    }
}

/// Parses the `FROM:TO` shorthand
///
/// The first colon that is not escaped as `\:` and leaves a non-empty `TO`
/// splits the spec. Escaped colons in `FROM` are unescaped.
///
/// ```
/// use metafield_core::RuleSpec;
///
/// let spec: RuleSpec = r"%(series)s\: %(episode)s:%(show)s".parse().unwrap();
/// assert_eq!(spec, RuleSpec::interpret("%(series)s: %(episode)s", "%(show)s"));
/// ```
impl FromStr for RuleSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let split = s
            .char_indices()
            .filter(|&(i, c)| c == ':' && !s[..i].ends_with('\\'))
            .map(|(i, _)| i)
            .find(|&i| i + 1 < s.len());

        match split {
            Some(i) => Ok(RuleSpec::Interpret {
                from: s[..i].replace("\\:", ":"),
                to: s[i + 1..].to_string(),
            }),
            None => Err(Error::MalformedShorthand { spec: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_parsing() {
        assert_eq!("interpret".parse::<ActionKind>().unwrap(), ActionKind::Interpret);
        assert_eq!("REPLACE".parse::<ActionKind>().unwrap(), ActionKind::Replace);
        assert_eq!("replacer".parse::<ActionKind>().unwrap(), ActionKind::Replace);
        assert!(matches!(
            "delete".parse::<ActionKind>(),
            Err(Error::UnknownAction { .. })
        ));
    }

    #[test]
    fn test_from_parts() {
        let spec = RuleSpec::from_parts("replace", &["title", "foo", "bar"]).unwrap();
        assert_eq!(spec, RuleSpec::replace("title", "foo", "bar"));

        let err = RuleSpec::from_parts("interpret", &["title"]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidArguments { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn test_shorthand_matches_explicit_interpret() {
        let spec: RuleSpec = "fulltitle:%(artist)s - %(title)s".parse().unwrap();
        assert_eq!(spec, RuleSpec::interpret("fulltitle", "%(artist)s - %(title)s"));
    }

    #[test]
    fn test_shorthand_target_may_contain_colons() {
        let spec: RuleSpec = "description:Artist: %(artist)s".parse().unwrap();
        assert_eq!(spec, RuleSpec::interpret("description", "Artist: %(artist)s"));
    }

    #[test]
    fn test_shorthand_empty_source_is_allowed() {
        let spec: RuleSpec = ":%(title)s".parse().unwrap();
        assert_eq!(spec, RuleSpec::interpret("", "%(title)s"));
    }

    #[test]
    fn test_shorthand_skips_colon_with_empty_target() {
        let spec: RuleSpec = "a:b:".parse().unwrap();
        assert_eq!(spec, RuleSpec::interpret("a", "b:"));
    }

    #[test]
    fn test_malformed_shorthand() {
        for bad in ["title", "title:", r"a\:b", ""] {
            assert!(
                matches!(bad.parse::<RuleSpec>(), Err(Error::MalformedShorthand { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_spec_deserializes_from_tagged_json() {
        let specs: Vec<RuleSpec> = serde_json::from_str(
            r#"[
                {"action": "interpret", "from": "title", "to": "%(artist)s - %(track)s"},
                {"action": "replace", "field": "artist", "search": "\\s+", "replace": " "}
            ]"#,
        )
        .unwrap();

        assert_eq!(specs[0].kind(), ActionKind::Interpret);
        assert_eq!(specs[1], RuleSpec::replace("artist", r"\s+", " "));
    }

    #[test]
    fn test_spec_deserializes_legacy_action_names() {
        let spec: RuleSpec = serde_json::from_str(
            r#"{"action": "replacer", "field": "title", "search": "a", "replace": "b"}"#,
        )
        .unwrap();
        assert_eq!(spec, RuleSpec::replace("title", "a", "b"));
    }

    #[test]
    fn test_spec_action_tag_ignores_case() {
        let specs: Vec<RuleSpec> = serde_json::from_str(
            r#"[
                {"action": "Interpret", "from": "title", "to": "%(track)s"},
                {"action": "REPLACE", "field": "title", "search": "a", "replace": "b"},
                {"action": "Replacer", "field": "title", "search": "c", "replace": "d"}
            ]"#,
        )
        .unwrap();

        assert_eq!(specs[0], RuleSpec::interpret("title", "%(track)s"));
        assert_eq!(specs[1], RuleSpec::replace("title", "a", "b"));
        assert_eq!(specs[2], RuleSpec::replace("title", "c", "d"));
        assert_eq!("Interpret".parse::<ActionKind>().unwrap(), specs[0].kind());
    }

    #[test]
    fn test_spec_deserialize_errors() {
        let err = serde_json::from_str::<RuleSpec>(r#"{"action": "Delete", "field": "x"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Unknown action 'Delete'"));

        let err = serde_json::from_str::<RuleSpec>(
            r#"{"action": "replace", "field": "title", "search": "a"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Missing 'replace' for replace action"));
    }

    #[test]
    fn test_spec_serializes_lowercase_tag() {
        let value = serde_json::to_value(RuleSpec::replace("title", "a", "b")).unwrap();
        assert_eq!(value["action"], "replace");
        assert_eq!(serde_json::to_value(ActionKind::Interpret).unwrap(), "interpret");
    }

    #[test]
    fn test_from_title() {
        assert_eq!(
            RuleSpec::from_title("%(artist)s - %(title)s"),
            RuleSpec::interpret("title", "%(artist)s - %(title)s")
        );
    }
}
