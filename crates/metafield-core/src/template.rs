//! Template resolution
//!
//! INTERPRET rules match against text built from a record. Building that text
//! is the host's job (it usually owns a richer output-template language), so
//! the engine only depends on the [`TemplateResolver`] trait. The
//! [`FieldTemplateResolver`] covers the plain `%(field)s` subset.

use crate::record::Record;
use serde_json::Value;
use std::borrow::Cow;

/// Default text substituted for missing fields
pub const DEFAULT_NA_PLACEHOLDER: &str = "NA";

/// Turns a template plus a record into literal text
pub trait TemplateResolver: Send + Sync {
    fn resolve(&self, template: &str, record: &Record) -> String;
}

/// Check whether `s` is a bare field name such as `title` or `album_artist`
pub fn is_field_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Expand a bare field name into a single-placeholder template
///
/// ```
/// use metafield_core::template::field_to_template;
///
/// assert_eq!(field_to_template("title"), "%(title)s");
/// assert_eq!(field_to_template("%(artist)s - %(track)s"), "%(artist)s - %(track)s");
/// ```
pub fn field_to_template(template: &str) -> Cow<'_, str> {
    if is_field_name(template) {
        Cow::Owned(format!("%({})s", template))
    } else {
        Cow::Borrowed(template)
    }
}

/// Resolver for `%(name)s` placeholders
///
/// `%%` produces a literal percent sign. Any other `%` sequence is copied
/// through untouched.
#[derive(Debug, Clone)]
pub struct FieldTemplateResolver {
    na_placeholder: String,
}

impl FieldTemplateResolver {
    pub fn new() -> Self {
        Self {
            na_placeholder: DEFAULT_NA_PLACEHOLDER.to_string(),
        }
    }

    /// Use a different placeholder for missing fields
    pub fn with_na_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.na_placeholder = placeholder.into();
        self
    }

    pub fn na_placeholder(&self) -> &str {
        &self.na_placeholder
    }

    fn render_field(&self, record: &Record, field: &str, out: &mut String) {
        match record.get(field) {
            None => out.push_str(&self.na_placeholder),
            Some(Value::String(s)) => out.push_str(s),
            Some(Value::Number(n)) => out.push_str(&n.to_string()),
            Some(Value::Bool(b)) => out.push_str(if *b { "true" } else { "false" }),
            Some(other) => out.push_str(&other.to_string()),
        }
    }
}

impl Default for FieldTemplateResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateResolver for FieldTemplateResolver {
    fn resolve(&self, template: &str, record: &Record) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("%%") {
                out.push('%');
                rest = &tail[2..];
                continue;
            }

            match parse_placeholder(tail) {
                Some((name, consumed)) => {
                    self.render_field(record, name, &mut out);
                    rest = &tail[consumed..];
                }
                None => {
                    out.push('%');
                    rest = &tail[1..];
                }
            }
        }

        out.push_str(rest);
        out
    }
}

/// Parse `%(name)s` at the start of `s`, returning the name and bytes consumed
pub(crate) fn parse_placeholder(s: &str) -> Option<(&str, usize)> {
    let inner = s.strip_prefix("%(")?;
    let close = inner.find(')')?;
    let name = &inner[..close];
    if name.is_empty() || !name.chars().all(is_word_char) {
        return None;
    }
    if !inner[close + 1..].starts_with('s') {
        return None;
    }
    // "%(" + name + ")s"
    Some((name, 2 + close + 2))
}

/// Characters allowed in placeholder names
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Record {
        Record::try_from(json!({
            "title": "Song",
            "artist": "Band",
            "track_number": 7,
            "rating": 4.5,
            "is_live": false,
            "album": null,
            "tags": ["rock", "live"]
        }))
        .unwrap()
    }

    #[test]
    fn test_field_name_detection() {
        assert!(is_field_name("title"));
        assert!(is_field_name("album_artist"));
        assert!(!is_field_name(""));
        assert!(!is_field_name("track2"));
        assert!(!is_field_name("%(title)s"));
        assert!(!is_field_name("a b"));
    }

    #[test]
    fn test_resolve_substitutes_fields() {
        let resolver = FieldTemplateResolver::new();
        assert_eq!(
            resolver.resolve("%(artist)s - %(title)s", &record()),
            "Band - Song"
        );
        assert_eq!(
            resolver.resolve("#%(track_number)s %(rating)s %(is_live)s", &record()),
            "#7 4.5 false"
        );
    }

    #[test]
    fn test_missing_and_null_fields_use_placeholder() {
        let resolver = FieldTemplateResolver::new();
        assert_eq!(resolver.na_placeholder(), DEFAULT_NA_PLACEHOLDER);
        assert_eq!(resolver.resolve("%(album)s/%(genre)s", &record()), "NA/NA");

        let resolver = resolver.with_na_placeholder("?");
        assert_eq!(resolver.na_placeholder(), "?");
        assert_eq!(resolver.resolve("%(genre)s", &record()), "?");
    }

    #[test]
    fn test_percent_handling() {
        let resolver = FieldTemplateResolver::new();
        assert_eq!(resolver.resolve("100%% %(title)s", &record()), "100% Song");
        assert_eq!(resolver.resolve("50% off %(x)d", &record()), "50% off %(x)d");
        assert_eq!(resolver.resolve("trailing %", &record()), "trailing %");
    }

    #[test]
    fn test_arrays_render_as_json() {
        let resolver = FieldTemplateResolver::new();
        assert_eq!(resolver.resolve("%(tags)s", &record()), r#"["rock","live"]"#);
    }

    #[test]
    fn test_parse_placeholder() {
        assert_eq!(parse_placeholder("%(title)s rest"), Some(("title", 9)));
        assert_eq!(parse_placeholder("%(title)d"), None);
        assert_eq!(parse_placeholder("%()s"), None);
        assert_eq!(parse_placeholder("%(a b)s"), None);
    }
}
