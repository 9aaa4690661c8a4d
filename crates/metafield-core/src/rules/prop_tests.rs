//! Property-based tests for pattern compilation and rule application
//!
//! These tests verify that literal text survives escaping, that placeholders
//! become exactly the expected groups, and that rules are idempotent where
//! they should be.

use super::pattern::{format_to_regex, CompiledPattern};
use super::types::RuleSpec;
use super::MetadataPipeline;
use crate::notice::CollectingSink;
use crate::record::Record;
use proptest::prelude::*;
use std::sync::Arc;

/// Literal runs full of regex metacharacters, never forming a placeholder
fn literal_strategy() -> impl Strategy<Value = String> {
    r"[ \-\[\]().*+?^$|{}/:\\#&~]{1,6}"
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}"
}

fn quiet_pipeline(specs: Vec<RuleSpec>) -> MetadataPipeline {
    MetadataPipeline::new(specs)
        .unwrap()
        .with_sink(Arc::new(CollectingSink::new()))
}

proptest! {
    /// Property: placeholders become exactly the named groups, in source order
    #[test]
    fn prop_groups_follow_placeholders(
        names in proptest::collection::hash_set(name_strategy(), 1..5),
        literals in proptest::collection::vec(literal_strategy(), 6),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let mut template = String::new();
        for (i, name) in names.iter().enumerate() {
            template.push_str(&literals[i]);
            template.push_str(&format!("%({})s", name));
        }
        template.push_str(&literals[5]);

        let pattern = CompiledPattern::compile(&template).unwrap();
        prop_assert_eq!(pattern.group_names(), names.as_slice());
    }

    /// Property: literal text is matched exactly, metacharacters included
    #[test]
    fn prop_literal_prefix_matches_itself(
        prefix in literal_strategy(),
        suffix in literal_strategy(),
        value in "[a-zA-Z0-9]{1,12}",
    ) {
        let template = format!("{}%(value)s{}", prefix, suffix);
        let pattern = CompiledPattern::compile(&template).unwrap();

        let text = format!("{}{}{}", prefix, value, suffix);
        let caps = pattern.regex().captures(&text).unwrap();
        prop_assert_eq!(caps.get(0).unwrap().as_str(), text.as_str());
        prop_assert_eq!(caps.get(0).unwrap().start(), 0);

        // Dropping the literal suffix must make the match fail
        let truncated = format!("{}{}", prefix, value);
        prop_assert!(pattern.regex().captures(&truncated).is_none());
    }

    /// Property: templates without placeholders are passed through untouched
    #[test]
    fn prop_no_placeholder_is_identity(template in r"[a-z0-9 .*+?()\[\]\-]{0,20}") {
        prop_assume!(!template.chars().all(|c| c.is_ascii_alphabetic() || c == '_'));
        prop_assert_eq!(format_to_regex(&template).unwrap(), template);
    }

    /// Property: running INTERPRET twice assigns the same fields
    #[test]
    fn prop_interpret_idempotent(
        artist in "[A-Za-z0-9]{1,10}",
        track in "[A-Za-z0-9 ]{1,10}",
    ) {
        let pipeline = quiet_pipeline(vec![
            RuleSpec::interpret("title", "%(artist)s - %(track)s"),
        ]);
        let mut record = Record::new();
        record.insert("title", format!("{} - {}", artist, track));

        let once = pipeline.run(record);
        let twice = pipeline.run(once.clone());
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.get_str("artist"), Some(artist.as_str()));
    }

    /// Property: once the pattern no longer matches, REPLACE is a no-op
    #[test]
    fn prop_replace_idempotent_after_exhaustion(
        text in "[abxyz ]{0,30}",
        needle in "[ab]{1,3}",
        replacement in "[xyz]{0,3}",
    ) {
        let pipeline = quiet_pipeline(vec![
            RuleSpec::replace("title", regex::escape(&needle), replacement),
        ]);
        let mut record = Record::new();
        record.insert("title", text);

        let once = pipeline.run(record);
        let after = once.get_str("title").unwrap().to_string();
        prop_assume!(!after.contains(&needle));

        let twice = pipeline.run(once.clone());
        prop_assert_eq!(twice.get_str("title"), Some(after.as_str()));
    }
}
