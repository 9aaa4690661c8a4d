//! Shared test support utilities for integration tests

#![allow(dead_code)]

use metafield_core::{CollectingSink, MetadataPipeline, Notice, Record, RuleSpec};
use serde_json::{json, Value};
use std::sync::Arc;

/// Build a record from a JSON object literal
pub fn record(value: Value) -> Record {
    Record::try_from(value).expect("test record must be a JSON object")
}

/// A record shaped like a downloaded video's info file
pub fn video_record() -> Record {
    record(json!({
        "id": "dQw4w9WgXcQ",
        "title": "Rick Astley - Never Gonna Give You Up (Official Video)",
        "uploader": "Rick Astley",
        "description": "The official video for Never Gonna Give You Up.\nListen on all platforms.",
        "duration": 213,
        "view_count": 1_500_000_000u64,
        "average_rating": 4.9,
        "is_live": false,
        "tags": ["rick astley", "never gonna give you up"],
        "album": null
    }))
}

/// Compile specs into a pipeline whose notices are collected
pub fn collecting_pipeline(specs: Vec<RuleSpec>) -> (MetadataPipeline, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let pipeline = MetadataPipeline::new(specs)
        .expect("rule set should compile")
        .with_sink(sink.clone());
    (pipeline, sink)
}

/// Messages of all warning notices
pub fn warning_messages(notices: &[Notice]) -> Vec<String> {
    notices
        .iter()
        .filter(|n| n.is_warning())
        .map(|n| n.message.clone())
        .collect()
}
