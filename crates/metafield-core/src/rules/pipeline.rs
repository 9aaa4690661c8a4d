//! Rule pipeline implementation
//!
//! This module applies an ordered set of compiled rules to records. Rules run
//! strictly in construction order and each one sees the writes of the rules
//! before it. A rule that cannot act on a record reports a warning and the
//! pipeline moves on; nothing is rolled back.
//!
//! Copyright (c) 2025 Metafield Team
//! Licensed under the Apache-2.0 license

use super::rule::Rule;
use super::types::RuleSpec;
use crate::error::Result;
use crate::notice::{NoticeSink, TracingSink};
use crate::record::Record;
use crate::template::{FieldTemplateResolver, TemplateResolver};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Counters from one pipeline pass over a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Number of rules run
    pub rules_applied: usize,
    /// Number of warning notices reported
    pub warnings: usize,
    /// Number of field assignments made
    pub fields_written: usize,
}

impl PipelineStats {
    fn merge(&mut self, other: PipelineStats) {
        self.rules_applied += other.rules_applied;
        self.warnings += other.warnings;
        self.fields_written += other.fields_written;
    }
}

/// An ordered list of compiled rules plus the adapters they report through
#[derive(Clone)]
pub struct MetadataPipeline {
    rules: Vec<Rule>,
    resolver: Arc<dyn TemplateResolver>,
    sink: Arc<dyn NoticeSink>,
}

impl MetadataPipeline {
    /// Compile every spec, failing on the first invalid one
    pub fn new<I>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = RuleSpec>,
    {
        let rules = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Rule::compile(&spec).map_err(|e| e.at_rule(index)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(rules = rules.len(), "Compiled metadata rules");
        Ok(Self::from_rules(rules))
    }

    /// Wrap already compiled rules
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            resolver: Arc::new(FieldTemplateResolver::new()),
            sink: Arc::new(TracingSink),
        }
    }

    /// Resolve INTERPRET sources with a host-supplied resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn TemplateResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Report notices to a host-supplied sink
    pub fn with_sink(mut self, sink: Arc<dyn NoticeSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule to `record` in order
    pub fn apply(&self, record: &mut Record) -> PipelineStats {
        let span = tracing::debug_span!("metadata_pipeline", rules = self.rules.len());
        let _guard = span.enter();

        let mut stats = PipelineStats::default();
        for rule in &self.rules {
            let outcome = rule.apply(record, self.resolver.as_ref());
            stats.rules_applied += 1;
            stats.fields_written += outcome.written.len();
            stats.warnings += outcome.warning_count();

            for notice in &outcome.notices {
                self.sink.report(notice);
            }
        }
        stats
    }

    /// Apply every rule and hand the record back
    pub fn run(&self, mut record: Record) -> Record {
        self.apply(&mut record);
        record
    }

    /// Run many records, each independently
    pub fn run_batch<I>(&self, records: I) -> (Vec<Record>, PipelineStats)
    where
        I: IntoIterator<Item = Record>,
    {
        let mut total = PipelineStats::default();
        let records = records
            .into_iter()
            .map(|mut record| {
                total.merge(self.apply(&mut record));
                record
            })
            .collect();
        (records, total)
    }
}

impl fmt::Debug for MetadataPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataPipeline")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
