//! Builder for creating metadata pipelines
//!
//! This module provides a fluent builder API for assembling a rule set from
//! explicit specs and `FROM:TO` shorthands. Nothing is compiled until
//! [`PipelineBuilder::build`] is called.
//!
//! Copyright (c) 2025 Metafield Team
//! Licensed under the Apache-2.0 license

use super::pipeline::MetadataPipeline;
use super::types::RuleSpec;
use crate::error::Result;
use crate::notice::NoticeSink;
use crate::template::TemplateResolver;
use std::sync::Arc;

enum Pending {
    Spec(RuleSpec),
    Shorthand(String),
}

/// Builder for creating metadata pipelines
#[derive(Default)]
pub struct PipelineBuilder {
    rules: Vec<Pending>,
    resolver: Option<Arc<dyn TemplateResolver>>,
    sink: Option<Arc<dyn NoticeSink>>,
}

impl PipelineBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an INTERPRET rule
    pub fn interpret(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.spec(RuleSpec::interpret(from, to))
    }

    /// Append a REPLACE rule
    pub fn replace(
        self,
        field: impl Into<String>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        self.spec(RuleSpec::replace(field, search, replace))
    }

    /// Append a `FROM:TO` shorthand, parsed at build time
    pub fn shorthand(mut self, spec: impl Into<String>) -> Self {
        self.rules.push(Pending::Shorthand(spec.into()));
        self
    }

    /// Append a spec
    pub fn spec(mut self, spec: RuleSpec) -> Self {
        self.rules.push(Pending::Spec(spec));
        self
    }

    /// Append several specs
    pub fn specs<I>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = RuleSpec>,
    {
        self.rules.extend(specs.into_iter().map(Pending::Spec));
        self
    }

    /// Set the template resolver
    pub fn resolver(mut self, resolver: Arc<dyn TemplateResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Set the notice sink
    pub fn sink(mut self, sink: Arc<dyn NoticeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<MetadataPipeline> {
        let specs = self
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, pending)| match pending {
                Pending::Spec(spec) => Ok(spec),
                Pending::Shorthand(raw) => raw.parse::<RuleSpec>().map_err(|e| e.at_rule(index)),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut pipeline = MetadataPipeline::new(specs)?;
        if let Some(resolver) = self.resolver {
            pipeline = pipeline.with_resolver(resolver);
        }
        if let Some(sink) = self.sink {
            pipeline = pipeline.with_sink(sink);
        }
        Ok(pipeline)
    }
}
