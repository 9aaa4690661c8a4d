//! Compiled rules
//!
//! A [`Rule`] is a [`RuleSpec`] whose patterns have been compiled. Applying a
//! rule mutates the record in place and returns the notices it produced; it
//! never fails.
//!
//! Copyright (c) 2025 Metafield Team
//! Licensed under the Apache-2.0 license

use super::pattern::CompiledPattern;
use super::types::{ActionKind, RuleSpec};
use crate::error::{Error, Result};
use crate::notice::Notice;
use crate::record::{value_type_name, Record};
use crate::template::{field_to_template, TemplateResolver};
use regex::Regex;
use serde_json::Value;

/// What applying one rule to one record produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    pub notices: Vec<Notice>,
    /// Fields assigned, in assignment order
    pub written: Vec<String>,
}

impl RuleOutcome {
    fn warning(message: String) -> Self {
        Self {
            notices: vec![Notice::warning(message)],
            written: Vec::new(),
        }
    }

    pub fn warning_count(&self) -> usize {
        self.notices.iter().filter(|n| n.is_warning()).count()
    }
}

/// Parse fields out of a resolved template
#[derive(Debug, Clone)]
pub struct InterpretRule {
    /// Source as written by the user
    source: String,
    /// Source expanded to a template
    template: String,
    pattern: CompiledPattern,
}

impl InterpretRule {
    pub fn new(from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            source: from.to_string(),
            template: field_to_template(from).into_owned(),
            pattern: CompiledPattern::compile(to)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn apply(&self, record: &mut Record, resolver: &dyn TemplateResolver) -> RuleOutcome {
        let data = resolver.resolve(&self.template, record);
        let mut outcome = RuleOutcome::default();
        outcome.notices.push(Notice::debug(format!(
            "Searching for r{:?} in {:?}",
            self.pattern.as_str(),
            self.template
        )));

        let Some(captures) = self.pattern.captures(&data) else {
            outcome.notices.push(Notice::warning(format!(
                "Could not interpret {:?} as {:?}",
                self.source,
                self.pattern.format()
            )));
            return outcome;
        };

        for (field, captured) in captures {
            let shown = captured.filter(|v| !v.is_empty()).unwrap_or("NA");
            outcome.notices.push(Notice::info(format!(
                "Parsed {} from {:?}: {:?}",
                field, self.template, shown
            )));
            match captured {
                Some(text) => record.insert(field, text),
                None => record.insert(field, Value::Null),
            };
            outcome.written.push(field.to_string());
        }
        outcome
    }
}

/// Regex substitution within one text field
///
/// The replacement uses backslash group references: `\1` or `\g<name>`
/// insert a capture, `\n` and friends are the usual escapes, and `$` is
/// literal.
#[derive(Debug, Clone)]
pub struct ReplaceRule {
    field: String,
    search: Regex,
    /// Replacement as written by the user
    replacement: String,
    /// Replacement rewritten for [`regex::Captures::expand`]
    expansion: String,
}

impl ReplaceRule {
    pub fn new(field: &str, search: &str, replacement: &str) -> Result<Self> {
        let search = Regex::new(search).map_err(|source| Error::Pattern {
            pattern: search.to_string(),
            source,
        })?;
        let expansion = to_expansion(replacement, &search)?;
        Ok(Self {
            field: field.to_string(),
            search,
            replacement: replacement.to_string(),
            expansion,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn search(&self) -> &Regex {
        &self.search
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace every match in `text`, returning the result and the match count
    ///
    /// An empty match is skipped only where the previous match was also
    /// empty, so `x*` on `"abxd"` also matches the empty string after `x`.
    pub fn substitute(&self, text: &str) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut count = 0;
        let mut copied = 0;
        let mut at = 0;
        let mut last_empty = None;

        while at <= text.len() {
            let Some(caps) = self.search.captures_at(text, at) else {
                break;
            };
            let Some(m) = caps.get(0) else {
                break;
            };

            if m.is_empty() && last_empty == Some(m.start()) {
                match text[m.start()..].chars().next() {
                    Some(c) => {
                        at = m.start() + c.len_utf8();
                        continue;
                    }
                    None => break,
                }
            }

            out.push_str(&text[copied..m.start()]);
            caps.expand(&self.expansion, &mut out);
            count += 1;
            copied = m.end();
            at = m.end();
            last_empty = m.is_empty().then_some(m.end());
        }

        out.push_str(&text[copied..]);
        (out, count)
    }

    pub fn apply(&self, record: &mut Record) -> RuleOutcome {
        let text = match record.get(&self.field) {
            None => {
                return RuleOutcome::warning(format!("Record does not have a {}", self.field))
            }
            Some(Value::String(text)) => text.clone(),
            Some(other) => {
                return RuleOutcome::warning(format!(
                    "Cannot replace in field {} since it is a {}",
                    self.field,
                    value_type_name(other)
                ))
            }
        };

        let mut notices = vec![Notice::debug(format!(
            "Replacing all r{:?} in {} with {:?}",
            self.search.as_str(),
            self.field,
            self.replacement
        ))];

        let (replaced, count) = self.substitute(&text);
        if count > 0 {
            notices.push(Notice::info(format!("Changed {} to: {}", self.field, replaced)));
        } else {
            notices.push(Notice::info(format!(
                "Did not find r{:?} in {}",
                self.search.as_str(),
                self.field
            )));
        }
        record.insert(self.field.clone(), replaced);
        RuleOutcome {
            notices,
            written: vec![self.field.clone()],
        }
    }
}

/// Rewrite a backslash-style replacement into `$`-style expansion syntax
///
/// Group references are checked against `search`. Escapes of other ASCII
/// letters are rejected; any other escaped character is kept with its
/// backslash.
fn to_expansion(replacement: &str, search: &Regex) -> Result<String> {
    let invalid = |reason: String| Error::Replacement {
        replacement: replacement.to_string(),
        reason,
    };

    let group = |reference: &str, out: &mut String| -> Result<()> {
        let known = match reference.parse::<usize>() {
            Ok(index) => index < search.captures_len(),
            Err(_) => search.capture_names().flatten().any(|name| name == reference),
        };
        if !known {
            return Err(invalid(format!("unknown group {:?}", reference)));
        }
        out.push_str("${");
        out.push_str(reference);
        out.push('}');
        Ok(())
    };

    let octal = |digits: &str, out: &mut String| -> Result<()> {
        let byte = u8::from_str_radix(digits, 8)
            .map_err(|_| invalid(format!("octal escape \\{} is out of range", digits)))?;
        match char::from(byte) {
            '$' => out.push_str("$$"),
            c => out.push(c),
        }
        Ok(())
    };

    let is_octal = |c: &char| ('0'..='7').contains(c);

    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' {
            out.push_str("$$");
            continue;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(escaped) = chars.next() else {
            return Err(invalid("trailing backslash".to_string()));
        };
        match escaped {
            'g' => {
                if chars.next() != Some('<') {
                    return Err(invalid("missing '<' after \\g".to_string()));
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('>') => break,
                        Some(c) => name.push(c),
                        None => return Err(invalid(format!("unterminated group name {:?}", name))),
                    }
                }
                if name.is_empty() {
                    return Err(invalid("empty group name".to_string()));
                }
                group(&name, &mut out)?;
            }
            '0' => {
                let mut digits = String::from('0');
                while digits.len() < 3 {
                    match chars.next_if(is_octal) {
                        Some(d) => digits.push(d),
                        None => break,
                    }
                }
                octal(&digits, &mut out)?;
            }
            '1'..='9' => {
                let mut digits = String::from(escaped);
                if let Some(second) = chars.next_if(char::is_ascii_digit) {
                    digits.push(second);
                    if is_octal(&escaped) && is_octal(&second) {
                        if let Some(third) = chars.next_if(is_octal) {
                            digits.push(third);
                            octal(&digits, &mut out)?;
                            continue;
                        }
                    }
                }
                group(&digits, &mut out)?;
            }
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '\\' => out.push('\\'),
            c if c.is_ascii_alphabetic() => {
                return Err(invalid(format!("bad escape \\{}", c)));
            }
            '$' => out.push_str("\\$$"),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    Ok(out)
}

/// One compiled transformation step
#[derive(Debug, Clone)]
pub enum Rule {
    Interpret(InterpretRule),
    Replace(ReplaceRule),
}

impl Rule {
    /// Validate and compile a spec
    pub fn compile(spec: &RuleSpec) -> Result<Self> {
        match spec {
            RuleSpec::Interpret { from, to } => InterpretRule::new(from, to).map(Rule::Interpret),
            RuleSpec::Replace {
                field,
                search,
                replace,
            } => ReplaceRule::new(field, search, replace).map(Rule::Replace),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Rule::Interpret(_) => ActionKind::Interpret,
            Rule::Replace(_) => ActionKind::Replace,
        }
    }

    /// The compiled pattern text this rule matches with
    pub fn pattern(&self) -> &str {
        match self {
            Rule::Interpret(rule) => rule.pattern.as_str(),
            Rule::Replace(rule) => rule.search.as_str(),
        }
    }

    /// Recover the spec this rule was compiled from
    pub fn spec(&self) -> RuleSpec {
        match self {
            Rule::Interpret(rule) => RuleSpec::interpret(&rule.source, rule.pattern.format()),
            Rule::Replace(rule) => {
                RuleSpec::replace(&rule.field, rule.search.as_str(), &rule.replacement)
            }
        }
    }

    /// Apply to a record, returning the notices produced
    pub fn apply(&self, record: &mut Record, resolver: &dyn TemplateResolver) -> RuleOutcome {
        match self {
            Rule::Interpret(rule) => rule.apply(record, resolver),
            Rule::Replace(rule) => rule.apply(record),
        }
    }
}

impl TryFrom<&RuleSpec> for Rule {
    type Error = Error;

    fn try_from(spec: &RuleSpec) -> Result<Self> {
        Rule::compile(spec)
    }
}
