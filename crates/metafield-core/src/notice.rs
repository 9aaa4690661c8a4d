//! Notices emitted while rules are applied
//!
//! Rules never fail on a record. Anything worth telling the user (a field was
//! parsed, a pattern did not match, a field has the wrong type) becomes a
//! [`Notice`] handed to the host through a [`NoticeSink`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Diagnostic detail, only interesting when debugging a rule set
    Debug,
    /// A field was written or left as is
    Info,
    /// The rule could not do its job for this record
    Warning,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Debug => write!(f, "debug"),
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Warning => write!(f, "warning"),
        }
    }
}

/// A message produced by one rule invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn debug(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Debug,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.level == NoticeLevel::Warning
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

/// Host-supplied reporting surface for notices
///
/// Implementations must tolerate being called from several threads when a
/// pipeline is shared across workers.
pub trait NoticeSink: Send + Sync {
    fn report(&self, notice: &Notice);
}

/// Routes notices to `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NoticeSink for TracingSink {
    fn report(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Debug => tracing::debug!(target: "metafield::rules", "{}", notice.message),
            NoticeLevel::Info => tracing::info!(target: "metafield::rules", "{}", notice.message),
            NoticeLevel::Warning => tracing::warn!(target: "metafield::rules", "{}", notice.message),
        }
    }
}

/// Keeps every notice in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn notices(&self) -> Vec<Notice> {
        self.lock().clone()
    }

    /// Snapshot of warning-level notices only
    pub fn warnings(&self) -> Vec<Notice> {
        self.lock().iter().filter(|n| n.is_warning()).cloned().collect()
    }

    /// Drain the collected notices
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notice>> {
        // Vec::push never leaves the list half-written, so poisoning is recoverable
        self.notices.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NoticeSink for CollectingSink {
    fn report(&self, notice: &Notice) {
        self.lock().push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(NoticeLevel::Debug < NoticeLevel::Info);
        assert!(NoticeLevel::Info < NoticeLevel::Warning);
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        sink.report(&Notice::info("parsed"));
        sink.report(&Notice::warning("missing"));

        assert_eq!(sink.notices().len(), 2);
        assert_eq!(sink.warnings(), vec![Notice::warning("missing")]);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.notices().is_empty());
    }

    #[test]
    fn test_notice_display() {
        assert_eq!(Notice::warning("no title").to_string(), "warning: no title");
    }
}
