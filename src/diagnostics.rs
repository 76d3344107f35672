// SPDX-License-Identifier: MIT
//! Caller-owned diagnostic sink for the decoders
//!
//! Failsafe decoding drops malformed subtrees instead of failing. What was
//! dropped, and why, ends up here so callers can inspect it without scraping
//! logs. Every entry is mirrored to `tracing` as well.

use std::fmt;

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Info => info!(target: "aas_adapter::decode", "{}", message),
            Severity::Warning => warn!(target: "aas_adapter::decode", "{}", message),
            Severity::Error => error!(target: "aas_adapter::decode", "{}", message),
        }
        self.entries.push(Diagnostic { severity, message });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message)
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Entries of exactly this severity
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    pub fn error_count(&self) -> usize {
        self.with_severity(Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.with_severity(Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_severity() {
        let mut diags = Diagnostics::new();
        diags.info("skipped");
        diags.warning("mismatch");
        diags.error("dropped");
        diags.error("dropped again");
        assert_eq!(diags.len(), 4);
        assert_eq!(diags.error_count(), 2);
        assert_eq!(diags.warning_count(), 1);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_display() {
        let mut diags = Diagnostics::new();
        diags.warning("type mismatch");
        let first = diags.iter().next().unwrap();
        assert_eq!(first.to_string(), "warning: type mismatch");
    }

    #[test]
    fn test_clear() {
        let mut diags = Diagnostics::new();
        diags.error("x");
        diags.clear();
        assert!(diags.is_empty());
        assert!(!diags.has_errors());
    }
}
