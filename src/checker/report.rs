//! Check report
//!
//! Findings are typed so callers can filter them; the rendered message list
//! is what operators see.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// Category of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A required column is absent; no other checks ran
    MissingColumn,
    /// eventID equals parentEventID
    SelfParent,
    /// A value fails its field's rule
    Content,
    /// A required value is absent and cannot be inherited
    MissingValue,
    /// An eventID occurs on more than one row
    DuplicateId,
    /// Column header is not a known field
    UnknownColumn,
    /// Metadata key is not a known field
    UnknownMetadataKey,
}

impl FindingKind {
    /// Whether the finding rejects the submission
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FindingKind::UnknownColumn | FindingKind::UnknownMetadataKey)
    }
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Spreadsheet row numbers involved, ascending
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<usize>,
    pub message: String,
}

impl Finding {
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            rows: Vec::new(),
            message: message.into(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_rows(mut self, rows: Vec<usize>) -> Self {
        self.rows = rows;
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of checking one submission
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    findings: Vec<Finding>,
}

impl CheckReport {
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            findings: Vec::new(),
        }
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings of one kind
    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// `good` when no finding rejects the submission
    pub fn passed(&self) -> bool {
        !self.findings.iter().any(|f| f.kind.is_fatal())
    }

    /// Rendered messages, deduplicated in first-occurrence order
    pub fn errors(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.findings
            .iter()
            .filter(|f| seen.insert(f.message.as_str()))
            .map(|f| f.message.clone())
            .collect()
    }

    /// `(passed, errors)`
    pub fn into_parts(self) -> (bool, Vec<String>) {
        (self.passed(), self.errors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_columns_are_advisory() {
        let mut report = CheckReport::default();
        report.push(Finding::new(FindingKind::UnknownColumn, "Unknown column 'x'"));
        report.push(Finding::new(FindingKind::UnknownMetadataKey, "Unknown metadata key 'y'"));
        assert!(report.passed());
        assert_eq!(report.errors().len(), 2);
    }

    #[test]
    fn test_any_fatal_finding_fails() {
        let mut report = CheckReport::default();
        report.push(Finding::new(FindingKind::DuplicateId, "Duplicate"));
        assert!(!report.passed());
    }

    #[test]
    fn test_errors_deduplicated_in_order() {
        let mut report = CheckReport::default();
        report.push(Finding::new(FindingKind::Content, "b"));
        report.push(Finding::new(FindingKind::Content, "a"));
        report.push(Finding::new(FindingKind::Content, "b"));
        let (passed, errors) = report.into_parts();
        assert!(!passed);
        assert_eq!(errors, vec!["b".to_string(), "a".to_string()]);
    }
}
