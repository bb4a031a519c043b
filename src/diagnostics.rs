//! Diagnostics
//!
//! Collects recoverable problems found while importing and emitting.
//! A diagnostic never aborts generation; the affected construct is
//! degraded (alias omitted, reference rendered as a plain setter) and the
//! run continues. Fatal problems are [`crate::GenError`]s instead.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Type alias target path has no resolvable version; alias omitted
    UnresolvedAliasTarget,
    /// $ref target is not a known definition; rendered as a plain setter
    UnresolvedRef,
    /// $ref target takes part in a reference cycle; rendered as a plain setter
    RecursiveRef,
    /// Definition path carries no version and was not imported
    UnversionedDefinition,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnresolvedAliasTarget => "W001",
            Self::UnresolvedRef => "W002",
            Self::RecursiveRef => "W003",
            Self::UnversionedDefinition => "I001",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnresolvedAliasTarget | Self::UnresolvedRef | Self::RecursiveRef => {
                Severity::Warning
            }
            Self::UnversionedDefinition => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Definition path (plus property, if any) that caused this diagnostic
    pub path: String,
    /// Diagnostic code
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
}

impl DiagnosticItem {
    pub fn new(path: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.path
        )
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from import and emission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item, logging it as it is recorded
    pub fn push(&mut self, item: DiagnosticItem) {
        match item.severity() {
            Severity::Warning => tracing::warn!(code = %item.code, path = %item.path, "{}", item.message),
            Severity::Info => tracing::debug!(code = %item.code, path = %item.path, "{}", item.message),
        }
        self.items.push(item);
    }

    /// Type alias target could not be parsed to a version
    pub fn unresolved_alias_target(&mut self, path: impl Into<String>, alias: &str, target: &str) {
        self.push(DiagnosticItem::new(
            path,
            DiagnosticCode::UnresolvedAliasTarget,
            format!("type alias '{}' skipped: target '{}' has no resolvable version", alias, target),
        ));
    }

    /// $ref target is not a definition in the schema
    pub fn unresolved_ref(&mut self, path: impl Into<String>, ref_target: &str) {
        self.push(DiagnosticItem::new(
            path,
            DiagnosticCode::UnresolvedRef,
            format!("$ref target '{}' not found, emitting plain setter", ref_target),
        ));
    }

    /// $ref target is part of a reference cycle
    pub fn recursive_ref(&mut self, path: impl Into<String>, ref_target: &str) {
        self.push(DiagnosticItem::new(
            path,
            DiagnosticCode::RecursiveRef,
            format!("$ref target '{}' is recursive, emitting plain setter", ref_target),
        ));
    }

    /// Definition skipped because its path has no version
    pub fn unversioned_definition(&mut self, path: impl Into<String>) {
        self.push(DiagnosticItem::new(
            path,
            DiagnosticCode::UnversionedDefinition,
            "definition has no API version, skipped",
        ));
    }

    /// Get all warnings
    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    /// Items carrying a given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    /// Get all items
    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    /// Get total count
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Count warnings
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Merge another Diagnostics into this one
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if !self.is_empty() {
            output.push_str(&format!("\n{} warning(s)\n", self.warning_count()));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
