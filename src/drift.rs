//! Drift Detection
//!
//! Compares freshly generated library text against a checked-in copy.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

/// Line-level difference between a stored and a generated library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
    pub added: usize,
    pub removed: usize,
    /// Unified diff, stored -> generated
    pub diff: String,
}

impl DriftReport {
    pub fn has_drift(&self) -> bool {
        self.added > 0 || self.removed > 0
    }
}

/// Diff `stored` against `generated`. Returns `None` when they match.
pub fn detect_drift(stored: &str, generated: &str) -> Option<DriftReport> {
    if stored == generated {
        return None;
    }

    let diff = TextDiff::from_lines(stored, generated);
    let mut report = DriftReport::default();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => report.removed += 1,
            ChangeTag::Insert => report.added += 1,
            ChangeTag::Equal => {}
        }
    }
    report.diff = diff
        .unified_diff()
        .context_radius(3)
        .header("stored", "generated")
        .to_string();

    Some(report)
}
