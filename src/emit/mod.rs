//! Library Emission
//!
//! Turns a schema document into library text in one synchronous pass:
//! import the model, then render it with the post-order [`Emitter`].
//!
//! Architecture:
//! - `buffer`: depth-relative line records, spliced into parents
//! - `properties`: line templates per property flavour
//! - `visitor`: memoized traversal composing fragments bottom-up
//!
//! Either the whole document is produced or a fatal error is returned;
//! there is no partial output.

pub mod buffer;
pub mod properties;
pub mod visitor;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use buffer::LineBuffer;
pub use visitor::Emitter;

use crate::checksum::Checksum;
use crate::customize::Customizations;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::model::{build_model, Provenance, Root};
use crate::naming::NamingPolicy;
use crate::schema::SchemaDocument;

// =============================================================================
// Generated Output
// =============================================================================

/// Counts of what was rendered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub groups: usize,
    pub hidden_groups: usize,
    pub objects: usize,
    /// Method properties (setters and mixin namespaces)
    pub properties: usize,
    /// Type aliases, including skipped ones
    pub aliases: usize,
    /// Properties rendered as mixin namespaces on their own object
    pub mixins: usize,
}

/// Output from library generation
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Generated library text
    pub code: String,
    /// Recoverable problems met along the way
    pub diagnostics: Diagnostics,
    pub stats: GenerationStats,
    /// Fingerprint of the input document
    pub schema_checksum: Checksum,
}

// =============================================================================
// Public API
// =============================================================================

/// Render a finished model to text
pub fn emit_library(root: &Root, naming: &dyn NamingPolicy) -> (String, GenerationStats) {
    let mut emitter = Emitter::new(root, naming);
    let code = emitter.emit_root().render();
    (code, emitter.stats().clone())
}

/// Generate a library from a schema document
pub fn generate_library(
    document: SchemaDocument,
    provenance: Provenance,
    naming: &dyn NamingPolicy,
    customizations: &dyn Customizations,
) -> Result<GeneratedOutput> {
    let schema_checksum = Checksum::from_document(&document);
    let mut diagnostics = Diagnostics::new();

    let root = build_model(document, provenance, naming, customizations, &mut diagnostics)?;
    let (code, stats) = emit_library(&root, naming);

    info!(
        checksum = %schema_checksum.short(),
        objects = stats.objects,
        properties = stats.properties,
        aliases = stats.aliases,
        warnings = diagnostics.warning_count(),
        "generated library"
    );

    Ok(GeneratedOutput {
        code,
        diagnostics,
        stats,
        schema_checksum,
    })
}
