//! Schema document records
//!
//! The input is a Swagger/OpenAPI-2 style document whose `definitions`
//! map fully-qualified paths (`io.k8s.api.core.v1.Pod`) to object
//! definitions. Only the parts the generator reads are modelled.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// Group used for definitions whose path carries no group segment
pub const CORE_GROUP: &str = "core";

/// Top-level schema document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub info: SchemaInfo,
    #[serde(default)]
    pub definitions: BTreeMap<DefinitionName, SchemaDefinition>,
}

/// Document metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaInfo {
    #[serde(default)]
    pub title: String,
    /// API release the document describes (e.g. `v1.8.0`)
    #[serde(default)]
    pub version: String,
}

/// One object definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,
    /// Resource markers; non-empty means the definition is a top-level resource
    #[serde(
        rename = "x-kubernetes-group-version-kind",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub group_version_kind: Vec<GroupVersionKind>,
}

impl SchemaDefinition {
    pub fn is_top_level(&self) -> bool {
        !self.group_version_kind.is_empty()
    }
}

/// Resource marker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
}

/// One field of a definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaProperty {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ObjectRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaItems>,
}

/// Element type of an array field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaItems {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ObjectRef>,
}

/// A `$ref` value such as `#/definitions/io.k8s.api.core.v1.PodSpec`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(pub String);

impl ObjectRef {
    /// Definition path the reference points at
    pub fn name(&self) -> DefinitionName {
        let path = self.0.strip_prefix("#/definitions/").unwrap_or(&self.0);
        DefinitionName(path.to_string())
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Definition Names
// =============================================================================

/// Fully-qualified definition path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionName(pub String);

/// A definition path split into its API coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub group: String,
    pub version: Option<String>,
    pub kind: String,
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v[0-9]+((alpha|beta)[0-9]+)?$").expect("static regex"))
}

impl DefinitionName {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(group, version, kind)`.
    ///
    /// `io.k8s.api.apps.v1beta2.Deployment` parses to `apps`, `v1beta2`,
    /// `Deployment`; `v1.Pod` to `core`, `v1`, `Pod`. Paths without a
    /// version segment directly before the kind yield `version: None`.
    pub fn parse(&self) -> ParsedName {
        let segments: Vec<&str> = self.0.split('.').collect();
        let kind = segments.last().copied().unwrap_or_default().to_string();

        if segments.len() < 2 || !version_pattern().is_match(segments[segments.len() - 2]) {
            return ParsedName {
                group: CORE_GROUP.to_string(),
                version: None,
                kind,
            };
        }

        let version = segments[segments.len() - 2].to_string();
        let group = if segments.len() >= 3 {
            segments[segments.len() - 3].to_string()
        } else {
            CORE_GROUP.to_string()
        };

        ParsedName {
            group,
            version: Some(version),
            kind,
        }
    }
}

impl fmt::Display for DefinitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DefinitionName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Loading
// =============================================================================

impl SchemaDocument {
    /// Parse a document from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: SchemaDocument = serde_json::from_str(content)?;
        if document.definitions.is_empty() {
            return Err(GenError::InvalidSchema("document has no definitions".to_string()));
        }
        Ok(document)
    }

    /// Read and parse a document from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// API release used for naming and customization lookups
    pub fn release(&self) -> &str {
        &self.info.version
    }

    pub fn definition(&self, name: &DefinitionName) -> Option<&SchemaDefinition> {
        self.definitions.get(name)
    }
}
