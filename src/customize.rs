//! Customization Tables
//!
//! Per-release overrides supplied alongside the schema:
//! - custom constructors for a definition path
//! - blacklisted properties that must not be emitted
//! - identifier rewrites consumed by the naming policy
//!
//! ## Example (customizations.toml):
//! ```toml
//! [releases."*".blacklist]
//! "io.k8s.api.core.v1.Pod" = ["status"]
//!
//! [releases."v1.8.0".rewrites]
//! externalIPs = "externalIps"
//!
//! [[releases."v1.8.0".constructors."io.k8s.api.core.v1.Container"]]
//! id = "new"
//! params = [{ id = "name" }, { id = "image" }]
//!
//! [[releases."v1.8.0".constructors."io.k8s.api.core.v1.ContainerPort"]]
//! id = "newNamed"
//! params = [
//!   { id = "containerPort" },
//!   { id = "name", path = "withName" },
//!   { id = "protocol", default = "\"TCP\"" },
//! ]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::naming::ANY_RELEASE;

/// Lookup interface the generator uses for customizations
pub trait Customizations {
    /// Custom constructors declared for a definition path, if any
    fn constructors(&self, release: &str, path: &str) -> Option<&[ConstructorSpec]>;

    /// Whether a property of a definition must be left out of the output
    fn is_blacklisted(&self, release: &str, path: &str, property: &str) -> bool;
}

/// A constructor declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorSpec {
    /// Function name (e.g. `new`, `fromSecret`)
    pub id: String,
    /// Ordered parameters
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

/// A constructor parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name; also the property it sets unless `path` is given
    pub id: String,
    /// Jsonnet literal used as the parameter's default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Explicit setter path relative to the object (e.g. `mixin.metadata.withName`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ConstructorSpec {
    pub fn new(id: impl Into<String>, params: Vec<ParamSpec>) -> Self {
        Self {
            id: id.into(),
            params,
        }
    }
}

impl ParamSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default: None,
            path: None,
        }
    }

    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Customizations for one release
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseCustomization {
    #[serde(default)]
    pub constructors: BTreeMap<String, Vec<ConstructorSpec>>,
    #[serde(default)]
    pub blacklist: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub rewrites: BTreeMap<String, String>,
}

/// Customizations keyed by release; release `"*"` applies to all releases
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomizationTable {
    #[serde(default)]
    pub releases: BTreeMap<String, ReleaseCustomization>,
}

impl CustomizationTable {
    /// Read tables from a TOML file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| GenError::InvalidCustomization {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Mutable access to one release's tables, creating them if needed
    pub fn release_mut(&mut self, release: &str) -> &mut ReleaseCustomization {
        self.releases.entry(release.to_string()).or_default()
    }

    /// Identifier rewrites per release
    pub fn rewrites(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, String>)> {
        self.releases.iter().map(|(release, c)| (release, &c.rewrites))
    }

    fn lookup(&self, release: &str) -> impl Iterator<Item = &ReleaseCustomization> {
        self.releases
            .get(release)
            .into_iter()
            .chain(self.releases.get(ANY_RELEASE))
    }
}

impl Customizations for CustomizationTable {
    fn constructors(&self, release: &str, path: &str) -> Option<&[ConstructorSpec]> {
        self.lookup(release)
            .find_map(|c| c.constructors.get(path))
            .map(Vec::as_slice)
    }

    fn is_blacklisted(&self, release: &str, path: &str, property: &str) -> bool {
        self.lookup(release)
            .any(|c| c.blacklist.get(path).is_some_and(|props| props.contains(property)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[releases."*".blacklist]
"io.k8s.api.core.v1.Pod" = ["status"]

[[releases."v1.8.0".constructors."io.k8s.api.core.v1.Container"]]
id = "new"
params = [{ id = "name" }, { id = "image", default = "\"nginx\"" }]
"#;

    #[test]
    fn test_parse_tables() {
        let table: CustomizationTable = toml::from_str(SAMPLE).unwrap();
        let ctors = table
            .constructors("v1.8.0", "io.k8s.api.core.v1.Container")
            .unwrap();
        assert_eq!(ctors.len(), 1);
        assert_eq!(ctors[0].params[1].default.as_deref(), Some("\"nginx\""));
        assert!(table.constructors("v1.7.0", "io.k8s.api.core.v1.Container").is_none());
    }

    #[test]
    fn test_wildcard_blacklist() {
        let table: CustomizationTable = toml::from_str(SAMPLE).unwrap();
        assert!(table.is_blacklisted("v1.8.0", "io.k8s.api.core.v1.Pod", "status"));
        assert!(table.is_blacklisted("v1.6.0", "io.k8s.api.core.v1.Pod", "status"));
        assert!(!table.is_blacklisted("v1.8.0", "io.k8s.api.core.v1.Pod", "spec"));
    }

    #[test]
    fn test_release_specific_wins() {
        let mut table = CustomizationTable::default();
        table.release_mut("*").constructors.insert(
            "a.v1.A".to_string(),
            vec![ConstructorSpec::new("new", vec![])],
        );
        table.release_mut("v2").constructors.insert(
            "a.v1.A".to_string(),
            vec![ConstructorSpec::new("make", vec![ParamSpec::new("x").with_default("1")])],
        );
        let make = &table.constructors("v2", "a.v1.A").unwrap()[0];
        assert_eq!(make.id, "make");
        assert_eq!(make.params[0].default.as_deref(), Some("1"));
        assert_eq!(table.constructors("v1", "a.v1.A").unwrap()[0].id, "new");
    }
}
