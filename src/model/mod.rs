//! Library Model
//!
//! Typed tree of the library to generate:
//!
//! ```text
//! Root
//! ├── groups (visible: definitions carrying resource markers)
//! │   └── Group ── VersionedApi ── ApiObject ── Property / Constructor
//! └── hidden_groups (everything else, reachable only by reference)
//! ```
//!
//! The tree is built once by [`importer::build_model`], is read-only
//! afterwards, and is discarded after emission. Nodes are addressed by
//! [`ObjectId`] / [`PropertyId`], which double as identity keys for the
//! emitter's fragment cache.

pub mod importer;
pub mod resolve;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::schema::{DefinitionName, SchemaDocument, CORE_GROUP};

pub use importer::build_model;
pub use resolve::{ReferenceIndex, ReferenceResolver, RefMixin, Resolution, MixinQualifier};

/// Properties rendered by constructors rather than setters
pub const SPECIAL_PROPERTIES: &[&str] = &["kind", "apiVersion"];

pub fn is_special_property(name: &str) -> bool {
    SPECIAL_PROPERTIES.contains(&name)
}

// =============================================================================
// Node Identity
// =============================================================================

/// Which half of the root a node lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tree {
    Visible,
    Hidden,
}

/// Identity of an API object: its coordinates in the tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    pub tree: Tree,
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.tree {
            Tree::Visible => "",
            Tree::Hidden => "hidden.",
        };
        write!(f, "{}{}.{}.{}", prefix, self.group, self.version, self.kind)
    }
}

/// Property flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKind {
    /// Ordinary field, rendered as setter(s) or a mixin namespace
    Method,
    /// Passthrough binding to the referenced object
    TypeAlias,
}

/// Sort key for properties: raw field name, then kind, so a field and its
/// alias sort together
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyKey {
    pub name: String,
    pub kind: PropertyKind,
}

/// Identity of a property
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyId {
    pub object: ObjectId,
    pub key: PropertyKey,
}

// =============================================================================
// Comments
// =============================================================================

/// Documentation lines attached to a node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    lines: Vec<String>,
}

impl Comments {
    /// Split a description into trimmed lines; blank descriptions yield none
    pub fn from_description(description: Option<&str>) -> Self {
        let lines = description
            .map(|d| d.lines().map(|l| l.trim_end().to_string()).collect::<Vec<_>>())
            .unwrap_or_default();
        if lines.iter().all(|l| l.trim().is_empty()) {
            return Self::default();
        }
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Properties
// =============================================================================

/// Declared value shape of a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyShape {
    /// Direct `$ref` to another definition
    Reference,
    /// `type: array`, with the element `$ref` or type if declared
    Array {
        item_reference: Option<DefinitionName>,
        item_type: Option<String>,
    },
    /// `type: object` (free-form map)
    Object,
    /// string, boolean, integer, number, ...
    Scalar(String),
}

impl PropertyShape {
    /// Arrays and free-form objects get a merging `with*Mixin` companion
    pub fn has_mixin_setter(&self) -> bool {
        matches!(self, Self::Array { .. } | Self::Object)
    }
}

/// One field of an API object
#[derive(Debug, Clone)]
pub struct Property {
    pub id: PropertyId,
    /// Raw field name from the schema
    pub name: String,
    /// Output identifier (type aliases include the alias suffix)
    pub identifier: String,
    /// Target of a `$ref`; for type aliases, the aliased definition
    pub reference: Option<DefinitionName>,
    pub shape: PropertyShape,
    pub comments: Comments,
    pub blacklisted: bool,
}

impl Property {
    pub fn kind(&self) -> PropertyKind {
        self.id.key.kind
    }

    pub fn is_type_alias(&self) -> bool {
        self.kind() == PropertyKind::TypeAlias
    }

    /// Owning object
    pub fn owner(&self) -> &ObjectId {
        &self.id.object
    }

    /// Whether the property is rendered at all
    pub fn is_emitted(&self) -> bool {
        !self.blacklisted && !is_special_property(&self.name)
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// A constructor parameter with the setter it invokes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorParam {
    pub name: String,
    pub default: Option<String>,
    /// Function path relative to the object, e.g. `withName` or
    /// `mixin.metadata.withName`
    pub target: String,
}

/// A constructor function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub id: String,
    pub params: Vec<ConstructorParam>,
}

// =============================================================================
// API Objects
// =============================================================================

/// One schema type within a versioned API
#[derive(Debug, Clone)]
pub struct ApiObject {
    pub id: ObjectId,
    /// Definition path the object was built from
    pub path: DefinitionName,
    /// Object key in the output (`podSpec`)
    pub identifier: String,
    /// Kind literal seeded by constructors of top-level objects
    pub resource_kind: String,
    pub top_level: bool,
    pub comments: Comments,
    pub(crate) properties: BTreeMap<PropertyKey, Property>,
    pub(crate) constructors: Vec<Constructor>,
}

impl ApiObject {
    pub fn kind(&self) -> &str {
        &self.id.kind
    }

    /// Emitted properties in output order (blacklisted and special
    /// properties removed)
    pub fn sorted_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values().filter(|p| p.is_emitted())
    }

    pub fn property(&self, name: &str, kind: PropertyKind) -> Option<&Property> {
        self.properties.get(&PropertyKey {
            name: name.to_string(),
            kind,
        })
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }
}

// =============================================================================
// Versioned APIs and Groups
// =============================================================================

/// One version of a group's objects
#[derive(Debug, Clone)]
pub struct VersionedApi {
    pub version: String,
    pub(crate) objects: BTreeMap<String, ApiObject>,
}

impl VersionedApi {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            objects: BTreeMap::new(),
        }
    }

    /// Objects sorted by kind
    pub fn objects(&self) -> impl Iterator<Item = &ApiObject> {
        self.objects.values()
    }

    pub fn object(&self, kind: &str) -> Option<&ApiObject> {
        self.objects.get(kind)
    }
}

/// A namespace of related object types
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    /// API group from resource markers (`rbac.authorization.k8s.io`, or
    /// empty for the core group)
    pub qualified_name: Option<String>,
    pub(crate) versioned_apis: BTreeMap<String, VersionedApi>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualified_name: None,
            versioned_apis: BTreeMap::new(),
        }
    }

    /// Versioned APIs sorted by version
    pub fn versioned_apis(&self) -> impl Iterator<Item = &VersionedApi> {
        self.versioned_apis.values()
    }

    pub fn versioned_api(&self, version: &str) -> Option<&VersionedApi> {
        self.versioned_apis.get(version)
    }

    /// The `apiVersion` string for one of this group's versions
    pub fn api_version(&self, version: &str) -> String {
        match self.qualified_name.as_deref() {
            Some("") => version.to_string(),
            Some(qualified) => format!("{}/{}", qualified, version),
            None if self.name == CORE_GROUP => version.to_string(),
            None => format!("{}/{}", self.name, version),
        }
    }
}

// =============================================================================
// Root
// =============================================================================

/// Provenance stamps written into the output header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    pub library_revision: Option<String>,
    pub schema_revision: Option<String>,
}

/// The whole library
#[derive(Debug)]
pub struct Root {
    pub(crate) document: SchemaDocument,
    pub(crate) provenance: Provenance,
    pub(crate) groups: BTreeMap<String, Group>,
    pub(crate) hidden_groups: BTreeMap<String, Group>,
    pub(crate) by_definition: HashMap<DefinitionName, ObjectId>,
    pub(crate) references: ReferenceIndex,
}

impl Root {
    pub(crate) fn new(document: SchemaDocument, provenance: Provenance) -> Self {
        Self {
            document,
            provenance,
            groups: BTreeMap::new(),
            hidden_groups: BTreeMap::new(),
            by_definition: HashMap::new(),
            references: ReferenceIndex::default(),
        }
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    pub fn release(&self) -> &str {
        self.document.release()
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Visible groups sorted by name
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Hidden groups sorted by name
    pub fn hidden_groups(&self) -> impl Iterator<Item = &Group> {
        self.hidden_groups.values()
    }

    pub fn tree(&self, tree: Tree) -> &BTreeMap<String, Group> {
        match tree {
            Tree::Visible => &self.groups,
            Tree::Hidden => &self.hidden_groups,
        }
    }

    pub(crate) fn tree_mut(&mut self, tree: Tree) -> &mut BTreeMap<String, Group> {
        match tree {
            Tree::Visible => &mut self.groups,
            Tree::Hidden => &mut self.hidden_groups,
        }
    }

    pub fn group(&self, tree: Tree, name: &str) -> Option<&Group> {
        self.tree(tree).get(name)
    }

    pub fn object(&self, id: &ObjectId) -> Option<&ApiObject> {
        self.tree(id.tree)
            .get(&id.group)?
            .versioned_apis
            .get(&id.version)?
            .objects
            .get(&id.kind)
    }

    pub(crate) fn object_mut(&mut self, id: &ObjectId) -> Option<&mut ApiObject> {
        self.tree_mut(id.tree)
            .get_mut(&id.group)?
            .versioned_apis
            .get_mut(&id.version)?
            .objects
            .get_mut(&id.kind)
    }

    /// Look up the object built from a definition path, in either tree
    pub fn object_by_definition(&self, name: &DefinitionName) -> Option<&ApiObject> {
        self.by_definition.get(name).and_then(|id| self.object(id))
    }

    /// All objects, visible tree first, each tree in sorted order
    pub fn all_objects(&self) -> impl Iterator<Item = &ApiObject> {
        self.groups
            .values()
            .chain(self.hidden_groups.values())
            .flat_map(|g| g.versioned_apis.values())
            .flat_map(|v| v.objects.values())
    }

    pub fn references(&self) -> &ReferenceIndex {
        &self.references
    }
}
