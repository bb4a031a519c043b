//! Reference Resolution
//!
//! Decides how a property that names another object is rendered:
//! - a plain setter, when the target can't be expanded
//! - a mixin namespace, recursively re-projecting the target's properties
//! - a type alias, for the synthesized `<field>Type` properties
//!
//! Eligibility is computed once over the whole tree by [`ReferenceIndex`].
//! Targets that sit on a reference cycle are never expanded, which keeps
//! the recursive expansion finite.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use super::{ApiObject, Property, PropertyShape, Root, Tree};
use crate::diagnostics::Diagnostics;
use crate::naming::{object_key, NamingPolicy};
use crate::schema::DefinitionName;

// =============================================================================
// Reference Index
// =============================================================================

/// Reference facts computed once after import
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    /// Definitions on a reference cycle (SCC of size > 1, or self-loop)
    recursive: BTreeSet<DefinitionName>,
}

impl ReferenceIndex {
    /// Build the object reference graph, find cycles and report every
    /// reference that will be degraded.
    pub fn analyze(root: &Root, diagnostics: &mut Diagnostics) -> Self {
        let mut graph: DiGraph<DefinitionName, ()> = DiGraph::new();
        let mut nodes: HashMap<&DefinitionName, NodeIndex> = HashMap::new();

        for object in root.all_objects() {
            nodes.insert(&object.path, graph.add_node(object.path.clone()));
        }
        for object in root.all_objects() {
            let from = nodes[&object.path];
            for target in direct_references(object) {
                if let Some(&to) = nodes.get(target) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        let mut recursive = BTreeSet::new();
        for scc in kosaraju_scc(&graph) {
            let cyclic = scc.len() > 1 || scc.iter().any(|&n| graph.contains_edge(n, n));
            if cyclic {
                recursive.extend(scc.iter().map(|&n| graph[n].clone()));
            }
        }
        if !recursive.is_empty() {
            debug!(count = recursive.len(), "found recursive definitions");
        }

        let index = Self { recursive };
        index.report(root, diagnostics);
        index
    }

    pub fn is_recursive(&self, name: &DefinitionName) -> bool {
        self.recursive.contains(name)
    }

    /// Record a diagnostic for every degraded reference, in output order
    fn report(&self, root: &Root, diagnostics: &mut Diagnostics) {
        for object in root.all_objects() {
            for property in object.sorted_properties() {
                let Some(target) = property.reference.as_ref() else {
                    continue;
                };
                let site = format!("{}.{}", object.path, property.name);
                let versioned = target.parse().version.is_some();
                let exists = root.object_by_definition(target).is_some();

                if property.is_type_alias() {
                    if !versioned {
                        diagnostics.unresolved_alias_target(site, &property.identifier, target.as_str());
                    } else if !exists {
                        diagnostics.unresolved_ref(site, target.as_str());
                    }
                } else if property.shape == PropertyShape::Reference {
                    if versioned && !exists {
                        diagnostics.unresolved_ref(site, target.as_str());
                    } else if self.is_recursive(target) {
                        diagnostics.recursive_ref(site, target.as_str());
                    }
                }
            }
        }
    }
}

/// Targets of an object's emitted, directly referencing method properties
fn direct_references(object: &ApiObject) -> impl Iterator<Item = &DefinitionName> {
    object
        .sorted_properties()
        .filter(|p| !p.is_type_alias() && p.shape == PropertyShape::Reference)
        .filter_map(|p| p.reference.as_ref())
}

// =============================================================================
// Resolution
// =============================================================================

/// How a property renders
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    /// Ordinary field; shape decides scalar/array/object setters
    Setter,
    /// Reference whose target can't be expanded; rendered as one setter
    PlainReference,
    /// Reference expanded into a mixin namespace over the target
    Mixin(&'a ApiObject),
    /// Type alias binding to the given member path
    TypeAlias(String),
    /// Type alias whose target did not resolve; omitted
    SkippedAlias,
}

impl PartialEq for Resolution<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Setter, Self::Setter)
            | (Self::PlainReference, Self::PlainReference)
            | (Self::SkippedAlias, Self::SkippedAlias) => true,
            (Self::Mixin(a), Self::Mixin(b)) => a.id == b.id,
            (Self::TypeAlias(a), Self::TypeAlias(b)) => a == b,
            _ => false,
        }
    }
}

/// Resolves properties against a finished tree
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    root: &'a Root,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(root: &'a Root) -> Self {
        Self { root }
    }

    pub fn resolve(&self, property: &Property) -> Resolution<'a> {
        if property.is_type_alias() {
            return match self.alias_target(property) {
                Some(target) => Resolution::TypeAlias(member_path(target)),
                None => Resolution::SkippedAlias,
            };
        }
        if property.shape != PropertyShape::Reference {
            return Resolution::Setter;
        }
        match self.mixin_target(property) {
            Some(target) => Resolution::Mixin(target),
            None => Resolution::PlainReference,
        }
    }

    /// Object a mixin reference expands, if the reference is eligible
    pub fn mixin_target(&self, property: &Property) -> Option<&'a ApiObject> {
        let target = property.reference.as_ref()?;
        if self.root.references().is_recursive(target) {
            return None;
        }
        self.root
            .object_by_definition(target)
            .filter(|object| object.sorted_properties().next().is_some())
    }

    fn alias_target(&self, property: &Property) -> Option<&'a ApiObject> {
        let target = property.reference.as_ref()?;
        target.parse().version?;
        self.root.object_by_definition(target)
    }

    /// Projection of an eligible reference for one expansion site
    pub fn ref_mixin(
        &self,
        property: &'a Property,
        parent: Option<&MixinQualifier>,
    ) -> Option<RefMixin<'a>> {
        let target = self.mixin_target(property)?;
        Some(RefMixin {
            target,
            via: property,
            qualifier: MixinQualifier::for_property(&property.identifier, parent),
            parent: parent.cloned(),
        })
    }
}

/// Member path of an object from inside the library (`hidden.core.v1.podSpec`
/// or `$.core.v1.pod`)
pub fn member_path(object: &ApiObject) -> String {
    let base = match object.id.tree {
        Tree::Visible => "$",
        Tree::Hidden => "hidden",
    };
    [object.id.group.as_str(), object.id.version.as_str(), object.identifier.as_str()]
        .iter()
        .fold(base.to_string(), |mut path, segment| {
            let key = object_key(segment);
            if key.starts_with('"') {
                path.push('[');
                path.push_str(&key);
                path.push(']');
            } else {
                path.push('.');
                path.push_str(&key);
            }
            path
        })
}

// =============================================================================
// Mixin Expansion
// =============================================================================

/// Name of the local wrapper function one expansion level defines
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MixinQualifier {
    name: String,
}

impl MixinQualifier {
    /// Qualifier for the namespace of a reference field. A name equal to the
    /// enclosing qualifier gets a trailing `_` so it doesn't shadow it.
    pub fn for_property(identifier: &str, parent: Option<&MixinQualifier>) -> Self {
        let mut name = format!("__{}Mixin", identifier);
        if parent.is_some_and(|p| p.name == name) {
            name.push('_');
        }
        Self { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the qualifier to an object literal
    pub fn wrap(&self, body: &str) -> String {
        format!("{}({})", self.name, body)
    }
}

/// An object re-projected under the field that references it. Built per
/// expansion site and dropped once rendered.
#[derive(Debug, Clone)]
pub struct RefMixin<'a> {
    pub target: &'a ApiObject,
    pub via: &'a Property,
    pub qualifier: MixinQualifier,
    pub parent: Option<MixinQualifier>,
}

impl<'a> RefMixin<'a> {
    /// `local __specMixin(spec) = {spec+: spec},`, composed with the
    /// enclosing qualifier when nested
    pub fn definition(&self, naming: &dyn NamingPolicy) -> String {
        let param = naming.param_name(&self.via.name);
        let merge = format!("{{{}+: {}}}", naming.field_key(&self.via.name), param);
        let body = match &self.parent {
            Some(parent) => parent.wrap(&merge),
            None => merge,
        };
        format!("local {}({}) = {},", self.qualifier.name(), param, body)
    }

    /// `mixinInstance(spec):: __specMixin(spec),`
    pub fn instance(&self, naming: &dyn NamingPolicy) -> String {
        let param = naming.param_name(&self.via.name);
        format!("mixinInstance({}):: {},", param, self.qualifier.wrap(&param))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customize::CustomizationTable;
    use crate::diagnostics::DiagnosticCode;
    use crate::model::{build_model, PropertyKind, Provenance};
    use crate::naming::JsonnetNaming;
    use crate::schema::SchemaDocument;

    const CHAIN_SCHEMA: &str = r##"{
        "info": {"version": "v1.8.0"},
        "definitions": {
            "io.k8s.api.core.v1.A": {
                "properties": {
                    "b": {"$ref": "#/definitions/io.k8s.api.core.v1.B"},
                    "missing": {"$ref": "#/definitions/io.k8s.api.core.v1.Missing"},
                    "quantity": {"$ref": "#/definitions/io.k8s.apimachinery.pkg.api.resource.Quantity"}
                },
                "x-kubernetes-group-version-kind": [{"group": "", "version": "v1", "kind": "A"}]
            },
            "io.k8s.api.core.v1.B": {
                "properties": {"c": {"$ref": "#/definitions/io.k8s.api.core.v1.C"}}
            },
            "io.k8s.api.core.v1.C": {
                "properties": {"value": {"type": "string"}}
            },
            "io.k8s.api.core.v1.Node": {
                "properties": {
                    "next": {"$ref": "#/definitions/io.k8s.api.core.v1.Node"},
                    "name": {"type": "string"}
                }
            },
            "io.k8s.api.core.v1.Empty": {}
        }
    }"##;

    fn build(schema: &str) -> (Root, Diagnostics) {
        let document = SchemaDocument::from_json_str(schema).unwrap();
        let mut diagnostics = Diagnostics::new();
        let root = build_model(
            document,
            Provenance::default(),
            &JsonnetNaming::default(),
            &CustomizationTable::default(),
            &mut diagnostics,
        )
        .unwrap();
        (root, diagnostics)
    }

    fn method<'a>(root: &'a Root, path: &str, field: &str) -> &'a Property {
        root.object_by_definition(&path.into())
            .unwrap()
            .property(field, PropertyKind::Method)
            .unwrap()
    }

    #[test]
    fn test_eligible_reference_expands() {
        let (root, _) = build(CHAIN_SCHEMA);
        let resolver = ReferenceResolver::new(&root);
        match resolver.resolve(method(&root, "io.k8s.api.core.v1.A", "b")) {
            Resolution::Mixin(target) => assert_eq!(target.kind(), "B"),
            other => panic!("expected mixin, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_and_unversioned_targets_are_plain() {
        let (root, diagnostics) = build(CHAIN_SCHEMA);
        let resolver = ReferenceResolver::new(&root);
        assert_eq!(
            resolver.resolve(method(&root, "io.k8s.api.core.v1.A", "missing")),
            Resolution::PlainReference
        );
        assert_eq!(
            resolver.resolve(method(&root, "io.k8s.api.core.v1.A", "quantity")),
            Resolution::PlainReference
        );

        let unresolved: Vec<_> = diagnostics.with_code(DiagnosticCode::UnresolvedRef).collect();
        // the field and its alias both point at the missing definition
        assert_eq!(unresolved.len(), 2);
        assert!(unresolved.iter().all(|d| d.path == "io.k8s.api.core.v1.A.missing"));
        assert_eq!(diagnostics.with_code(DiagnosticCode::UnresolvedAliasTarget).count(), 1);
    }

    #[test]
    fn test_self_reference_is_not_expanded() {
        let (root, diagnostics) = build(CHAIN_SCHEMA);
        assert!(root.references().is_recursive(&"io.k8s.api.core.v1.Node".into()));
        let resolver = ReferenceResolver::new(&root);
        assert_eq!(
            resolver.resolve(method(&root, "io.k8s.api.core.v1.Node", "next")),
            Resolution::PlainReference
        );
        assert_eq!(diagnostics.with_code(DiagnosticCode::RecursiveRef).count(), 1);
    }

    #[test]
    fn test_mutual_recursion_detected() {
        let (root, _) = build(
            r##"{"definitions": {
                "io.k8s.api.core.v1.Left": {"properties": {"right": {"$ref": "#/definitions/io.k8s.api.core.v1.Right"}}},
                "io.k8s.api.core.v1.Right": {"properties": {"left": {"$ref": "#/definitions/io.k8s.api.core.v1.Left"}}}
            }}"##,
        );
        assert!(root.references().is_recursive(&"io.k8s.api.core.v1.Left".into()));
        assert!(root.references().is_recursive(&"io.k8s.api.core.v1.Right".into()));
    }

    #[test]
    fn test_alias_resolves_to_member_path() {
        let (root, _) = build(CHAIN_SCHEMA);
        let resolver = ReferenceResolver::new(&root);
        let alias = root
            .object_by_definition(&"io.k8s.api.core.v1.A".into())
            .unwrap()
            .property("b", PropertyKind::TypeAlias)
            .unwrap();
        assert_eq!(
            resolver.resolve(alias),
            Resolution::TypeAlias("hidden.core.v1.b".to_string())
        );
    }

    #[test]
    fn test_qualifier_naming() {
        let outer = MixinQualifier::for_property("spec", None);
        assert_eq!(outer.name(), "__specMixin");
        let inner = MixinQualifier::for_property("spec", Some(&outer));
        assert_eq!(inner.name(), "__specMixin_");
        let other = MixinQualifier::for_property("template", Some(&outer));
        assert_eq!(other.name(), "__templateMixin");
        assert_eq!(other.wrap("{x: x}"), "__templateMixin({x: x})");
    }

    #[test]
    fn test_ref_mixin_definition_lines() {
        let (root, _) = build(CHAIN_SCHEMA);
        let resolver = ReferenceResolver::new(&root);
        let naming = JsonnetNaming::default();

        let b = method(&root, "io.k8s.api.core.v1.A", "b");
        let outer = resolver.ref_mixin(b, None).unwrap();
        assert_eq!(outer.definition(&naming), "local __bMixin(b) = {b+: b},");
        assert_eq!(outer.instance(&naming), "mixinInstance(b):: __bMixin(b),");

        let c = method(&root, "io.k8s.api.core.v1.B", "c");
        let inner = resolver.ref_mixin(c, Some(&outer.qualifier)).unwrap();
        assert_eq!(inner.definition(&naming), "local __cMixin(c) = __bMixin({c+: c}),");
        assert_eq!(inner.target.kind(), "C");
    }
}
