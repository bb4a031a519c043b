//! Schema Importer
//!
//! Builds the [`Root`] from a schema document in three passes:
//! 1. every versioned definition becomes an [`ApiObject`] in the visible or
//!    hidden tree, with one method property per field plus type aliases
//! 2. the reference index is computed over the finished tree, and mixin
//!    keys are checked against the kinds of the versions they expand
//! 3. constructors are synthesized (or taken from the customization
//!    tables) and validated against the finished tree

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::resolve::{ReferenceIndex, ReferenceResolver, Resolution};
use super::{
    is_special_property, ApiObject, Comments, Constructor, ConstructorParam, Group, ObjectId,
    Property, PropertyId, PropertyKey, PropertyKind, PropertyShape, Provenance, Root, Tree,
    VersionedApi,
};
use crate::customize::{ConstructorSpec, Customizations};
use crate::diagnostics::Diagnostics;
use crate::error::{GenError, Result};
use crate::naming::NamingPolicy;
use crate::schema::{DefinitionName, SchemaDefinition, SchemaDocument, SchemaProperty};

/// Function key reserved on every object for the mixin namespace
const MIXIN_NAMESPACE: &str = "mixin";

/// Default constructor name
const DEFAULT_CONSTRUCTOR: &str = "new";

/// Build the model for a schema document.
pub fn build_model(
    document: SchemaDocument,
    provenance: Provenance,
    naming: &dyn NamingPolicy,
    customizations: &dyn Customizations,
    diagnostics: &mut Diagnostics,
) -> Result<Root> {
    let mut root = Root::new(document, provenance);
    let release = root.release().to_string();

    // Pass 1: objects and properties
    let definitions: Vec<(DefinitionName, SchemaDefinition)> = root
        .document
        .definitions
        .iter()
        .map(|(name, def)| (name.clone(), def.clone()))
        .collect();

    for (name, definition) in &definitions {
        add_definition(&mut root, name, definition, &release, naming, customizations, diagnostics)?;
    }

    // Pass 2: reference analysis
    root.references = ReferenceIndex::analyze(&root, diagnostics);
    check_mixin_names(&root)?;

    // Pass 3: constructors
    let mut built = Vec::new();
    {
        let resolver = ReferenceResolver::new(&root);
        for object in root.all_objects() {
            let specs = customizations
                .constructors(&release, object.path.as_str())
                .map(<[ConstructorSpec]>::to_vec)
                .unwrap_or_else(|| vec![ConstructorSpec::new(DEFAULT_CONSTRUCTOR, Vec::new())]);
            let constructors = build_constructors(object, &specs, &resolver, naming)?;
            built.push((object.id.clone(), constructors));
        }
    }
    for (id, constructors) in built {
        if let Some(object) = root.object_mut(&id) {
            object.constructors = constructors;
        }
    }

    info!(
        groups = root.groups.len(),
        hidden_groups = root.hidden_groups.len(),
        objects = root.by_definition.len(),
        "built library model"
    );

    Ok(root)
}

// =============================================================================
// Pass 1: Definitions
// =============================================================================

fn add_definition(
    root: &mut Root,
    name: &DefinitionName,
    definition: &SchemaDefinition,
    release: &str,
    naming: &dyn NamingPolicy,
    customizations: &dyn Customizations,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let parsed = name.parse();
    let Some(version) = parsed.version else {
        diagnostics.unversioned_definition(name.as_str());
        return Ok(());
    };

    let tree = if definition.is_top_level() {
        Tree::Visible
    } else {
        Tree::Hidden
    };
    let id = ObjectId {
        tree,
        group: parsed.group.clone(),
        version: version.clone(),
        kind: parsed.kind.clone(),
    };
    debug!(definition = %name, object = %id, "importing definition");

    let identifier = naming.object_identifier(release, &parsed.kind);
    let properties = build_properties(&id, name, definition, release, naming, customizations)?;
    let marker = definition.group_version_kind.first();

    let object = ApiObject {
        id: id.clone(),
        path: name.clone(),
        identifier: identifier.clone(),
        resource_kind: marker
            .map(|gvk| gvk.kind.clone())
            .filter(|kind| !kind.is_empty())
            .unwrap_or_else(|| parsed.kind.clone()),
        top_level: definition.is_top_level(),
        comments: Comments::from_description(definition.description.as_deref()),
        properties,
        constructors: Vec::new(),
    };

    let group = root
        .tree_mut(tree)
        .entry(parsed.group.clone())
        .or_insert_with(|| Group::new(parsed.group.clone()));
    if group.qualified_name.is_none() {
        if let Some(gvk) = marker {
            group.qualified_name = Some(gvk.group.clone());
        }
    }

    let versioned = group
        .versioned_apis
        .entry(version.clone())
        .or_insert_with(|| VersionedApi::new(version.clone()));

    if let Some(existing) = versioned.objects.get(&parsed.kind) {
        return Err(GenError::DuplicateKind {
            group: parsed.group,
            version,
            kind: parsed.kind,
            path: format!("{} and {}", existing.path, name),
        });
    }
    if let Some(existing) = versioned.objects.values().find(|o| o.identifier == identifier) {
        return Err(GenError::KindIdentifierCollision {
            group: parsed.group,
            version,
            kind: parsed.kind,
            identifier,
            existing: existing.kind().to_string(),
        });
    }

    versioned.objects.insert(parsed.kind, object);
    root.by_definition.insert(name.clone(), id);
    Ok(())
}

fn build_properties(
    owner: &ObjectId,
    path: &DefinitionName,
    definition: &SchemaDefinition,
    release: &str,
    naming: &dyn NamingPolicy,
    customizations: &dyn Customizations,
) -> Result<BTreeMap<PropertyKey, Property>> {
    let mut properties = BTreeMap::new();
    // identifier -> raw field name, for collision checks
    let mut identifiers: BTreeMap<String, String> = BTreeMap::new();
    // setter function -> raw field name
    let mut functions: BTreeMap<String, String> = BTreeMap::new();
    let mut aliases = Vec::new();

    for (field, schema) in &definition.properties {
        let shape = property_shape(path, field, schema)?;
        let identifier = naming.rewrite_identifier(release, field);

        if let Some(existing) = identifiers.get(&identifier) {
            return Err(GenError::PropertyIdentifierCollision {
                path: path.to_string(),
                property: field.clone(),
                existing: existing.clone(),
                identifier,
            });
        }
        identifiers.insert(identifier.clone(), field.clone());

        let blacklisted = customizations.is_blacklisted(release, path.as_str(), field);
        if !blacklisted && !is_special_property(field) {
            let mut names = vec![naming.setter_id(&identifier)];
            if shape.has_mixin_setter() {
                names.push(naming.mixin_id(&identifier));
            }
            for name in names {
                if let Some(existing) = functions.get(&name) {
                    return Err(GenError::PropertyIdentifierCollision {
                        path: path.to_string(),
                        property: field.clone(),
                        existing: existing.clone(),
                        identifier: name,
                    });
                }
                functions.insert(name, field.clone());
            }
        }

        let key = PropertyKey {
            name: field.clone(),
            kind: PropertyKind::Method,
        };

        // Type alias for references and arrays of references
        let alias_target = match &shape {
            PropertyShape::Reference => schema.reference.as_ref().map(|r| r.name()),
            PropertyShape::Array { item_reference, .. } => item_reference.clone(),
            _ => None,
        };
        if let Some(target) = alias_target {
            aliases.push((field.clone(), target, blacklisted));
        }

        properties.insert(
            key.clone(),
            Property {
                id: PropertyId {
                    object: owner.clone(),
                    key,
                },
                name: field.clone(),
                identifier,
                reference: schema.reference.as_ref().map(|r| r.name()),
                shape,
                comments: Comments::from_description(schema.description.as_deref()),
                blacklisted,
            },
        );
    }

    for (field, target, blacklisted) in aliases {
        let alias = naming.type_alias_id(release, &field);
        if identifiers.contains_key(&alias) {
            return Err(GenError::TypeAliasCollision {
                path: path.to_string(),
                alias,
            });
        }

        let key = PropertyKey {
            name: field.clone(),
            kind: PropertyKind::TypeAlias,
        };
        properties.insert(
            key.clone(),
            Property {
                id: PropertyId {
                    object: owner.clone(),
                    key,
                },
                name: field,
                identifier: alias,
                reference: Some(target),
                shape: PropertyShape::Reference,
                comments: Comments::default(),
                blacklisted,
            },
        );
    }

    Ok(properties)
}

fn property_shape(path: &DefinitionName, field: &str, schema: &SchemaProperty) -> Result<PropertyShape> {
    if schema.reference.is_some() {
        return Ok(PropertyShape::Reference);
    }
    match schema.schema_type.as_deref() {
        Some("array") => {
            let items = schema.items.as_ref();
            Ok(PropertyShape::Array {
                item_reference: items.and_then(|i| i.reference.as_ref()).map(|r| r.name()),
                item_type: items.and_then(|i| i.schema_type.clone()),
            })
        }
        Some("object") => Ok(PropertyShape::Object),
        Some(scalar) => Ok(PropertyShape::Scalar(scalar.to_string())),
        None => Err(GenError::MalformedProperty {
            path: path.to_string(),
            property: field.to_string(),
        }),
    }
}

// =============================================================================
// Pass 2: Mixin Names
// =============================================================================

/// A mixin namespace is keyed by the referencing field's identifier, which
/// must not name a kind in the target's own version.
fn check_mixin_names(root: &Root) -> Result<()> {
    let resolver = ReferenceResolver::new(root);
    for object in root.all_objects() {
        for property in object.sorted_properties() {
            let Resolution::Mixin(target) = resolver.resolve(property) else {
                continue;
            };
            let collides = root
                .group(target.id.tree, &target.id.group)
                .and_then(|group| group.versioned_api(&target.id.version))
                .is_some_and(|api| api.object(&property.identifier).is_some());
            if collides {
                return Err(GenError::MixinKindCollision {
                    path: format!("{}.{}", object.path, property.name),
                    identifier: property.identifier.clone(),
                    group: target.id.group.clone(),
                    version: target.id.version.clone(),
                });
            }
        }
    }
    Ok(())
}

// =============================================================================
// Pass 3: Constructors
// =============================================================================

/// Function keys an object exposes at one namespace level
fn namespace_functions(
    object: &ApiObject,
    resolver: &ReferenceResolver<'_>,
    naming: &dyn NamingPolicy,
    expanded: bool,
) -> BTreeSet<String> {
    let mut functions = BTreeSet::new();
    if expanded {
        functions.insert("mixinInstance".to_string());
    }
    for property in object.sorted_properties() {
        match resolver.resolve(property) {
            Resolution::Setter if property.shape.has_mixin_setter() => {
                functions.insert(naming.setter_id(&property.identifier));
                functions.insert(naming.mixin_id(&property.identifier));
            }
            Resolution::Setter | Resolution::PlainReference => {
                functions.insert(naming.setter_id(&property.identifier));
            }
            Resolution::Mixin(_) | Resolution::TypeAlias(_) | Resolution::SkippedAlias => {}
        }
    }
    functions
}

/// Every key the object's own namespace defines, constructors excluded
fn object_keys(object: &ApiObject, resolver: &ReferenceResolver<'_>, naming: &dyn NamingPolicy) -> BTreeSet<String> {
    let mut keys = namespace_functions(object, resolver, naming, false);
    keys.insert(MIXIN_NAMESPACE.to_string());
    for property in object.sorted_properties() {
        keys.insert(property.identifier.clone());
    }
    keys
}

fn build_constructors<'a>(
    object: &'a ApiObject,
    specs: &[ConstructorSpec],
    resolver: &ReferenceResolver<'a>,
    naming: &dyn NamingPolicy,
) -> Result<Vec<Constructor>> {
    let keys = object_keys(object, resolver, naming);
    let mut seen = BTreeSet::new();
    let mut constructors = Vec::with_capacity(specs.len());

    for spec in specs {
        if !seen.insert(spec.id.as_str()) {
            return Err(GenError::DuplicateConstructor {
                path: object.path.to_string(),
                constructor: spec.id.clone(),
            });
        }
        if keys.contains(&spec.id) {
            return Err(GenError::ConstructorShadowsProperty {
                path: object.path.to_string(),
                constructor: spec.id.clone(),
            });
        }

        let mut params = Vec::with_capacity(spec.params.len());
        for param in &spec.params {
            let target = match &param.path {
                Some(path) => {
                    validate_path(object, path, resolver, naming).map_err(|reason| {
                        GenError::InvalidConstructorPath {
                            path: object.path.to_string(),
                            constructor: spec.id.clone(),
                            target: path.clone(),
                            reason,
                        }
                    })?;
                    path.clone()
                }
                None => property_target(object, &param.id, resolver, naming).ok_or_else(|| {
                    GenError::UnknownConstructorProperty {
                        path: object.path.to_string(),
                        constructor: spec.id.clone(),
                        param: param.id.clone(),
                    }
                })?,
            };
            params.push(ConstructorParam {
                name: naming.param_name(&param.id),
                default: param.default.clone(),
                target,
            });
        }

        constructors.push(Constructor {
            id: spec.id.clone(),
            params,
        });
    }

    Ok(constructors)
}

/// Setter path for a parameter named after one of the object's own fields
fn property_target(
    object: &ApiObject,
    field: &str,
    resolver: &ReferenceResolver<'_>,
    naming: &dyn NamingPolicy,
) -> Option<String> {
    let property = object
        .property(field, PropertyKind::Method)
        .filter(|p| p.is_emitted())?;
    match resolver.resolve(property) {
        Resolution::Mixin(_) => Some(format!("{}.{}.mixinInstance", MIXIN_NAMESPACE, property.identifier)),
        _ => Some(naming.setter_id(&property.identifier)),
    }
}

/// Check that a dotted setter path such as `mixin.metadata.withName`
/// resolves against the object and the objects its mixins expand.
fn validate_path<'a>(
    object: &'a ApiObject,
    path: &str,
    resolver: &ReferenceResolver<'a>,
    naming: &dyn NamingPolicy,
) -> std::result::Result<(), String> {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((function, namespaces)) = segments.split_last() else {
        return Err("empty path".to_string());
    };

    let mut current = object;
    let mut in_mixin = false;
    let mut expanded = false;

    for (i, segment) in namespaces.iter().enumerate() {
        if i == 0 && *segment == MIXIN_NAMESPACE {
            in_mixin = true;
            continue;
        }
        if !in_mixin {
            return Err(format!("'{}' is not a namespace of {}", segment, current.kind()));
        }
        let next = current
            .sorted_properties()
            .filter(|p| p.identifier == *segment)
            .find_map(|p| match resolver.resolve(p) {
                Resolution::Mixin(target) => Some(target),
                _ => None,
            });
        match next {
            Some(target) => {
                current = target;
                expanded = true;
            }
            None => {
                return Err(format!("{} has no mixin namespace '{}'", current.kind(), segment));
            }
        }
    }

    if in_mixin && !expanded {
        return Err("path stops at the mixin namespace".to_string());
    }
    if namespace_functions(current, resolver, naming, expanded).contains(*function) {
        Ok(())
    } else {
        Err(format!("{} has no function '{}'", current.kind(), function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customize::{CustomizationTable, ParamSpec};
    use crate::naming::JsonnetNaming;

    const POD_SCHEMA: &str = r##"{
        "info": {"title": "Kubernetes", "version": "v1.8.0"},
        "definitions": {
            "io.k8s.api.core.v1.Pod": {
                "description": "Pod is a collection of containers.",
                "properties": {
                    "apiVersion": {"type": "string"},
                    "kind": {"type": "string"},
                    "metadata": {"$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"},
                    "spec": {"$ref": "#/definitions/io.k8s.api.core.v1.PodSpec"}
                },
                "x-kubernetes-group-version-kind": [{"group": "", "version": "v1", "kind": "Pod"}]
            },
            "io.k8s.api.core.v1.PodSpec": {
                "properties": {
                    "containers": {"type": "array", "items": {"$ref": "#/definitions/io.k8s.api.core.v1.Container"}},
                    "hostname": {"type": "string"}
                }
            },
            "io.k8s.api.core.v1.Container": {
                "properties": {
                    "image": {"type": "string"},
                    "name": {"type": "string"}
                }
            },
            "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta": {
                "properties": {
                    "labels": {"type": "object"},
                    "name": {"type": "string"}
                }
            },
            "io.k8s.apimachinery.pkg.util.intstr.IntOrString": {"type": "string"}
        }
    }"##;

    fn build(schema: &str, table: &CustomizationTable) -> Result<(Root, Diagnostics)> {
        let document = SchemaDocument::from_json_str(schema).unwrap();
        let naming = JsonnetNaming::default();
        let mut diagnostics = Diagnostics::new();
        let root = build_model(document, Provenance::default(), &naming, table, &mut diagnostics)?;
        Ok((root, diagnostics))
    }

    #[test]
    fn test_visible_hidden_partition() {
        let (root, _) = build(POD_SCHEMA, &CustomizationTable::default()).unwrap();

        let core = root.group(Tree::Visible, "core").unwrap();
        let v1 = core.versioned_api("v1").unwrap();
        assert!(v1.object("Pod").is_some());
        assert!(v1.object("PodSpec").is_none());

        let hidden_core = root.group(Tree::Hidden, "core").unwrap();
        assert!(hidden_core.versioned_api("v1").unwrap().object("PodSpec").is_some());
        assert!(root.group(Tree::Hidden, "meta").is_some());
        assert_eq!(core.qualified_name.as_deref(), Some(""));
    }

    #[test]
    fn test_unversioned_definition_is_skipped() {
        let (root, diagnostics) = build(POD_SCHEMA, &CustomizationTable::default()).unwrap();
        assert!(root
            .object_by_definition(&"io.k8s.apimachinery.pkg.util.intstr.IntOrString".into())
            .is_none());
        assert_eq!(
            diagnostics
                .with_code(crate::diagnostics::DiagnosticCode::UnversionedDefinition)
                .count(),
            1
        );
    }

    #[test]
    fn test_type_aliases_are_synthesized() {
        let (root, _) = build(POD_SCHEMA, &CustomizationTable::default()).unwrap();
        let pod_spec = root
            .object_by_definition(&"io.k8s.api.core.v1.PodSpec".into())
            .unwrap();

        let alias = pod_spec.property("containers", PropertyKind::TypeAlias).unwrap();
        assert_eq!(alias.identifier, "containersType");
        assert_eq!(alias.reference.as_ref().unwrap().as_str(), "io.k8s.api.core.v1.Container");

        let order: Vec<&str> = pod_spec.sorted_properties().map(|p| p.identifier.as_str()).collect();
        assert_eq!(order, ["containers", "containersType", "hostname"]);
    }

    #[test]
    fn test_default_constructor() {
        let (root, _) = build(POD_SCHEMA, &CustomizationTable::default()).unwrap();
        let pod = root.object_by_definition(&"io.k8s.api.core.v1.Pod".into()).unwrap();
        assert_eq!(pod.constructors().len(), 1);
        assert_eq!(pod.constructors()[0].id, "new");
        assert!(pod.constructors()[0].params.is_empty());
    }

    #[test]
    fn test_custom_constructor_targets() {
        let mut table = CustomizationTable::default();
        table.release_mut("v1.8.0").constructors.insert(
            "io.k8s.api.core.v1.Pod".to_string(),
            vec![ConstructorSpec::new(
                "new",
                vec![
                    ParamSpec::new("name").with_path("mixin.metadata.withName"),
                    ParamSpec::new("spec"),
                ],
            )],
        );
        let (root, _) = build(POD_SCHEMA, &table).unwrap();
        let pod = root.object_by_definition(&"io.k8s.api.core.v1.Pod".into()).unwrap();
        let params = &pod.constructors()[0].params;
        assert_eq!(params[0].target, "mixin.metadata.withName");
        assert_eq!(params[1].target, "mixin.spec.mixinInstance");
    }

    #[test]
    fn test_constructor_unknown_property_is_fatal() {
        let mut table = CustomizationTable::default();
        table.release_mut("*").constructors.insert(
            "io.k8s.api.core.v1.Container".to_string(),
            vec![ConstructorSpec::new("new", vec![ParamSpec::new("command")])],
        );
        let err = build(POD_SCHEMA, &table).unwrap_err();
        assert!(matches!(err, GenError::UnknownConstructorProperty { ref param, .. } if param == "command"));
    }

    #[test]
    fn test_constructor_bad_path_is_fatal() {
        let mut table = CustomizationTable::default();
        table.release_mut("*").constructors.insert(
            "io.k8s.api.core.v1.Pod".to_string(),
            vec![ConstructorSpec::new(
                "new",
                vec![ParamSpec::new("name").with_path("mixin.metadata.withNope")],
            )],
        );
        let err = build(POD_SCHEMA, &table).unwrap_err();
        assert!(matches!(err, GenError::InvalidConstructorPath { .. }));
    }

    #[test]
    fn test_constructor_shadowing_property_is_fatal() {
        let mut table = CustomizationTable::default();
        table.release_mut("*").constructors.insert(
            "io.k8s.api.core.v1.Container".to_string(),
            vec![ConstructorSpec::new("withImage", vec![])],
        );
        let err = build(POD_SCHEMA, &table).unwrap_err();
        assert!(matches!(err, GenError::ConstructorShadowsProperty { .. }));
    }

    #[test]
    fn test_duplicate_kind_is_fatal() {
        let schema = r#"{"definitions": {
            "io.k8s.api.core.v1.Thing": {"properties": {"a": {"type": "string"}}},
            "io.k8s.other.core.v1.Thing": {"properties": {"b": {"type": "string"}}}
        }}"#;
        let err = build(schema, &CustomizationTable::default()).unwrap_err();
        assert!(matches!(err, GenError::DuplicateKind { ref kind, .. } if kind == "Thing"));
    }

    #[test]
    fn test_kind_identifier_collision_is_fatal() {
        let schema = r#"{"definitions": {
            "io.k8s.api.core.v1.Thing": {},
            "io.k8s.api.core.v1.thing": {}
        }}"#;
        let err = build(schema, &CustomizationTable::default()).unwrap_err();
        assert!(matches!(err, GenError::KindIdentifierCollision { .. }));
    }

    #[test]
    fn test_mixin_named_like_target_kind_is_fatal() {
        let schema = r##"{"definitions": {
            "io.k8s.api.core.v1.Holder": {"properties": {
                "spec": {"$ref": "#/definitions/io.k8s.api.core.v1.spec"}
            }},
            "io.k8s.api.core.v1.spec": {"properties": {"x": {"type": "string"}}}
        }}"##;
        let err = build(schema, &CustomizationTable::default()).unwrap_err();
        assert!(matches!(
            err,
            GenError::MixinKindCollision { ref path, ref identifier, .. }
                if path == "io.k8s.api.core.v1.Holder.spec" && identifier == "spec"
        ));
    }

    #[test]
    fn test_mixin_named_like_unrelated_kind_case_is_allowed() {
        let schema = r##"{"definitions": {
            "io.k8s.api.core.v1.Holder": {"properties": {
                "spec": {"$ref": "#/definitions/io.k8s.api.core.v1.Spec"}
            }},
            "io.k8s.api.core.v1.Spec": {"properties": {"x": {"type": "string"}}}
        }}"##;
        assert!(build(schema, &CustomizationTable::default()).is_ok());
    }

    #[test]
    fn test_setter_function_collision_is_fatal() {
        let schema = r#"{"definitions": {
            "io.k8s.api.core.v1.Holder": {"properties": {
                "foo": {"type": "object"},
                "fooMixin": {"type": "string"}
            }}
        }}"#;
        let err = build(schema, &CustomizationTable::default()).unwrap_err();
        assert!(matches!(
            err,
            GenError::PropertyIdentifierCollision { ref property, ref identifier, .. }
                if property == "fooMixin" && identifier == "withFooMixin"
        ));
    }

    #[test]
    fn test_alias_collision_is_fatal() {
        let schema = r##"{"definitions": {
            "io.k8s.api.core.v1.Holder": {"properties": {
                "item": {"$ref": "#/definitions/io.k8s.api.core.v1.Item"},
                "itemType": {"type": "string"}
            }},
            "io.k8s.api.core.v1.Item": {"properties": {"x": {"type": "string"}}}
        }}"##;
        let err = build(schema, &CustomizationTable::default()).unwrap_err();
        assert!(matches!(err, GenError::TypeAliasCollision { ref alias, .. } if alias == "itemType"));
    }

    #[test]
    fn test_malformed_property_is_fatal() {
        let schema = r#"{"definitions": {"io.k8s.api.core.v1.Bad": {"properties": {"x": {}}}}}"#;
        let err = build(schema, &CustomizationTable::default()).unwrap_err();
        assert!(matches!(err, GenError::MalformedProperty { ref property, .. } if property == "x"));
    }

    #[test]
    fn test_blacklisted_properties_are_filtered() {
        let mut table = CustomizationTable::default();
        table
            .release_mut("v1.8.0")
            .blacklist
            .insert("io.k8s.api.core.v1.PodSpec".to_string(), ["containers".to_string()].into());
        let (root, _) = build(POD_SCHEMA, &table).unwrap();
        let pod_spec = root
            .object_by_definition(&"io.k8s.api.core.v1.PodSpec".into())
            .unwrap();
        let names: Vec<&str> = pod_spec.sorted_properties().map(|p| p.identifier.as_str()).collect();
        assert_eq!(names, ["hostname"]);
    }
}
