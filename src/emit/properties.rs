//! Property Emission Rules
//!
//! Line templates for each property flavour. Every setter returns `self`
//! merged with a patch; under a mixin qualifier the patch is wrapped so it
//! lands inside the referencing field instead of at the object root.
//!
//! | Shape              | Output                                              |
//! |--------------------|-----------------------------------------------------|
//! | scalar / plain ref | `withX(x):: self + {x: x},`                         |
//! | object             | setter + `withXMixin(x):: self + {x+: x},`          |
//! | array              | list-coercing setter + list-coercing mixin setter   |
//! | type alias         | `xType:: hidden.group.version.kind,`                |

use crate::model::{ApiObject, Constructor, MixinQualifier, Property, PropertyShape};
use crate::naming::{object_key, NamingPolicy};

/// Patch operator for a field: replace (`:`) or merge (`+:`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Patch {
    Replace,
    Merge,
}

impl Patch {
    fn operator(self) -> &'static str {
        match self {
            Self::Replace => ":",
            Self::Merge => "+:",
        }
    }
}

/// `{key: value}`, wrapped in the qualifier if there is one
fn patch(
    key: &str,
    value: &str,
    op: Patch,
    qualifier: Option<&MixinQualifier>,
) -> String {
    let literal = format!("{{{}{} {}}}", key, op.operator(), value);
    match qualifier {
        Some(q) => q.wrap(&literal),
        None => literal,
    }
}

fn assign(property: &Property, naming: &dyn NamingPolicy, op: Patch, qualifier: Option<&MixinQualifier>) -> String {
    let key = naming.field_key(&property.name);
    let param = naming.param_name(&property.name);
    format!("self + {}", patch(&key, &param, op, qualifier))
}

/// `if std.type(x) == "array" then {x: x} else {x: [x]}`
fn assign_list(
    property: &Property,
    naming: &dyn NamingPolicy,
    op: Patch,
    qualifier: Option<&MixinQualifier>,
) -> String {
    let key = naming.field_key(&property.name);
    let param = naming.param_name(&property.name);
    format!(
        "self + if std.type({p}) == \"array\" then {list} else {single}",
        p = param,
        list = patch(&key, &param, op, qualifier),
        single = patch(&key, &format!("[{}]", param), op, qualifier),
    )
}

/// Setter lines for a property rendered as ordinary setters. References
/// that could not be expanded use the scalar form.
pub fn setter_lines(
    property: &Property,
    naming: &dyn NamingPolicy,
    qualifier: Option<&MixinQualifier>,
) -> Vec<String> {
    let setter = naming.setter_id(&property.identifier);
    let param = naming.param_name(&property.name);

    match &property.shape {
        PropertyShape::Array { .. } => vec![
            format!(
                "{}({}):: {},",
                setter,
                param,
                assign_list(property, naming, Patch::Replace, qualifier)
            ),
            format!(
                "{}({}):: {},",
                naming.mixin_id(&property.identifier),
                param,
                assign_list(property, naming, Patch::Merge, qualifier)
            ),
        ],
        PropertyShape::Object => vec![
            format!("{}({}):: {},", setter, param, assign(property, naming, Patch::Replace, qualifier)),
            format!(
                "{}({}):: {},",
                naming.mixin_id(&property.identifier),
                param,
                assign(property, naming, Patch::Merge, qualifier)
            ),
        ],
        PropertyShape::Reference | PropertyShape::Scalar(_) => {
            vec![format!("{}({}):: {},", setter, param, assign(property, naming, Patch::Replace, qualifier))]
        }
    }
}

/// `containersType:: hidden.core.v1.container,`
pub fn alias_line(property: &Property, target: &str) -> String {
    format!("{}:: {},", object_key(&property.identifier), target)
}

/// Constructor function line. Top-level objects seed `apiVersion` and
/// `kind`; an empty body is the empty object.
pub fn constructor_line(object: &ApiObject, constructor: &Constructor) -> String {
    let params: Vec<String> = constructor
        .params
        .iter()
        .map(|p| match &p.default {
            Some(default) => format!("{}={}", p.name, default),
            None => p.name.clone(),
        })
        .collect();

    let mut body: Vec<String> = Vec::new();
    if object.top_level {
        body.push("apiVersion".to_string());
        body.push("kind".to_string());
    }
    body.extend(
        constructor
            .params
            .iter()
            .map(|p| format!("self.{}({})", p.target, p.name)),
    );
    let body = if body.is_empty() {
        "{}".to_string()
    } else {
        body.join(" + ")
    };

    format!("{}({}):: {},", object_key(&constructor.id), params.join(", "), body)
}

/// `local kind = {kind: "Pod"},`
pub fn kind_line(object: &ApiObject) -> String {
    format!(
        "local kind = {{kind: {}}},",
        serde_json::Value::String(object.resource_kind.clone())
    )
}

/// `local apiVersion = {apiVersion: "apps/v1beta2"},`
pub fn api_version_line(api_version: &str) -> String {
    format!(
        "local apiVersion = {{apiVersion: {}}},",
        serde_json::Value::String(api_version.to_string())
    )
}
