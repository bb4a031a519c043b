//! Post-order Emitter
//!
//! Renders the model bottom-up: properties (through any mixin expansion),
//! then their object, version, group and finally the root. Each node's
//! fragment is computed once per rendering context and cached; parents
//! splice cached fragments, possibly more than once.
//!
//! The only context is the innermost mixin qualifier. A fragment depends
//! on nothing else, so the cache key is `(node, qualifier name)`.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::buffer::LineBuffer;
use super::properties::{alias_line, api_version_line, constructor_line, kind_line, setter_lines};
use super::GenerationStats;
use crate::model::{
    ApiObject, Group, MixinQualifier, ObjectId, Property, PropertyId, ReferenceResolver,
    Resolution, Root, Tree, VersionedApi,
};
use crate::naming::{object_key, NamingPolicy};

/// Identity of a rendered node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NodeId {
    Root,
    Group(Tree, String),
    VersionedApi(Tree, String, String),
    Object(ObjectId),
    Property(PropertyId),
}

type CacheKey = (NodeId, Option<String>);

/// Memoizing renderer over a finished model
pub struct Emitter<'a> {
    root: &'a Root,
    resolver: ReferenceResolver<'a>,
    naming: &'a dyn NamingPolicy,
    cache: HashMap<CacheKey, Rc<LineBuffer>>,
    stats: GenerationStats,
}

impl<'a> Emitter<'a> {
    pub fn new(root: &'a Root, naming: &'a dyn NamingPolicy) -> Self {
        Self {
            root,
            resolver: ReferenceResolver::new(root),
            naming,
            cache: HashMap::new(),
            stats: GenerationStats::default(),
        }
    }

    /// Counts gathered so far
    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Number of distinct cached fragments
    pub fn cached_fragments(&self) -> usize {
        self.cache.len()
    }

    fn cached(&self, key: &CacheKey) -> Option<Rc<LineBuffer>> {
        self.cache.get(key).cloned()
    }

    fn store(&mut self, key: CacheKey, buffer: LineBuffer) -> Rc<LineBuffer> {
        let buffer = Rc::new(buffer);
        self.cache.insert(key, Rc::clone(&buffer));
        buffer
    }

    // =========================================================================
    // Root, Groups, Versions
    // =========================================================================

    /// Render the whole library
    pub fn emit_root(&mut self) -> Rc<LineBuffer> {
        let key = (NodeId::Root, None);
        if let Some(buffer) = self.cached(&key) {
            return buffer;
        }

        let root = self.root;
        let mut groups = Vec::new();
        for group in root.groups() {
            groups.push(self.emit_group(Tree::Visible, group));
        }
        let mut hidden = Vec::new();
        for group in root.hidden_groups() {
            hidden.push(self.emit_group(Tree::Hidden, group));
        }

        let mut buffer = LineBuffer::new();
        buffer.write_lines(header_lines(root));
        buffer.write_line("{");
        buffer.indent();
        for group in &groups {
            buffer.splice(group);
        }
        buffer.write_line("local hidden = {");
        buffer.indent();
        for group in &hidden {
            buffer.splice(group);
        }
        buffer.dedent();
        buffer.write_line("},");
        buffer.dedent();
        buffer.write_line("}");

        self.store(key, buffer)
    }

    fn emit_group(&mut self, tree: Tree, group: &'a Group) -> Rc<LineBuffer> {
        let key = (NodeId::Group(tree, group.name.clone()), None);
        if let Some(buffer) = self.cached(&key) {
            return buffer;
        }
        debug!(group = %group.name, ?tree, "emitting group");

        let mut versions = Vec::new();
        for api in group.versioned_apis() {
            versions.push(self.emit_versioned_api(tree, group, api));
        }

        let mut buffer = LineBuffer::new();
        buffer.write_line(format!("{}:: {{", object_key(&group.name)));
        buffer.indent();
        for version in &versions {
            buffer.splice(version);
        }
        buffer.dedent();
        buffer.write_line("},");

        match tree {
            Tree::Visible => self.stats.groups += 1,
            Tree::Hidden => self.stats.hidden_groups += 1,
        }
        self.store(key, buffer)
    }

    fn emit_versioned_api(&mut self, tree: Tree, group: &'a Group, api: &'a VersionedApi) -> Rc<LineBuffer> {
        let key = (
            NodeId::VersionedApi(tree, group.name.clone(), api.version.clone()),
            None,
        );
        if let Some(buffer) = self.cached(&key) {
            return buffer;
        }

        let mut objects = Vec::new();
        for object in api.objects() {
            objects.push(self.emit_object(object));
        }

        let mut buffer = LineBuffer::new();
        buffer.write_line(format!("{}:: {{", object_key(&api.version)));
        buffer.indent();
        if tree == Tree::Visible {
            buffer.write_line(api_version_line(&group.api_version(&api.version)));
        }
        for object in &objects {
            buffer.splice(object);
        }
        buffer.dedent();
        buffer.write_line("},");

        self.store(key, buffer)
    }

    // =========================================================================
    // Objects
    // =========================================================================

    /// Render one object: constructors, setters, aliases and its `mixin`
    /// namespace
    pub fn emit_object(&mut self, object: &'a ApiObject) -> Rc<LineBuffer> {
        let key = (NodeId::Object(object.id.clone()), None);
        if let Some(buffer) = self.cached(&key) {
            return buffer;
        }
        debug!(object = %object.id, "emitting object");

        let mut direct = Vec::new();
        let mut mixins = Vec::new();
        for property in object.sorted_properties() {
            let fragment = self.emit_property(property, None);
            match self.resolver.resolve(property) {
                Resolution::Mixin(_) => mixins.push(fragment),
                _ => direct.push(fragment),
            }
        }

        let mut buffer = LineBuffer::new();
        buffer.write_comments(object.comments.lines());
        buffer.write_line(format!("{}:: {{", object_key(&object.identifier)));
        buffer.indent();
        if object.top_level {
            buffer.write_line(kind_line(object));
        }
        for constructor in object.constructors() {
            buffer.write_line(constructor_line(object, constructor));
        }
        for fragment in &direct {
            buffer.splice(fragment);
        }
        if !mixins.is_empty() {
            buffer.write_line("mixin:: {");
            buffer.indent();
            for fragment in &mixins {
                buffer.splice(fragment);
            }
            buffer.dedent();
            buffer.write_line("},");
        }
        buffer.dedent();
        buffer.write_line("},");

        self.stats.objects += 1;
        self.stats.mixins += mixins.len();
        self.store(key, buffer)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Render one property under an optional enclosing qualifier
    pub fn emit_property(&mut self, property: &'a Property, qualifier: Option<&MixinQualifier>) -> Rc<LineBuffer> {
        let resolution = self.resolver.resolve(property);

        // aliases don't depend on the enclosing expansion
        let context = match resolution {
            Resolution::TypeAlias(_) | Resolution::SkippedAlias => None,
            _ => qualifier.map(|q| q.name().to_string()),
        };
        let key = (NodeId::Property(property.id.clone()), context);
        if let Some(buffer) = self.cached(&key) {
            return buffer;
        }

        let mut buffer = LineBuffer::new();
        match resolution {
            Resolution::Setter | Resolution::PlainReference => {
                // each body carries the field's documentation
                for line in setter_lines(property, self.naming, qualifier) {
                    buffer.write_comments(property.comments.lines());
                    buffer.write_line(line);
                }
            }
            Resolution::TypeAlias(target) => {
                buffer.write_line(alias_line(property, &target));
            }
            Resolution::SkippedAlias => {}
            Resolution::Mixin(_) => {
                if let Some(mixin) = self.resolver.ref_mixin(property, qualifier) {
                    let mut children = Vec::new();
                    for child in mixin.target.sorted_properties() {
                        children.push(self.emit_property(child, Some(&mixin.qualifier)));
                    }

                    buffer.write_comments(property.comments.lines());
                    buffer.write_line(format!("{}:: {{", object_key(&property.identifier)));
                    buffer.indent();
                    buffer.write_line(mixin.definition(self.naming));
                    buffer.write_line(mixin.instance(self.naming));
                    for child in &children {
                        buffer.splice(child);
                    }
                    buffer.dedent();
                    buffer.write_line("},");
                }
            }
        }

        if key.1.is_none() {
            self.count_property(property);
        }
        self.store(key, buffer)
    }

    /// Count model properties once, at their unqualified rendering
    fn count_property(&mut self, property: &Property) {
        if property.is_type_alias() {
            self.stats.aliases += 1;
        } else {
            self.stats.properties += 1;
        }
    }
}

fn header_lines(root: &Root) -> Vec<String> {
    let mut lines = vec!["// AUTOGENERATED by libsonnet-gen. DO NOT MODIFY.".to_string()];
    let document = root.document();
    if !document.info.title.is_empty() || !document.release().is_empty() {
        let source = format!("{} {}", document.info.title, document.release());
        lines.push(format!("// Schema: {}", source.trim()));
    }
    let provenance = root.provenance();
    if let Some(revision) = &provenance.library_revision {
        lines.push(format!("// Library revision: {}", revision));
    }
    if let Some(revision) = &provenance.schema_revision {
        lines.push(format!("// Schema revision: {}", revision));
    }
    lines
}
