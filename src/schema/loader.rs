//! Builds a [`VariantSchema`] from XML description documents.
//!
//! A variant is described by a master document holding the payload revision
//! names, the master property list and the record templates. Property nodes
//! may pull their body from separate struct, array, enum or bitfield files,
//! which are loaded once and shared.
//!
//! Problems with individual nodes are not fatal: the node is skipped, the
//! problem is logged and collected in a [`LoadReport`]. Only an unreadable
//! master document (or its external property list) aborts the load.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use super::source::{sibling_path, DescriptionSource};
use super::{BitFlag, CookPreference, Enumerator, NodeId, PropertyKind, SchemaNode, VariantSchema};
use crate::codec::TextCodec;
use crate::util::{Error, FourCC, Result};
use crate::value::ScalarValue;
use crate::xml::XmlElement;

/// A recoverable problem with one description node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaError {
    pub source_name: String,
    pub id: Option<u32>,
    pub reason: String,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}: property {id:#010X}: {}", self.source_name, self.reason),
            None => write!(f, "{}: {}", self.source_name, self.reason),
        }
    }
}

/// Schema errors collected while loading a description set.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    errors: Vec<SchemaError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[SchemaError] {
        &self.errors
    }

    pub fn push(&mut self, error: SchemaError) {
        self.errors.push(error);
    }

    pub fn merge(&mut self, other: LoadReport) {
        self.errors.extend(other.errors);
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "no schema errors");
        }
        write!(f, "{} schema error(s):", self.errors.len())?;
        for e in &self.errors {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

struct NodeError {
    id: Option<u32>,
    reason: String,
}

type NodeResult<T> = std::result::Result<T, NodeError>;

fn fail<T>(id: Option<u32>, reason: impl Into<String>) -> NodeResult<T> {
    Err(NodeError {
        id,
        reason: reason.into(),
    })
}

fn parse_id(text: &str) -> Option<u32> {
    u32::parse(text.trim()).ok()
}

fn parse_value(kind: PropertyKind, text: &str, id: u32, what: &str) -> NodeResult<ScalarValue> {
    ScalarValue::parse(kind, text).or_else(|e| fail(Some(id), format!("bad {what} '{text}': {e}")))
}

/// Loader state for one variant.
pub struct SchemaLoader<'s> {
    source: &'s dyn DescriptionSource,
    schema: VariantSchema,
    report: LoadReport,
    master_name: String,
    /// Documents currently being parsed, master first.
    loading: Vec<String>,
    /// Property files already loaded, keyed by path and master inheritance;
    /// `None` if loading failed.
    files: BTreeMap<(String, bool), Option<NodeId>>,
    inherit_master: bool,
}

impl<'s> SchemaLoader<'s> {
    /// Load one variant from its master description.
    pub fn load_variant(
        source: &'s dyn DescriptionSource,
        tag: FourCC,
        name: &str,
        master: &str,
    ) -> Result<(VariantSchema, LoadReport)> {
        let root = read_document(source, master).map_err(|reason| Error::schema(master, reason))?;

        let mut loader = Self {
            source,
            schema: VariantSchema::new(tag, name),
            report: LoadReport::default(),
            master_name: master.to_string(),
            loading: vec![master.to_string()],
            files: BTreeMap::new(),
            inherit_master: false,
        };
        loader.load_master(&root)?;

        debug!(
            variant = %tag,
            nodes = loader.schema.len(),
            templates = loader.schema.templates().count(),
            errors = loader.report.len(),
            "loaded variant schema"
        );
        Ok((loader.schema, loader.report))
    }

    fn load_master(&mut self, root: &XmlElement) -> Result<()> {
        if let Some(text) = root.child_text("format") {
            let revision = u32::parse(text)
                .map_err(|e| Error::schema(&self.master_name, format!("bad format revision: {e}")))?;
            self.schema.set_format_revision(revision);
        }
        if let Some(versions) = root.child("versions") {
            for v in versions.children_named("version") {
                self.schema.push_revision(v.text.trim());
            }
        }

        if let Some(props) = root.child("properties") {
            match props.attr("file") {
                Some(file) => {
                    let path = sibling_path(&self.master_name, file);
                    let list = read_document(self.source, &path)
                        .map_err(|reason| Error::schema(&path, reason))?;
                    self.loading.push(path);
                    self.load_master_list(&list);
                    self.loading.pop();
                }
                None => self.load_master_list(props),
            }
        }

        self.inherit_master = true;
        if let Some(templates) = root.child("templates") {
            for el in templates.children_named("template") {
                self.load_template(el);
            }
        }
        Ok(())
    }

    fn load_master_list(&mut self, list: &XmlElement) {
        for el in &list.children {
            let Some(node) = self.parse_node(el, None) else {
                continue;
            };
            let id = self.schema.node(node).id;
            if !self.schema.insert_master(id, node) {
                self.record(Some(id), "duplicate identifier in master list");
            }
        }
    }

    fn load_template(&mut self, el: &XmlElement) {
        let Some(id) = el.attr("ID").and_then(parse_id) else {
            self.record(None, "template has no valid ID");
            return;
        };

        match el.attr("file") {
            Some(file) => {
                let path = sibling_path(&self.master_name, file);
                let doc = match read_document(self.source, &path) {
                    Ok(doc) => doc,
                    Err(reason) => {
                        self.record_in(&path, Some(id), reason);
                        return;
                    }
                };
                if doc.name != "template" && doc.name != "struct" {
                    self.record_in(&path, Some(id), format!("expected <template> root, found <{}>", doc.name));
                    return;
                }
                let name = el.attr("name").or(doc.attr("name"));
                self.loading.push(path);
                self.build_template(id, name, &doc);
                self.loading.pop();
            }
            None => self.build_template(id, el.attr("name"), el),
        }
    }

    fn build_template(&mut self, id: u32, name: Option<&str>, body: &XmlElement) {
        let Some(name) = name else {
            self.record(Some(id), "template has no name");
            return;
        };
        let mut node = SchemaNode::new(PropertyKind::Struct, id, name);
        node.single_property = body.attr("type") == Some("single");
        self.merge_children(&mut node, body);

        let node = self.schema.push(node);
        if !self.schema.insert_template(id, node) {
            self.record(Some(id), "duplicate template identifier");
        }
    }

    fn parse_node(&mut self, el: &XmlElement, base: Option<NodeId>) -> Option<NodeId> {
        if let Some(shared) = self.shared_reference(el, base) {
            return Some(shared);
        }
        match self.build_node(el, base) {
            Ok(node) => Some(self.schema.push(node)),
            Err(e) => {
                self.record(e.id, e.reason);
                None
            }
        }
    }

    /// A bare `<property ID=".."/>` reuses the inherited node itself.
    fn shared_reference(&self, el: &XmlElement, base: Option<NodeId>) -> Option<NodeId> {
        if !el.children.is_empty() || el.attributes.iter().any(|(k, _)| k != "ID") {
            return None;
        }
        let id = parse_id(el.attr("ID")?)?;
        let shared = base.or_else(|| self.inherit_master.then(|| self.schema.master(id)).flatten())?;
        let kind = self.schema.node(shared).kind;
        (el.name == "property" || el.name == kind.name()).then_some(shared)
    }

    /// Build one node. `base` is an existing sibling with the same identifier
    /// whose parameters this declaration overrides.
    fn build_node(&mut self, el: &XmlElement, base: Option<NodeId>) -> NodeResult<SchemaNode> {
        let explicit = match el.name.as_str() {
            "property" => match el.attr("type") {
                Some(t) => Some(t.parse::<PropertyKind>().or_else(|e| fail(None, e.to_string()))?),
                None => None,
            },
            "struct" => Some(PropertyKind::Struct),
            "array" => Some(PropertyKind::Array),
            "enum" => Some(PropertyKind::Enum),
            "bitfield" => Some(PropertyKind::Bitfield),
            other => return fail(None, format!("unexpected <{other}> in property list")),
        };
        let id = match el.attr("ID") {
            Some(text) => match parse_id(text) {
                Some(id) => id,
                None => return fail(None, format!("invalid ID '{text}'")),
            },
            None => return fail(None, "property has no ID"),
        };

        let inherited = base
            .or_else(|| self.inherit_master.then(|| self.schema.master(id)).flatten())
            .map(|n| self.schema.node(n).clone());
        let kind = match (explicit, &inherited) {
            (Some(kind), _) => kind,
            (None, Some(n)) => n.kind,
            (None, None) => return fail(Some(id), "property has no type and no master declaration"),
        };
        let mut node = match inherited {
            Some(n) if n.kind == kind => n,
            _ => SchemaNode::new(kind, id, ""),
        };
        node.id = id;
        if let Some(name) = el.attr("name") {
            node.name = name.to_string();
        }
        if node.name.is_empty() {
            return fail(Some(id), "property has no name and no master declaration");
        }

        self.apply_params(&mut node, el)?;
        match kind {
            PropertyKind::Struct => self.build_struct(&mut node, el)?,
            PropertyKind::Array => self.build_array(&mut node, el)?,
            PropertyKind::Enum => self.build_enum(&mut node, el)?,
            PropertyKind::Bitfield => self.build_bitfield(&mut node, el)?,
            _ => {}
        }
        if kind == PropertyKind::Enum && node.default.is_none() {
            node.default = node.enumerators.first().map(|e| ScalarValue::Enum(e.id));
        }
        Ok(node)
    }

    fn apply_params(&mut self, node: &mut SchemaNode, el: &XmlElement) -> NodeResult<()> {
        let (id, kind) = (node.id, node.kind);

        if let Some(text) = el.child_text("default") {
            if kind.is_container() {
                return fail(Some(id), format!("{kind} properties take no default"));
            }
            node.default = Some(parse_value(kind, text, id, "default")?);
        }
        if let Some(text) = el.child_text("range") {
            let Some((lo, hi)) = text.split_once(',') else {
                return fail(Some(id), format!("range '{text}' is not 'min, max'"));
            };
            node.range = Some((
                parse_value(kind, lo.trim(), id, "range")?,
                parse_value(kind, hi.trim(), id, "range")?,
            ));
        }
        if let Some(text) = el.child_text("cook_pref") {
            node.cook_preference = text
                .parse::<CookPreference>()
                .or_else(|e| fail(Some(id), e.to_string()))?;
        }
        if let Some(hex) = el.child("hex") {
            let text = hex.text.trim();
            node.hex = text.is_empty() || bool::parse(text).or_else(|e| fail(Some(id), e.to_string()))?;
        }
        if let Some(versions) = el.child("versions") {
            node.revisions.clear();
            for v in versions.children_named("version") {
                let name = v.text.trim();
                if self.schema.revision_index(name).is_none() {
                    self.record(Some(id), format!("unknown revision '{name}'"));
                    continue;
                }
                node.revisions.push(name.to_string());
            }
        }
        Ok(())
    }

    fn build_struct(&mut self, node: &mut SchemaNode, el: &XmlElement) -> NodeResult<()> {
        if el.name == "struct" {
            if let Some(t) = el.attr("type") {
                node.single_property = match t {
                    "single" => true,
                    "multi" => false,
                    other => return fail(Some(node.id), format!("unknown struct type '{other}'")),
                };
            }
        }
        if let Some(file) = el.attr("template") {
            let loaded = self.load_file(file, PropertyKind::Struct, node.id)?;
            let loaded = self.schema.node(loaded);
            if el.attr("type").is_none() || el.name != "struct" {
                node.single_property = loaded.single_property;
            }
            for &child in &loaded.children.clone() {
                self.replace_or_push(node, child);
            }
        }
        self.merge_children(node, el);
        Ok(())
    }

    fn build_array(&mut self, node: &mut SchemaNode, el: &XmlElement) -> NodeResult<()> {
        if let Some(file) = el.attr("template") {
            let loaded = self.load_file(file, PropertyKind::Array, node.id)?;
            let loaded = self.schema.node(loaded);
            node.children = loaded.children.clone();
            if loaded.element_name.is_some() {
                node.element_name = loaded.element_name.clone();
            }
        }
        if let Some(name) = el.child_text("element_name") {
            node.element_name = Some(name.to_string());
        }

        let mut element = match node.children.first() {
            Some(&e) => self.schema.node(e).clone(),
            None => SchemaNode::new(PropertyKind::Struct, node.id, "Element"),
        };
        if let Some(name) = &node.element_name {
            element.name = name.clone();
        }
        if el.child("properties").is_some() || node.children.is_empty() {
            self.merge_children(&mut element, el);
            node.children = vec![self.schema.push(element)];
        } else if element.name != self.schema.node(node.children[0]).name {
            node.children = vec![self.schema.push(element)];
        }
        Ok(())
    }

    fn build_enum(&mut self, node: &mut SchemaNode, el: &XmlElement) -> NodeResult<()> {
        if let Some(file) = el.attr("template") {
            let loaded = self.load_file(file, PropertyKind::Enum, node.id)?;
            node.enumerators = self.schema.node(loaded).enumerators.clone();
        }
        let Some(list) = el.child("enumerators") else {
            return Ok(());
        };
        for e in list.children_named("enumerator") {
            let (Some(id), Some(name)) = (e.attr("ID").and_then(parse_id), e.attr("name")) else {
                self.record(Some(node.id), "enumerator needs an ID and a name");
                continue;
            };
            match node.enumerators.iter_mut().find(|x| x.id == id) {
                Some(existing) => existing.name = name.to_string(),
                None => node.enumerators.push(Enumerator { id, name: name.to_string() }),
            }
        }
        Ok(())
    }

    fn build_bitfield(&mut self, node: &mut SchemaNode, el: &XmlElement) -> NodeResult<()> {
        if let Some(file) = el.attr("template") {
            let loaded = self.load_file(file, PropertyKind::Bitfield, node.id)?;
            node.flags = self.schema.node(loaded).flags.clone();
        }
        let Some(list) = el.child("flags") else {
            return Ok(());
        };
        for f in list.children_named("flag") {
            let (Some(mask), Some(name)) = (f.attr("mask").and_then(parse_id), f.attr("name")) else {
                self.record(Some(node.id), "flag needs a mask and a name");
                continue;
            };
            match node.flags.iter_mut().find(|x| x.mask == mask) {
                Some(existing) => existing.name = name.to_string(),
                None => node.flags.push(BitFlag { mask, name: name.to_string() }),
            }
        }
        Ok(())
    }

    /// Parse embedded `<properties>` into `node`, overriding children with
    /// the same identifier.
    fn merge_children(&mut self, node: &mut SchemaNode, el: &XmlElement) {
        let Some(props) = el.child("properties") else {
            return;
        };
        for child in &props.children {
            let base = child
                .attr("ID")
                .and_then(parse_id)
                .and_then(|id| node.children.iter().copied().find(|&c| self.schema.node(c).id == id));
            if let Some(parsed) = self.parse_node(child, base) {
                self.replace_or_push(node, parsed);
            }
        }
    }

    fn replace_or_push(&self, node: &mut SchemaNode, child: NodeId) {
        let id = self.schema.node(child).id;
        match node.children.iter_mut().find(|c| self.schema.node(**c).id == id) {
            Some(slot) => *slot = child,
            None => node.children.push(child),
        }
    }

    /// Load a struct, array, enum or bitfield body from its own document.
    fn load_file(&mut self, file: &str, kind: PropertyKind, owner: u32) -> NodeResult<NodeId> {
        let path = sibling_path(&self.master_name, file);
        let key = (path.clone(), self.inherit_master);
        if let Some(cached) = self.files.get(&key) {
            return match cached {
                Some(node) => Ok(*node),
                None => fail(Some(owner), format!("{path} failed to load")),
            };
        }
        if self.loading.contains(&path) {
            return fail(Some(owner), format!("circular template reference through {path}"));
        }

        let doc = match read_document(self.source, &path) {
            Ok(doc) => doc,
            Err(reason) => {
                self.files.insert(key, None);
                return fail(Some(owner), format!("{path}: {reason}"));
            }
        };
        if doc.name != kind.name() {
            self.files.insert(key, None);
            return fail(Some(owner), format!("{path}: expected <{kind}> root, found <{}>", doc.name));
        }

        debug!(file = %path, "loading property file");
        self.loading.push(path.clone());
        let mut node = SchemaNode::new(kind, owner, doc.attr("name").unwrap_or(file));
        let built = match kind {
            PropertyKind::Struct => self.build_struct(&mut node, &doc),
            PropertyKind::Array => self.build_array(&mut node, &doc),
            PropertyKind::Enum => self.build_enum(&mut node, &doc),
            _ => self.build_bitfield(&mut node, &doc),
        };
        self.loading.pop();

        match built {
            Ok(()) => {
                let id = self.schema.push(node);
                self.files.insert(key, Some(id));
                Ok(id)
            }
            Err(e) => {
                self.files.insert(key, None);
                Err(e)
            }
        }
    }

    fn current_source(&self) -> &str {
        self.loading.last().unwrap_or(&self.master_name)
    }

    fn record(&mut self, id: Option<u32>, reason: impl Into<String>) {
        let source = self.current_source().to_string();
        self.record_in(&source, id, reason);
    }

    fn record_in(&mut self, source_name: &str, id: Option<u32>, reason: impl Into<String>) {
        let error = SchemaError {
            source_name: source_name.to_string(),
            id,
            reason: reason.into(),
        };
        warn!(variant = %self.schema.tag(), "{error}");
        self.report.push(error);
    }
}

fn read_document(source: &dyn DescriptionSource, name: &str) -> std::result::Result<XmlElement, String> {
    source
        .read(name)
        .and_then(|text| XmlElement::parse(&text))
        .map_err(|e| e.to_string())
}
