//! Per-variant schema arena and shared node handles.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{NodeId, PropertyKind, SchemaNode};
use crate::util::FourCC;

/// All nodes declared for one variant tag.
///
/// Nodes live in a flat arena; parents refer to children by [`NodeId`], so a
/// node declared once in the master list can appear under many templates.
#[derive(Clone, Debug)]
pub struct VariantSchema {
    tag: FourCC,
    name: String,
    format_revision: u32,
    revisions: Vec<String>,
    nodes: Vec<SchemaNode>,
    master: BTreeMap<u32, NodeId>,
    templates: BTreeMap<u32, NodeId>,
}

impl VariantSchema {
    pub fn new(tag: FourCC, name: impl Into<String>) -> Self {
        Self {
            tag,
            name: name.into(),
            format_revision: 0,
            revisions: Vec::new(),
            nodes: Vec::new(),
            master: BTreeMap::new(),
            templates: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn tag(&self) -> FourCC {
        self.tag
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Revision marker from the master description's `<format>` element.
    pub fn format_revision(&self) -> u32 {
        self.format_revision
    }

    /// Payload revision names; the index is the revision number.
    pub fn revisions(&self) -> &[String] {
        &self.revisions
    }

    pub fn revision_name(&self, revision: u16) -> Option<&str> {
        self.revisions.get(revision as usize).map(String::as_str)
    }

    pub fn revision_index(&self, name: &str) -> Option<u16> {
        self.revisions
            .iter()
            .position(|r| r == name)
            .and_then(|i| u16::try_from(i).ok())
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.index()]
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &SchemaNode)> {
        self.node(id).children.iter().map(move |&c| (c, self.node(c)))
    }

    pub fn child_by_id(&self, parent: NodeId, id: u32) -> Option<NodeId> {
        self.children(parent).find(|(_, n)| n.id == id).map(|(c, _)| c)
    }

    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent).find(|(_, n)| n.name == name).map(|(c, _)| c)
    }

    /// Master-list node with the given identifier.
    pub fn master(&self, id: u32) -> Option<NodeId> {
        self.master.get(&id).copied()
    }

    pub fn masters(&self) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        self.master.iter().map(|(&id, &node)| (id, node))
    }

    /// Top-level record template with the given identifier.
    pub fn template(&self, id: u32) -> Option<NodeId> {
        self.templates.get(&id).copied()
    }

    pub fn template_by_name(&self, name: &str) -> Option<NodeId> {
        self.templates.values().copied().find(|&n| self.node(n).name == name)
    }

    pub fn templates(&self) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        self.templates.iter().map(|(&id, &node)| (id, node))
    }

    /// True if the node is declared for the given payload revision.
    ///
    /// Revisions the description never names are treated as applicable.
    pub fn is_applicable(&self, id: NodeId, revision: u16) -> bool {
        let node = self.node(id);
        if node.revisions.is_empty() {
            return true;
        }
        match self.revision_name(revision) {
            Some(name) => node.revisions.iter().any(|r| r == name),
            None => true,
        }
    }

    /// Number of fields a node occupies in its parent.
    ///
    /// A single-property struct counts as one field; other structs count
    /// their applicable children. With no revision every child counts.
    pub fn external_field_count(&self, id: NodeId, revision: Option<u16>) -> usize {
        let node = self.node(id);
        if node.kind != PropertyKind::Struct || node.single_property {
            return 1;
        }
        node.children
            .iter()
            .filter(|&&c| revision.map_or(true, |r| self.is_applicable(c, r)))
            .count()
    }

    pub(crate) fn push(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn set_format_revision(&mut self, revision: u32) {
        self.format_revision = revision;
    }

    pub(crate) fn push_revision(&mut self, name: impl Into<String>) {
        self.revisions.push(name.into());
    }

    /// Register a master node; returns false if the identifier is taken.
    pub(crate) fn insert_master(&mut self, id: u32, node: NodeId) -> bool {
        if self.master.contains_key(&id) {
            return false;
        }
        self.master.insert(id, node);
        true
    }

    /// Register a record template; returns false if the identifier is taken.
    pub(crate) fn insert_template(&mut self, id: u32, node: NodeId) -> bool {
        if self.templates.contains_key(&id) {
            return false;
        }
        self.templates.insert(id, node);
        true
    }
}

/// Shared reference to one node of a loaded variant.
///
/// Cheap to clone; keeps the whole variant alive.
#[derive(Clone)]
pub struct SchemaHandle {
    schema: Arc<VariantSchema>,
    node: NodeId,
}

impl SchemaHandle {
    pub fn new(schema: Arc<VariantSchema>, node: NodeId) -> Self {
        Self { schema, node }
    }

    /// Handle to a record template of `schema`.
    pub fn template(schema: &Arc<VariantSchema>, id: u32) -> Option<Self> {
        schema.template(id).map(|n| Self::new(schema.clone(), n))
    }

    #[inline]
    pub fn schema(&self) -> &Arc<VariantSchema> {
        &self.schema
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn node(&self) -> &SchemaNode {
        self.schema.node(self.node)
    }

    pub fn children(&self) -> impl Iterator<Item = SchemaHandle> + '_ {
        self.node()
            .children
            .iter()
            .map(move |&c| Self::new(self.schema.clone(), c))
    }

    /// Element template of an array node.
    pub fn element(&self) -> Option<SchemaHandle> {
        match self.node().kind {
            PropertyKind::Array => self.children().next(),
            _ => None,
        }
    }

    pub fn is_applicable(&self, revision: u16) -> bool {
        self.schema.is_applicable(self.node, revision)
    }
}

impl PartialEq for SchemaHandle {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && Arc::ptr_eq(&self.schema, &other.schema)
    }
}

impl fmt::Debug for SchemaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node();
        write!(f, "SchemaHandle({} {:?} {:#X} {})", self.schema.tag, self.node, node.id, node.name)
    }
}
