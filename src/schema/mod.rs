//! Runtime schemas loaded from XML descriptions.
//!
//! Each variant tag gets its own [`VariantSchema`]: an arena of
//! [`SchemaNode`]s with the master property list and record templates
//! indexing into it. [`SchemaHandle`] pairs a shared variant with one node
//! and is what record values keep as their template.

mod kind;
mod loader;
mod node;
mod registry;
mod source;
mod variant;

#[cfg(test)]
pub(crate) mod fixtures;

pub use kind::{CookPreference, PropertyKind};
pub use loader::{LoadReport, SchemaError, SchemaLoader};
pub use node::{BitFlag, Enumerator, NodeId, SchemaNode};
pub use registry::{SchemaRegistry, MANIFEST};
pub use source::{DescriptionSource, DirectorySource, MemorySource};
pub use variant::{SchemaHandle, VariantSchema};
