//! # propstream
//!
//! Format-agnostic serialization with runtime property schemas.
//!
//! Values describe their layout once, as a sequence of named fields, and the
//! same description drives both a compact tagged binary encoding and a
//! human-editable XML encoding. Streams tolerate added, removed and reordered
//! fields. Records whose shape is only known at runtime are described by XML
//! schema files and instantiated as [`record::RecordValue`] trees.
//!
//! ## Modules
//!
//! - [`util`] - Errors, identifiers, name hashing, math re-exports
//! - [`codec`] - Byte streams and per-type binary/text codecs
//! - [`core`] - Versioning envelope preceding every stream
//! - [`archive`] - Archive trait, transfer dispatch, binary and text encodings
//! - [`schema`] - Runtime schemas loaded from XML descriptions
//! - [`record`] - Schema-driven record values
//!
//! ## Example
//!
//! ```ignore
//! use propstream::prelude::*;
//!
//! let (registry, report) = SchemaRegistry::load(&DirectorySource::new("templates"), MANIFEST)?;
//! let door = registry.template("PRME".parse()?, 0x10).ok_or(Error::other("no Door"))?;
//! let mut record = RecordValue::instantiate(door);
//! let bytes = record.to_binary(1, Endian::Big)?;
//! ```

pub mod util;
pub mod codec;
pub mod core;
pub mod xml;
pub mod archive;
pub mod value;
pub mod schema;
pub mod record;

// Re-export commonly used types
pub use util::{Error, Result};
pub use crate::core::VersionEnvelope;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::archive::{route, Archive, GlobalSerial, Hints, Polymorphic, Serial, Transfer};
    pub use crate::codec::{Endian, InputFile};
    pub use crate::core::{EncodingRevision, VersionEnvelope};
    pub use crate::record::{IdentifierPath, RecordValue};
    pub use crate::schema::{DirectorySource, SchemaHandle, SchemaRegistry, MANIFEST};
    pub use crate::util::{AssetId, Error, FourCC, Result, Vec3, Vec4};
    pub use crate::value::{ResourceRef, ScalarValue};
}
