//! Archive abstraction.
//!
//! An [`Archive`] is one read or write session over one encoding. Values
//! describe themselves once, through [`Serial::serialize`], and the same code
//! path reads or writes depending on [`Archive::is_reader`].
//!
//! Fields are framed by [`Archive::begin_field`] / [`Archive::end_field`].
//! Readers locate a field by probing the next sibling first and falling back
//! to a scan of the current level; a field that cannot be found is reported
//! as absent (`Ok(false)`), never as an error. Writers always succeed and
//! reserve a size-prefixed region that is back-patched on close, so readers
//! can skip anything they do not understand.
//!
//! ## Encodings
//!
//! - [`binary`] - Tagged binary regions keyed by a CRC-32 of the field name
//! - [`text`] - Nested XML elements named after the fields

mod containers;
mod dispatch;
mod field;
mod hints;
mod polymorphic;

#[cfg(test)]
pub(crate) mod fixtures;

pub mod binary;
pub mod text;

pub use containers::ELEMENT;
pub use hints::Hints;
pub use polymorphic::{Polymorphic, NULL_TAG};
pub use dispatch::{route, GlobalSerial, Serial, Transfer};

use crate::codec::Primitive;
use crate::core::VersionEnvelope;
use crate::util::Result;

/// One serialization session.
pub trait Archive {
    /// Envelope read from, or written to, the stream header.
    fn envelope(&self) -> &VersionEnvelope;

    fn is_reader(&self) -> bool;

    fn is_text(&self) -> bool;

    #[inline]
    fn is_writer(&self) -> bool {
        !self.is_reader()
    }

    /// Open a named field. Returns `false` when a reader cannot find it.
    fn begin_field(&mut self, name: &str, hints: Hints) -> Result<bool>;

    /// Close the innermost field; readers skip whatever remains unread in it.
    fn end_field(&mut self) -> Result<()>;

    /// Read or write a leaf value inside the current field.
    fn transfer_primitive(&mut self, value: &mut dyn Primitive, hints: Hints) -> Result<()>;

    /// Read or write the element count of a container field.
    fn transfer_container_size(&mut self, size: &mut u32, element_name: &str) -> Result<()>;

    /// Read or write the concrete-type tag of a polymorphic field.
    fn transfer_polymorphic_tag(&mut self, tag: &mut u32) -> Result<()>;
}
