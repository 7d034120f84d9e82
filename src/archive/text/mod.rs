//! Hierarchical text encoding.
//!
//! ```xml
//! <Record>
//!   <Envelope EncodingRevision="2" PayloadRevision="1" Variant="PRME"/>
//!   <Name>Door</Name>
//!   <Links Size="2">
//!     <Element>0x0000000A</Element>
//!     <Element>0x0000000B</Element>
//!   </Links>
//!   <Shape Type="0x00000001">...</Shape>
//! </Record>
//! ```
//!
//! Field names become element names, with characters that are not valid in
//! XML names replaced by `_`. Leaves hinted [`Hints::ATTRIBUTE`] are stored as
//! attributes of their parent element instead.

mod reader;
mod writer;


pub use reader::TextReader;
pub use writer::TextWriter;

use std::borrow::Cow;

use crate::core::VersionEnvelope;
use crate::util::Result;
use crate::xml::XmlElement;

use super::{Archive, Hints, Transfer};

/// Element count attribute of container fields.
pub const SIZE_ATTR: &str = "Size";
/// Concrete-type tag attribute of polymorphic fields.
pub const TYPE_ATTR: &str = "Type";

/// Map a field name to a valid XML element name.
pub fn element_name(name: &str) -> Cow<'_, str> {
    let valid_start = |c: char| c.is_ascii_alphabetic() || c == '_';
    let valid = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');

    let starts_ok = name.chars().next().is_some_and(valid_start);
    if starts_ok && name.chars().all(valid) {
        return Cow::Borrowed(name);
    }
    let mut out = String::with_capacity(name.len() + 1);
    if !starts_ok {
        out.push('_');
    }
    out.extend(name.chars().map(|c| if valid(c) { c } else { '_' }));
    Cow::Owned(out)
}

/// Encode `value` as the root of a new text document tree.
pub fn to_xml<R, T: Transfer<R>>(value: &mut T, root_name: &str, env: VersionEnvelope) -> Result<XmlElement> {
    let mut writer = TextWriter::new(root_name, env);
    value.transfer(&mut writer, Hints::NONE)?;
    writer.finish()
}

/// Encode `value` as a new text document.
pub fn to_string<R, T: Transfer<R>>(value: &mut T, root_name: &str, env: VersionEnvelope) -> Result<String> {
    to_xml(value, root_name, env)?.to_xml_string()
}

/// Decode the root of a text document into an existing value.
pub fn read_into<R, T: Transfer<R>>(text: &str, value: &mut T) -> Result<VersionEnvelope> {
    let root = XmlElement::parse(text)?;
    let mut reader = TextReader::new(&root)?;
    value.transfer(&mut reader, Hints::NONE)?;
    Ok(*reader.envelope())
}

/// Decode a default-constructible value from a text document.
pub fn from_str<R, T: Transfer<R> + Default>(text: &str) -> Result<(T, VersionEnvelope)> {
    let mut value = T::default();
    let env = read_into(text, &mut value)?;
    Ok((value, env))
}
