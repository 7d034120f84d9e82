//! Record values: schema-driven trees of typed properties.
//!
//! A [`RecordValue`] is instantiated from a [`SchemaHandle`] and mirrors the
//! shape of its node: structs hold one child per declared field, arrays hold
//! instances of their element template, everything else holds a
//! [`ScalarValue`]. Records serialize through any [`Archive`](crate::archive::Archive).

mod json;
mod path;
mod serial;

pub use path::IdentifierPath;

use crate::archive::{binary, text, Archive, Hints, Transfer};
use crate::codec::Endian;
use crate::core::{is_text_stream, VersionEnvelope};
use crate::schema::{PropertyKind, SchemaHandle, SchemaNode};
use crate::util::{Error, Result};
use crate::value::ScalarValue;
use crate::xml::XmlElement;

/// Contents of a record value.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordData {
    Scalar(ScalarValue),
    Struct(Vec<RecordValue>),
    Array(Vec<RecordValue>),
}

/// One property instance and its template.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordValue {
    template: SchemaHandle,
    data: RecordData,
}

impl RecordValue {
    /// Build a value tree holding every default of `template`.
    ///
    /// Arrays start empty.
    pub fn instantiate(template: SchemaHandle) -> Self {
        let node = template.node();
        let data = match node.kind {
            PropertyKind::Struct => RecordData::Struct(template.children().map(Self::instantiate).collect()),
            PropertyKind::Array => RecordData::Array(Vec::new()),
            _ => RecordData::Scalar(default_scalar(node)),
        };
        Self { template, data }
    }

    #[inline]
    pub fn template(&self) -> &SchemaHandle {
        &self.template
    }

    #[inline]
    pub fn node(&self) -> &SchemaNode {
        self.template.node()
    }

    /// Property identifier.
    pub fn id(&self) -> u32 {
        self.node().id
    }

    pub fn name(&self) -> &str {
        &self.node().name
    }

    pub fn kind(&self) -> PropertyKind {
        self.node().kind
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn scalar(&self) -> Option<&ScalarValue> {
        match &self.data {
            RecordData::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Replace a scalar value; the kind must match the template.
    pub fn set(&mut self, value: ScalarValue) -> Result<()> {
        let node = self.template.node();
        match &mut self.data {
            RecordData::Scalar(current) if value.kind() == node.kind => {
                if !node.in_range(&value) {
                    return Err(Error::invalid_value(format!(
                        "{} is outside the range of {}",
                        value.format(Hints::NONE),
                        node.name
                    )));
                }
                *current = value;
                Ok(())
            }
            _ => Err(Error::mismatch(node.kind.name(), value.kind().name())),
        }
    }

    /// Replace the whole value with one instantiated from the same template.
    pub fn replace(&mut self, value: RecordValue) -> Result<()> {
        if value.template != self.template {
            return Err(Error::mismatch(self.name(), value.name()));
        }
        *self = value;
        Ok(())
    }

    /// Struct fields or array elements; empty for scalars.
    pub fn children(&self) -> &[RecordValue] {
        match &self.data {
            RecordData::Struct(c) | RecordData::Array(c) => c,
            RecordData::Scalar(_) => &[],
        }
    }

    /// Mutable fields or elements. Change them through [`set`](Self::set),
    /// [`resize`](Self::resize) or [`replace`](Self::replace) so each keeps its template.
    pub fn children_mut(&mut self) -> &mut [RecordValue] {
        match &mut self.data {
            RecordData::Struct(c) | RecordData::Array(c) => c,
            RecordData::Scalar(_) => &mut [],
        }
    }

    /// Struct field with the given identifier.
    pub fn child(&self, id: u32) -> Option<&RecordValue> {
        match &self.data {
            RecordData::Struct(c) => c.iter().find(|v| v.id() == id),
            _ => None,
        }
    }

    pub fn child_mut(&mut self, id: u32) -> Option<&mut RecordValue> {
        match &mut self.data {
            RecordData::Struct(c) => c.iter_mut().find(|v| v.id() == id),
            _ => None,
        }
    }

    pub fn child_by_name(&self, name: &str) -> Option<&RecordValue> {
        match &self.data {
            RecordData::Struct(c) => c.iter().find(|v| v.name() == name),
            _ => None,
        }
    }

    /// Follow `path` through nested structs.
    pub fn lookup(&self, path: &IdentifierPath) -> Option<&RecordValue> {
        path.segments()
            .iter()
            .try_fold(self, |value, &id| value.child(id))
    }

    /// Mutable [`lookup`](Self::lookup); the same rules as [`children_mut`](Self::children_mut) apply.
    pub fn lookup_mut(&mut self, path: &IdentifierPath) -> Option<&mut RecordValue> {
        path.segments()
            .iter()
            .try_fold(self, |value, &id| value.child_mut(id))
    }

    /// True if this value equals what [`instantiate`](Self::instantiate) produces.
    pub fn matches_default(&self) -> bool {
        match &self.data {
            RecordData::Scalar(v) => *v == default_scalar(self.node()),
            RecordData::Struct(c) => c.iter().all(Self::matches_default),
            RecordData::Array(c) => c.is_empty(),
        }
    }

    /// Number of array elements.
    pub fn array_len(&self) -> Option<usize> {
        match &self.data {
            RecordData::Array(c) => Some(c.len()),
            _ => None,
        }
    }

    /// Grow or shrink an array, keeping existing elements.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        let RecordData::Array(items) = &mut self.data else {
            return Err(Error::mismatch(PropertyKind::Array.name(), self.template.node().kind.name()));
        };
        if len <= items.len() {
            items.truncate(len);
            return Ok(());
        }
        let element = self
            .template
            .element()
            .ok_or_else(|| Error::invalid_value(format!("array {} has no element template", self.template.node().name)))?;
        items.resize_with(len, || Self::instantiate(element.clone()));
        Ok(())
    }

    /// Encode as a tagged binary stream.
    pub fn to_binary(&mut self, payload_revision: u16, endian: Endian) -> Result<Vec<u8>> {
        let env = self.envelope(payload_revision);
        binary::to_bytes(self, env, endian)
    }

    /// Decode a tagged binary stream written for this record's variant.
    pub fn read_binary(&mut self, bytes: &[u8], endian: Endian) -> Result<VersionEnvelope> {
        let mut reader = binary::BinaryReader::new(bytes, endian)?;
        self.check_variant(reader.envelope())?;
        self.transfer(&mut reader, Hints::NONE)?;
        Ok(*reader.envelope())
    }

    /// Encode as a text document with the given root element name.
    pub fn to_text(&mut self, root_name: &str, payload_revision: u16) -> Result<String> {
        let env = self.envelope(payload_revision);
        text::to_string(self, root_name, env)
    }

    /// Decode a text document written for this record's variant.
    pub fn read_text(&mut self, source: &str) -> Result<VersionEnvelope> {
        let root = XmlElement::parse(source)?;
        let mut reader = text::TextReader::new(&root)?;
        self.check_variant(reader.envelope())?;
        self.transfer(&mut reader, Hints::NONE)?;
        Ok(*reader.envelope())
    }

    /// Decode a stream of either encoding, telling them apart by content.
    pub fn read_any(&mut self, bytes: &[u8], endian: Endian) -> Result<VersionEnvelope> {
        if !is_text_stream(bytes) {
            return self.read_binary(bytes, endian);
        }
        let source = std::str::from_utf8(bytes).map_err(|e| Error::malformed(format!("text stream is not UTF-8: {e}")))?;
        self.read_text(source)
    }

    fn envelope(&self, payload_revision: u16) -> VersionEnvelope {
        VersionEnvelope::new(payload_revision, self.template.schema().tag())
    }

    fn check_variant(&self, env: &VersionEnvelope) -> Result<()> {
        let tag = self.template.schema().tag();
        if env.variant != tag {
            return Err(Error::mismatch(format!("variant {tag}"), format!("variant {}", env.variant)));
        }
        Ok(())
    }
}

fn default_scalar(node: &SchemaNode) -> ScalarValue {
    node.default_value().unwrap_or(ScalarValue::Unknown(Default::default()))
}

#[cfg(test)]
mod tests;
