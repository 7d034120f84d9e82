//! Versioning envelope.
//!
//! Every stream starts with `(encoding revision, payload revision, variant)`.
//! The encoding revision governs the container layout (region size width,
//! resource id width); the payload revision and variant tag select which
//! schema and which fields apply to the content.
//!
//! Binary layout, in the stream's byte order:
//!
//! ```text
//! [u16 encoding_revision][u16 payload_revision][4 bytes variant]
//! ```
//!
//! Text layout is the first child of the document root:
//!
//! ```text
//! <Envelope EncodingRevision="2" PayloadRevision="3" Variant="PRME"/>
//! ```

use tracing::warn;

use crate::codec::{ByteReader, ByteWriter};
use crate::util::{Error, FourCC, Result};
use crate::xml::XmlElement;

/// Element name of the text envelope.
pub const ENVELOPE_ELEMENT: &str = "Envelope";

/// Container layout revisions, oldest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum EncodingRevision {
    /// 16-bit region sizes and child counts, 4-byte resource ids
    Initial = 0,
    /// 32-bit region sizes and child counts
    WideRegionSizes = 1,
    /// 8-byte resource ids
    LongResourceIds = 2,
}

impl EncodingRevision {
    /// Revision written by this library.
    pub const CURRENT: Self = Self::LongResourceIds;

    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Initial),
            1 => Some(Self::WideRegionSizes),
            2 => Some(Self::LongResourceIds),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Map a stored revision, clamping anything newer than [`Self::CURRENT`].
    pub fn clamped(value: u16) -> Self {
        match Self::from_u16(value) {
            Some(rev) => rev,
            None => {
                warn!(
                    revision = value,
                    current = Self::CURRENT.as_u16(),
                    "stream encoding revision is newer than supported, reading as current"
                );
                Self::CURRENT
            }
        }
    }
}

/// Stream header consulted by every later decision point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VersionEnvelope {
    pub encoding_revision: EncodingRevision,
    pub payload_revision: u16,
    pub variant: FourCC,
}

impl VersionEnvelope {
    /// Encoded size of the binary header.
    pub const BINARY_LEN: usize = 8;

    /// Envelope for writing with the current encoding revision.
    pub fn new(payload_revision: u16, variant: FourCC) -> Self {
        Self {
            encoding_revision: EncodingRevision::CURRENT,
            payload_revision,
            variant,
        }
    }

    /// Same envelope with an explicit encoding revision.
    pub fn with_encoding(mut self, revision: EncodingRevision) -> Self {
        self.encoding_revision = revision;
        self
    }

    /// Width in bytes of region sizes and child counts.
    #[inline]
    pub fn region_size_width(&self) -> usize {
        if self.encoding_revision < EncodingRevision::WideRegionSizes {
            2
        } else {
            4
        }
    }

    /// Width in bytes of an encoded resource id.
    #[inline]
    pub fn resource_id_width(&self) -> usize {
        if self.encoding_revision < EncodingRevision::LongResourceIds {
            4
        } else {
            8
        }
    }

    pub fn read_binary(reader: &mut ByteReader<'_>) -> Result<Self> {
        if reader.remaining() < Self::BINARY_LEN {
            return Err(Error::malformed(format!(
                "stream too short for version envelope ({} bytes)",
                reader.remaining()
            )));
        }
        let encoding = reader.read_u16()?;
        let payload_revision = reader.read_u16()?;
        let tag = reader.read_bytes(4)?;
        Ok(Self {
            encoding_revision: EncodingRevision::clamped(encoding),
            payload_revision,
            variant: FourCC::new([tag[0], tag[1], tag[2], tag[3]]),
        })
    }

    pub fn write_binary(&self, writer: &mut ByteWriter) -> Result<()> {
        writer.write_u16(self.encoding_revision.as_u16())?;
        writer.write_u16(self.payload_revision)?;
        writer.write_bytes(&self.variant.0)
    }

    /// Read the envelope from the first child of a text document root.
    pub fn read_xml(root: &XmlElement) -> Result<Self> {
        let element = root
            .children
            .first()
            .filter(|c| c.name == ENVELOPE_ELEMENT)
            .ok_or_else(|| Error::malformed(format!("<{}> has no leading <{ENVELOPE_ELEMENT}>", root.name)))?;

        let number = |key: &str| -> Result<u16> {
            element
                .attr(key)
                .ok_or_else(|| Error::malformed(format!("envelope is missing {key}")))?
                .trim()
                .parse()
                .map_err(|_| Error::malformed(format!("envelope {key} is not a revision number")))
        };
        let encoding = number("EncodingRevision")?;
        let payload_revision = number("PayloadRevision")?;
        let variant = element
            .attr("Variant")
            .ok_or_else(|| Error::malformed("envelope is missing Variant"))?
            .parse::<FourCC>()
            .map_err(|e| Error::malformed(format!("envelope variant: {e}")))?;

        Ok(Self {
            encoding_revision: EncodingRevision::clamped(encoding),
            payload_revision,
            variant,
        })
    }

    pub fn to_xml(&self) -> XmlElement {
        let mut element = XmlElement::new(ENVELOPE_ELEMENT);
        element.set_attr("EncodingRevision", self.encoding_revision.as_u16().to_string());
        element.set_attr("PayloadRevision", self.payload_revision.to_string());
        element.set_attr("Variant", self.variant.to_string());
        element
    }

    /// Read the envelope of a stream of either encoding.
    ///
    /// Streams whose first non-whitespace byte is `<` are treated as text.
    pub fn negotiate(bytes: &[u8], endian: crate::codec::Endian) -> Result<Self> {
        if is_text_stream(bytes) {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| Error::malformed(format!("text stream is not UTF-8: {e}")))?;
            let root = XmlElement::parse(text).map_err(|e| Error::malformed(e.to_string()))?;
            Self::read_xml(&root)
        } else {
            Self::read_binary(&mut ByteReader::new(bytes, endian))
        }
    }
}

/// True when the stream looks like an XML document.
pub fn is_text_stream(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'<')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Endian;

    fn prime() -> FourCC {
        FourCC::new(*b"PRME")
    }

    #[test]
    fn test_binary_envelope() -> crate::util::Result<()> {
        let env = VersionEnvelope::new(3, prime());
        let mut w = ByteWriter::new(Endian::Big);
        env.write_binary(&mut w)?;
        assert_eq!(w.as_slice(), &[0, 2, 0, 3, b'P', b'R', b'M', b'E']);

        let back = VersionEnvelope::read_binary(&mut ByteReader::new(w.as_slice(), Endian::Big))?;
        assert_eq!(back, env);
        Ok(())
    }

    #[test]
    fn test_short_header_is_malformed() {
        let data = [0u8, 2, 0];
        let err = VersionEnvelope::read_binary(&mut ByteReader::new(&data, Endian::Big)).unwrap_err();
        assert!(matches!(err, Error::MalformedStream(_)));
    }

    #[test]
    fn test_newer_encoding_is_clamped() -> crate::util::Result<()> {
        let data = [0u8, 9, 0, 1, b'P', b'R', b'M', b'E'];
        let env = VersionEnvelope::read_binary(&mut ByteReader::new(&data, Endian::Big))?;
        assert_eq!(env.encoding_revision, EncodingRevision::CURRENT);
        assert_eq!(env.payload_revision, 1);
        Ok(())
    }

    #[test]
    fn test_widths_follow_revision() {
        let env = VersionEnvelope::new(0, prime());
        assert_eq!(env.region_size_width(), 4);
        assert_eq!(env.resource_id_width(), 8);

        let old = env.with_encoding(EncodingRevision::Initial);
        assert_eq!(old.region_size_width(), 2);
        assert_eq!(old.resource_id_width(), 4);

        let mid = env.with_encoding(EncodingRevision::WideRegionSizes);
        assert_eq!(mid.region_size_width(), 4);
        assert_eq!(mid.resource_id_width(), 4);
    }

    #[test]
    fn test_xml_envelope() -> crate::util::Result<()> {
        let env = VersionEnvelope::new(7, prime());
        let mut root = XmlElement::new("Record");
        root.push(env.to_xml());
        assert_eq!(VersionEnvelope::read_xml(&root)?, env);

        let bare = XmlElement::new("Record");
        assert!(matches!(VersionEnvelope::read_xml(&bare), Err(Error::MalformedStream(_))));
        Ok(())
    }

    #[test]
    fn test_negotiate_sniffs_encoding() -> crate::util::Result<()> {
        let env = VersionEnvelope::new(1, prime());
        let mut root = XmlElement::new("Record");
        root.push(env.to_xml());
        let text = root.to_xml_string()?;
        assert_eq!(VersionEnvelope::negotiate(text.as_bytes(), Endian::Big)?, env);

        let mut w = ByteWriter::new(Endian::Little);
        env.write_binary(&mut w)?;
        assert_eq!(VersionEnvelope::negotiate(w.as_slice(), Endian::Little)?, env);
        Ok(())
    }
}
