//! Tagged binary encoding.
//!
//! ```text
//! [envelope: 8 bytes]
//! [u32 0xFFFFFFFF][size][count] root region
//!   [u32 crc32(name)][size][count?] <body>   one per field
//! ```
//!
//! `size` and `count` are 32-bit, or 16-bit for streams of encoding revision
//! [`EncodingRevision::Initial`](crate::core::EncodingRevision::Initial).
//! `size` counts the bytes after itself. A field's `count` is present only
//! when the field has child fields, and always precedes the first of them.

mod reader;
mod writer;


pub use reader::BinaryReader;
pub use writer::BinaryWriter;

use crate::codec::Endian;
use crate::core::VersionEnvelope;
use crate::util::Result;

use super::{Archive, Hints, Transfer};

/// Marker identifying the root region.
pub const ROOT_ID: u32 = 0xFFFF_FFFF;

/// Encode `value` as the root of a new binary stream.
pub fn to_bytes<R, T: Transfer<R>>(value: &mut T, env: VersionEnvelope, endian: Endian) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::new(env, endian)?;
    value.transfer(&mut writer, Hints::NONE)?;
    writer.finish()
}

/// Decode the root of a binary stream into an existing value.
pub fn read_into<R, T: Transfer<R>>(bytes: &[u8], endian: Endian, value: &mut T) -> Result<VersionEnvelope> {
    let mut reader = BinaryReader::new(bytes, endian)?;
    value.transfer(&mut reader, Hints::NONE)?;
    Ok(*reader.envelope())
}

/// Decode a default-constructible value from a binary stream.
pub fn from_bytes<R, T: Transfer<R> + Default>(bytes: &[u8], endian: Endian) -> Result<(T, VersionEnvelope)> {
    let mut value = T::default();
    let env = read_into(bytes, endian, &mut value)?;
    Ok((value, env))
}
