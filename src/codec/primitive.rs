//! Object-safe view over a primitive's binary and text codecs.

use crate::archive::Hints;
use crate::core::VersionEnvelope;
use crate::util::Result;

use super::binary::Codec;
use super::stream::{ByteReader, ByteWriter};
use super::text::TextCodec;

/// A value an archive can transfer directly, without field framing of its own.
///
/// Implemented for every type with both a [`Codec`] and a [`TextCodec`], so
/// archives take `&mut dyn Primitive` and stay object safe.
pub trait Primitive {
    fn read_binary(&mut self, reader: &mut ByteReader<'_>, env: &VersionEnvelope) -> Result<()>;
    fn write_binary(&self, writer: &mut ByteWriter, env: &VersionEnvelope) -> Result<()>;
    fn read_text(&mut self, text: &str) -> Result<()>;
    fn write_text(&self, hints: Hints) -> String;
    fn type_name(&self) -> &'static str;
}

impl<T: Codec + TextCodec> Primitive for T {
    fn read_binary(&mut self, reader: &mut ByteReader<'_>, env: &VersionEnvelope) -> Result<()> {
        *self = T::decode(reader, env)?;
        Ok(())
    }

    fn write_binary(&self, writer: &mut ByteWriter, env: &VersionEnvelope) -> Result<()> {
        self.encode(writer, env)
    }

    fn read_text(&mut self, text: &str) -> Result<()> {
        *self = T::parse(text)?;
        Ok(())
    }

    fn write_text(&self, hints: Hints) -> String {
        self.format(hints)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
