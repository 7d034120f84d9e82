//! Fixed binary representation of each primitive.
//!
//! Integers and floats use the stream's declared byte order. Strings and raw
//! bytes carry a `u32` byte length. Resource ids are 4 or 8 bytes wide
//! depending on the envelope's encoding revision.

use crate::core::VersionEnvelope;
use crate::util::{AssetId, Error, FourCC, RawBytes, Result, Vec3, Vec4};

use super::stream::{ByteReader, ByteWriter};

/// Binary codec for one primitive type.
pub trait Codec: Sized {
    fn decode(reader: &mut ByteReader<'_>, env: &VersionEnvelope) -> Result<Self>;
    fn encode(&self, writer: &mut ByteWriter, env: &VersionEnvelope) -> Result<()>;
}

macro_rules! scalar_codec {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            impl Codec for $ty {
                #[inline]
                fn decode(reader: &mut ByteReader<'_>, _env: &VersionEnvelope) -> Result<Self> {
                    reader.$read()
                }

                #[inline]
                fn encode(&self, writer: &mut ByteWriter, _env: &VersionEnvelope) -> Result<()> {
                    writer.$write(*self)
                }
            }
        )*
    };
}

scalar_codec! {
    u8 => read_u8, write_u8;
    i8 => read_i8, write_i8;
    u16 => read_u16, write_u16;
    i16 => read_i16, write_i16;
    u32 => read_u32, write_u32;
    i32 => read_i32, write_i32;
    u64 => read_u64, write_u64;
    i64 => read_i64, write_i64;
    f32 => read_f32, write_f32;
    f64 => read_f64, write_f64;
}

impl Codec for bool {
    fn decode(reader: &mut ByteReader<'_>, _env: &VersionEnvelope) -> Result<Self> {
        Ok(reader.read_u8()? != 0)
    }

    fn encode(&self, writer: &mut ByteWriter, _env: &VersionEnvelope) -> Result<()> {
        writer.write_u8(u8::from(*self))
    }
}

fn read_len_prefixed<'a>(reader: &mut ByteReader<'a>) -> Result<&'a [u8]> {
    let len = reader.read_u32()? as usize;
    if len > reader.remaining() {
        return Err(Error::malformed(format!(
            "length prefix {len} at offset {} exceeds remaining {} bytes",
            reader.pos() - 4,
            reader.remaining()
        )));
    }
    reader.read_bytes(len)
}

fn write_len_prefixed(writer: &mut ByteWriter, bytes: &[u8]) -> Result<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| Error::invalid_value(format!("{} bytes exceed the u32 length prefix", bytes.len())))?;
    writer.write_u32(len)?;
    writer.write_bytes(bytes)
}

impl Codec for String {
    fn decode(reader: &mut ByteReader<'_>, _env: &VersionEnvelope) -> Result<Self> {
        Ok(String::from_utf8(read_len_prefixed(reader)?.to_vec())?)
    }

    fn encode(&self, writer: &mut ByteWriter, _env: &VersionEnvelope) -> Result<()> {
        write_len_prefixed(writer, self.as_bytes())
    }
}

impl Codec for RawBytes {
    fn decode(reader: &mut ByteReader<'_>, _env: &VersionEnvelope) -> Result<Self> {
        Ok(RawBytes(read_len_prefixed(reader)?.to_vec()))
    }

    fn encode(&self, writer: &mut ByteWriter, _env: &VersionEnvelope) -> Result<()> {
        write_len_prefixed(writer, &self.0)
    }
}

impl Codec for Vec3 {
    fn decode(reader: &mut ByteReader<'_>, _env: &VersionEnvelope) -> Result<Self> {
        Ok(Vec3::new(reader.read_f32()?, reader.read_f32()?, reader.read_f32()?))
    }

    fn encode(&self, writer: &mut ByteWriter, _env: &VersionEnvelope) -> Result<()> {
        for c in self.to_array() {
            writer.write_f32(c)?;
        }
        Ok(())
    }
}

impl Codec for Vec4 {
    fn decode(reader: &mut ByteReader<'_>, _env: &VersionEnvelope) -> Result<Self> {
        Ok(Vec4::new(
            reader.read_f32()?,
            reader.read_f32()?,
            reader.read_f32()?,
            reader.read_f32()?,
        ))
    }

    fn encode(&self, writer: &mut ByteWriter, _env: &VersionEnvelope) -> Result<()> {
        for c in self.to_array() {
            writer.write_f32(c)?;
        }
        Ok(())
    }
}

impl Codec for FourCC {
    fn decode(reader: &mut ByteReader<'_>, _env: &VersionEnvelope) -> Result<Self> {
        Ok(FourCC::from_u32(reader.read_u32()?))
    }

    fn encode(&self, writer: &mut ByteWriter, _env: &VersionEnvelope) -> Result<()> {
        writer.write_u32(self.to_u32())
    }
}

impl Codec for AssetId {
    fn decode(reader: &mut ByteReader<'_>, env: &VersionEnvelope) -> Result<Self> {
        let width = env.resource_id_width();
        Ok(AssetId::from_raw(reader.read_uint(width)?, width))
    }

    fn encode(&self, writer: &mut ByteWriter, env: &VersionEnvelope) -> Result<()> {
        let width = env.resource_id_width();
        writer.write_uint(self.to_raw(width)?, width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Endian;
    use crate::core::EncodingRevision;

    fn env() -> VersionEnvelope {
        VersionEnvelope::new(0, FourCC::new(*b"TEST"))
    }

    fn encode_one<T: Codec>(value: &T, env: &VersionEnvelope, endian: Endian) -> Result<Vec<u8>> {
        let mut w = ByteWriter::new(endian);
        value.encode(&mut w, env)?;
        Ok(w.into_inner())
    }

    #[test]
    fn test_string_layout() -> Result<()> {
        let bytes = encode_one(&"Door".to_string(), &env(), Endian::Big)?;
        assert_eq!(bytes, [0, 0, 0, 4, b'D', b'o', b'o', b'r']);
        let back = String::decode(&mut ByteReader::new(&bytes, Endian::Big), &env())?;
        assert_eq!(back, "Door");
        Ok(())
    }

    #[test]
    fn test_string_length_overrun() {
        let bytes = [0u8, 0, 0, 9, b'a'];
        let err = String::decode(&mut ByteReader::new(&bytes, Endian::Big), &env()).unwrap_err();
        assert!(matches!(err, Error::MalformedStream(_)));
    }

    #[test]
    fn test_float_byte_order() -> Result<()> {
        let big = encode_one(&1.0f32, &env(), Endian::Big)?;
        let little = encode_one(&1.0f32, &env(), Endian::Little)?;
        assert_eq!(big, [0x3F, 0x80, 0, 0]);
        assert_eq!(little, [0, 0, 0x80, 0x3F]);
        Ok(())
    }

    #[test]
    fn test_asset_id_width_follows_envelope() -> Result<()> {
        let id = AssetId::new(0x1234);
        let wide = encode_one(&id, &env(), Endian::Big)?;
        assert_eq!(wide.len(), 8);

        let old = env().with_encoding(EncodingRevision::WideRegionSizes);
        let narrow = encode_one(&id, &old, Endian::Big)?;
        assert_eq!(narrow, [0, 0, 0x12, 0x34]);

        let invalid = encode_one(&AssetId::INVALID, &old, Endian::Big)?;
        assert_eq!(invalid, [0xFF; 4]);
        let back = AssetId::decode(&mut ByteReader::new(&invalid, Endian::Big), &old)?;
        assert_eq!(back, AssetId::INVALID);
        Ok(())
    }

    #[test]
    fn test_vector_and_bool() -> Result<()> {
        let v = Vec3::new(1.0, -2.0, 0.5);
        let bytes = encode_one(&v, &env(), Endian::Little)?;
        assert_eq!(bytes.len(), 12);
        assert_eq!(Vec3::decode(&mut ByteReader::new(&bytes, Endian::Little), &env())?, v);

        let bytes = encode_one(&true, &env(), Endian::Big)?;
        assert_eq!(bytes, [1]);
        Ok(())
    }
}
