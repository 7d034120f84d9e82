//! Byte cursors with a declared byte order.
//!
//! Binary archives are read from a borrowed slice and written into a growable
//! buffer that supports back-patching of size placeholders.

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

/// Byte order declared by a stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    #[default]
    Big,
    Little,
}

impl Endian {
    /// Byte order of the running host.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }
}

macro_rules! read_scalar {
    ($($name:ident => $ty:ty, $width:expr;)*) => {
        $(
            #[inline]
            pub fn $name(&mut self) -> Result<$ty> {
                let bytes = self.read_bytes($width)?;
                Ok(match self.endian {
                    Endian::Big => BigEndian::$name(bytes),
                    Endian::Little => LittleEndian::$name(bytes),
                })
            }
        )*
    };
}

macro_rules! write_scalar {
    ($($name:ident => $ty:ty;)*) => {
        $(
            #[inline]
            pub fn $name(&mut self, value: $ty) -> Result<()> {
                match self.endian {
                    Endian::Big => self.buf.$name::<BigEndian>(value)?,
                    Endian::Little => self.buf.$name::<LittleEndian>(value)?,
                }
                Ok(())
            }
        )*
    };
}

/// Read cursor over an in-memory stream.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self { data, pos: 0, endian }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Move the cursor to an absolute offset.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::UnexpectedEof(pos as u64));
        }
        self.pos = pos;
        Ok(())
    }

    /// Borrow the next `len` bytes and advance.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(Error::UnexpectedEof(self.data.len() as u64))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    read_scalar! {
        read_u16 => u16, 2;
        read_i16 => i16, 2;
        read_u32 => u32, 4;
        read_i32 => i32, 4;
        read_u64 => u64, 8;
        read_i64 => i64, 8;
        read_f32 => f32, 4;
        read_f64 => f64, 8;
    }

    /// Read an unsigned value of 2, 4 or 8 bytes.
    pub fn read_uint(&mut self, width: usize) -> Result<u64> {
        match width {
            2 => self.read_u16().map(u64::from),
            4 => self.read_u32().map(u64::from),
            8 => self.read_u64(),
            _ => Err(Error::invalid_value(format!("unsupported integer width {width}"))),
        }
    }
}

/// Growable output stream.
pub struct ByteWriter {
    buf: Vec<u8>,
    endian: Endian,
}

impl ByteWriter {
    pub fn new(endian: Endian) -> Self {
        Self { buf: Vec::new(), endian }
    }

    /// Current write position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(data);
        Ok(())
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buf.push(value);
        Ok(())
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    write_scalar! {
        write_u16 => u16;
        write_i16 => i16;
        write_u32 => u32;
        write_i32 => i32;
        write_u64 => u64;
        write_i64 => i64;
        write_f32 => f32;
        write_f64 => f64;
    }

    /// Write an unsigned value at 2, 4 or 8 bytes, rejecting overflow.
    pub fn write_uint(&mut self, value: u64, width: usize) -> Result<()> {
        let overflow = || Error::invalid_value(format!("{value} does not fit in {width} bytes"));
        match width {
            2 => self.write_u16(u16::try_from(value).map_err(|_| overflow())?),
            4 => self.write_u32(u32::try_from(value).map_err(|_| overflow())?),
            8 => self.write_u64(value),
            _ => Err(Error::invalid_value(format!("unsupported integer width {width}"))),
        }
    }

    /// Overwrite a previously reserved unsigned value.
    pub fn patch_uint(&mut self, at: usize, value: u64, width: usize) -> Result<()> {
        let slot = self
            .buf
            .get_mut(at..at + width)
            .ok_or_else(|| Error::state(format!("patch at {at} outside written data")))?;
        let overflow = || Error::invalid_value(format!("{value} does not fit in {width} bytes"));
        match (width, self.endian) {
            (2, Endian::Big) => BigEndian::write_u16(slot, u16::try_from(value).map_err(|_| overflow())?),
            (2, Endian::Little) => LittleEndian::write_u16(slot, u16::try_from(value).map_err(|_| overflow())?),
            (4, Endian::Big) => BigEndian::write_u32(slot, u32::try_from(value).map_err(|_| overflow())?),
            (4, Endian::Little) => LittleEndian::write_u32(slot, u32::try_from(value).map_err(|_| overflow())?),
            (8, Endian::Big) => BigEndian::write_u64(slot, value),
            (8, Endian::Little) => LittleEndian::write_u64(slot, value),
            _ => return Err(Error::invalid_value(format!("unsupported integer width {width}"))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_layout() -> crate::util::Result<()> {
        let mut w = ByteWriter::new(Endian::Big);
        w.write_u32(0x0102_0304)?;
        w.write_u16(0x0506)?;
        assert_eq!(w.as_slice(), &[1, 2, 3, 4, 5, 6]);

        let mut r = ByteReader::new(w.as_slice(), Endian::Big);
        assert_eq!(r.read_u32()?, 0x0102_0304);
        assert_eq!(r.read_u16()?, 0x0506);
        assert_eq!(r.remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_little_endian_layout() -> crate::util::Result<()> {
        let mut w = ByteWriter::new(Endian::Little);
        w.write_u32(0x0102_0304)?;
        assert_eq!(w.as_slice(), &[4, 3, 2, 1]);
        Ok(())
    }

    #[test]
    fn test_patch_uint() -> crate::util::Result<()> {
        let mut w = ByteWriter::new(Endian::Big);
        w.write_uint(0, 4)?;
        w.write_u8(0xAA)?;
        w.patch_uint(0, 0xDEAD_BEEF, 4)?;
        assert_eq!(w.as_slice(), &[0xDE, 0xAD, 0xBE, 0xEF, 0xAA]);
        assert!(w.patch_uint(0, 0x1_0000, 2).is_err());
        assert!(w.patch_uint(4, 1, 4).is_err());
        Ok(())
    }

    #[test]
    fn test_read_past_end() {
        let data = [1u8, 2, 3];
        let mut r = ByteReader::new(&data, Endian::Big);
        assert!(matches!(r.read_u32(), Err(Error::UnexpectedEof(_))));
        // failed read leaves the cursor in place
        assert_eq!(r.pos(), 0);
        assert!(r.seek(4).is_err());
    }
}
