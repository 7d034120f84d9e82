//! Small identifier types shared by codecs, envelopes and schemas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Four character code, e.g. the variant tag `PRME`.
///
/// Stored as raw bytes; [`FourCC::to_u32`] reads them big-endian so the
/// characters appear in order inside big-endian streams.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Create from four bytes.
    #[inline]
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Create from a big-endian packed value.
    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    /// Packed big-endian value.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl FromStr for FourCC {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            return Err(Error::invalid_value(format!(
                "four character code must be 4 ASCII characters, got {s:?}"
            )));
        }
        Ok(Self([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl TryFrom<String> for FourCC {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<FourCC> for String {
    fn from(code: FourCC) -> Self {
        code.to_string()
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({self})")
    }
}

/// Identifier of an external resource referenced by a record.
///
/// Encoded as 4 or 8 bytes depending on the stream's encoding revision.
/// The invalid id is all ones at either width.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(u64);

impl AssetId {
    /// The "no resource" id.
    pub const INVALID: Self = Self(u64::MAX);

    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u64::MAX
    }

    /// Widen a value read at `width` bytes, mapping the narrow invalid id.
    pub fn from_raw(raw: u64, width: usize) -> Self {
        if width == 4 && raw == u64::from(u32::MAX) {
            Self::INVALID
        } else {
            Self(raw)
        }
    }

    /// Narrow to `width` bytes for encoding.
    pub fn to_raw(self, width: usize) -> Result<u64> {
        match width {
            8 => Ok(self.0),
            4 if !self.is_valid() => Ok(u64::from(u32::MAX)),
            4 => u32::try_from(self.0).map(u64::from).map_err(|_| {
                Error::invalid_value(format!("asset id {self} does not fit in 32 bits"))
            }),
            _ => Err(Error::invalid_value(format!("unsupported asset id width {width}"))),
        }
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018X}", self.0)
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "AssetId({self})")
        } else {
            write!(f, "AssetId(invalid)")
        }
    }
}

/// Opaque bytes carried for properties of unknown kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RawBytes(pub Vec<u8>);

impl RawBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_parse_display() {
        let code: FourCC = "PRME".parse().unwrap();
        assert_eq!(code.to_string(), "PRME");
        assert_eq!(code.to_u32(), 0x5052_4D45);
        assert_eq!(FourCC::from_u32(0x5052_4D45), code);
        assert!("PRM".parse::<FourCC>().is_err());
        assert!("PRIME".parse::<FourCC>().is_err());
    }

    #[test]
    fn test_asset_id_widths() {
        assert_eq!(AssetId::from_raw(0xFFFF_FFFF, 4), AssetId::INVALID);
        assert_eq!(AssetId::from_raw(0xFFFF_FFFF, 8), AssetId::new(0xFFFF_FFFF));
        assert_eq!(AssetId::INVALID.to_raw(4).unwrap(), 0xFFFF_FFFF);
        assert!(AssetId::new(0x1_0000_0000).to_raw(4).is_err());
        assert_eq!(AssetId::new(0x1_0000_0000).to_raw(8).unwrap(), 0x1_0000_0000);
        assert!(!AssetId::default().is_valid());
    }
}
