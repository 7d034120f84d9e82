//! Colon-separated identifier paths, e.g. `0x00000004:0x00000001`.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::util::{Error, Result};

/// Path of property identifiers from a struct down to a nested property.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IdentifierPath(SmallVec<[u32; 4]>);

impl IdentifierPath {
    pub const SEPARATOR: char = ':';

    pub fn new(ids: impl IntoIterator<Item = u32>) -> Self {
        Self(ids.into_iter().collect())
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    pub fn push(&mut self, id: u32) {
        self.0.push(id);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for IdentifierPath {
    type Err = Error;

    /// Segments are hexadecimal, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let mut path = Self::default();
        for segment in s.split(Self::SEPARATOR) {
            let digits = segment.trim();
            let digits = digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))
                .unwrap_or(digits);
            let id = u32::from_str_radix(digits, 16)
                .map_err(|_| Error::invalid_value(format!("bad identifier path segment '{segment}' in '{s}'")))?;
            path.push(id);
        }
        Ok(path)
    }
}

impl fmt::Display for IdentifierPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::SEPARATOR)?;
            }
            write!(f, "{id:#010X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() -> Result<()> {
        let path: IdentifierPath = "0x04:01".parse()?;
        assert_eq!(path.segments(), [4, 1]);
        assert_eq!(path.to_string(), "0x00000004:0x00000001");
        assert_eq!(path.to_string().parse::<IdentifierPath>()?, path);
        assert_eq!("255A4580".parse::<IdentifierPath>()?.segments(), [0x255A_4580]);
        Ok(())
    }

    #[test]
    fn test_bad_segments() {
        assert!("".parse::<IdentifierPath>().is_err());
        assert!("0x04::0x01".parse::<IdentifierPath>().is_err());
        assert!("0x04:zz".parse::<IdentifierPath>().is_err());
        assert!("0x1FFFFFFFF".parse::<IdentifierPath>().is_err());
    }
}
