//! Property kinds and cook preferences.

use std::fmt;
use std::str::FromStr;

use crate::util::{Error, Result};

/// Kind of a schema node; fixes the wire width and shape of its values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Bool,
    Byte,
    Short,
    Long,
    Float,
    String,
    Vector3,
    Color,
    Enum,
    Bitfield,
    FileReference,
    Unknown,
    Struct,
    Array,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 14] = [
        Self::Bool,
        Self::Byte,
        Self::Short,
        Self::Long,
        Self::Float,
        Self::String,
        Self::Vector3,
        Self::Color,
        Self::Enum,
        Self::Bitfield,
        Self::FileReference,
        Self::Unknown,
        Self::Struct,
        Self::Array,
    ];

    /// Name used in description files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Long => "long",
            Self::Float => "float",
            Self::String => "string",
            Self::Vector3 => "vector3f",
            Self::Color => "color",
            Self::Enum => "enum",
            Self::Bitfield => "bitfield",
            Self::FileReference => "file",
            Self::Unknown => "unknown",
            Self::Struct => "struct",
            Self::Array => "array",
        }
    }

    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Struct | Self::Array)
    }
}

impl FromStr for PropertyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "bool" => Self::Bool,
            "byte" => Self::Byte,
            "short" => Self::Short,
            "long" => Self::Long,
            "float" => Self::Float,
            "string" => Self::String,
            "vector3f" | "vector3" => Self::Vector3,
            "color" => Self::Color,
            "enum" => Self::Enum,
            "bitfield" => Self::Bitfield,
            "file" | "asset" => Self::FileReference,
            "unknown" => Self::Unknown,
            "struct" => Self::Struct,
            "array" => Self::Array,
            other => return Err(Error::invalid_value(format!("unknown property type '{other}'"))),
        };
        Ok(kind)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a property is written to binary streams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CookPreference {
    #[default]
    Always,
    Never,
    /// Written only when the value differs from its default.
    WhenChanged,
}

impl FromStr for CookPreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" | "default" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "changed" | "whenchanged" => Ok(Self::WhenChanged),
            other => Err(Error::invalid_value(format!("unknown cook preference '{other}'"))),
        }
    }
}
