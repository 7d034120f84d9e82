//! Text representation of each primitive.
//!
//! Numbers are decimal unless the field carries [`Hints::HEX_DISPLAY`], in
//! which case integers are written as zero-padded `0x` hex. Parsing accepts
//! both forms regardless of hints.

use crate::archive::Hints;
use crate::util::{format_components, parse_components, AssetId, Error, FourCC, RawBytes, Result, Vec3, Vec4};

/// Text codec for one primitive type.
pub trait TextCodec: Sized {
    fn format(&self, hints: Hints) -> String;
    fn parse(text: &str) -> Result<Self>;
}

fn invalid<T>(text: &str, what: &str) -> Result<T> {
    Err(Error::invalid_value(format!("{text:?} is not a valid {what}")))
}

fn strip_hex(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

macro_rules! integer_text {
    ($($ty:ty => $unsigned:ty;)*) => {
        $(
            impl TextCodec for $ty {
                fn format(&self, hints: Hints) -> String {
                    if hints.contains(Hints::HEX_DISPLAY) {
                        let width = std::mem::size_of::<$ty>() * 2 + 2;
                        format!("{:#0width$X}", *self as $unsigned, width = width)
                    } else {
                        self.to_string()
                    }
                }

                fn parse(text: &str) -> Result<Self> {
                    let text = text.trim();
                    let parsed = match strip_hex(text) {
                        Some(hex) => <$unsigned>::from_str_radix(hex, 16).ok().map(|v| v as $ty),
                        None => text.parse::<$ty>().ok(),
                    };
                    match parsed {
                        Some(v) => Ok(v),
                        None => invalid(text, stringify!($ty)),
                    }
                }
            }
        )*
    };
}

integer_text! {
    u8 => u8;
    i8 => u8;
    u16 => u16;
    i16 => u16;
    u32 => u32;
    i32 => u32;
    u64 => u64;
    i64 => u64;
}

macro_rules! float_text {
    ($($ty:ty),*) => {
        $(
            impl TextCodec for $ty {
                fn format(&self, _hints: Hints) -> String {
                    self.to_string()
                }

                fn parse(text: &str) -> Result<Self> {
                    let text = text.trim();
                    match text.parse::<$ty>() {
                        Ok(v) => Ok(v),
                        Err(_) => invalid(text, stringify!($ty)),
                    }
                }
            }
        )*
    };
}

float_text!(f32, f64);

impl TextCodec for bool {
    fn format(&self, _hints: Hints) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Result<Self> {
        match text.trim() {
            "true" | "True" | "1" => Ok(true),
            "false" | "False" | "0" => Ok(false),
            other => invalid(other, "bool"),
        }
    }
}

impl TextCodec for String {
    fn format(&self, _hints: Hints) -> String {
        self.clone()
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(text.to_string())
    }
}

impl TextCodec for Vec3 {
    fn format(&self, _hints: Hints) -> String {
        format_components(&self.to_array())
    }

    fn parse(text: &str) -> Result<Self> {
        match parse_components::<3>(text) {
            Some(c) => Ok(Vec3::from_array(c)),
            None => invalid(text, "vector"),
        }
    }
}

impl TextCodec for Vec4 {
    fn format(&self, _hints: Hints) -> String {
        format_components(&self.to_array())
    }

    fn parse(text: &str) -> Result<Self> {
        match parse_components::<4>(text) {
            Some(c) => Ok(Vec4::from_array(c)),
            None => invalid(text, "color"),
        }
    }
}

impl TextCodec for FourCC {
    fn format(&self, _hints: Hints) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Result<Self> {
        text.parse()
    }
}

impl TextCodec for AssetId {
    fn format(&self, _hints: Hints) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Result<Self> {
        <u64 as TextCodec>::parse(text).map(AssetId::new)
    }
}

impl TextCodec for RawBytes {
    fn format(&self, _hints: Hints) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }

    fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.len() % 2 != 0 || !text.is_ascii() {
            return invalid(text, "hex byte string");
        }
        (0..text.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&text[i..i + 2], 16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(RawBytes)
            .or_else(|_| invalid(text, "hex byte string"))
    }
}
