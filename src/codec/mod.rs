//! Value codec primitives.
//!
//! - [`ByteReader`] / [`ByteWriter`] - Byte cursors with a declared [`Endian`]
//! - [`Codec`] - Fixed binary representation per primitive type
//! - [`TextCodec`] - Text representation per primitive type
//! - [`Primitive`] - Object-safe union of both, used by archives
//! - [`InputFile`] - Memory-mapped or buffered file input

mod binary;
mod input;
mod primitive;
mod stream;
mod text;

pub use binary::Codec;
pub use input::InputFile;
pub use primitive::Primitive;
pub use stream::{ByteReader, ByteWriter, Endian};
pub use text::TextCodec;
