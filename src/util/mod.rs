//! Utility types and functions for propstream.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`FourCC`], [`AssetId`], [`RawBytes`] - Small identifier types
//! - [`name_hash`] - Field name hashing for binary archives
//! - Math type re-exports from glam

mod error;
mod hash;
mod ids;
mod math;

pub use error::*;
pub use hash::*;
pub use ids::*;
pub use math::*;
