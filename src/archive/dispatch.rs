//! Compile-time selection of how a value is transferred.
//!
//! Every transferable type reaches an archive through exactly one route:
//!
//! - [`route::Primitive`]: types with a direct codec ([`Primitive`])
//! - [`route::Member`]: types with their own [`Serial::serialize`]
//! - [`route::Global`]: types adapted by an associated [`GlobalSerial`] function
//! - [`route::Sequence`], [`route::Map`], [`route::Optional`]: std containers,
//!   routed by their element types
//!
//! Field helpers are generic over the route marker, so the compiler infers it
//! from the single applicable impl. A type with no route fails to build; a
//! type with two routes is rejected as ambiguous.

use crate::codec::Primitive;
use crate::util::Result;

use super::{Archive, Hints};

/// Route marker types.
pub mod route {
    use std::marker::PhantomData;

    /// Direct codec
    pub enum Primitive {}
    /// Own `serialize` member
    pub enum Member {}
    /// Associated adapter function
    pub enum Global {}
    /// `Vec<T>` with element route `R`
    pub struct Sequence<R>(PhantomData<R>);
    /// `BTreeMap<K, V>` with key and value routes
    pub struct Map<K, V>(PhantomData<(K, V)>);
    /// `Option<T>` with element route `R`
    pub struct Optional<R>(PhantomData<R>);
}

/// Types that describe their own fields.
pub trait Serial {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()>;
}

/// Types serialized by an adapter function instead of a member.
///
/// Useful for foreign types that cannot implement [`Serial`] directly.
pub trait GlobalSerial {
    fn serialize_global(value: &mut Self, ar: &mut dyn Archive, hints: Hints) -> Result<()>;
}

/// Transfer the contents of an already opened field.
pub trait Transfer<R> {
    fn transfer(&mut self, ar: &mut dyn Archive, hints: Hints) -> Result<()>;
}

impl<T: Primitive> Transfer<route::Primitive> for T {
    #[inline]
    fn transfer(&mut self, ar: &mut dyn Archive, hints: Hints) -> Result<()> {
        ar.transfer_primitive(self, hints)
    }
}

impl<T: Serial> Transfer<route::Member> for T {
    #[inline]
    fn transfer(&mut self, ar: &mut dyn Archive, _hints: Hints) -> Result<()> {
        self.serialize(ar)
    }
}

impl<T: GlobalSerial> Transfer<route::Global> for T {
    #[inline]
    fn transfer(&mut self, ar: &mut dyn Archive, hints: Hints) -> Result<()> {
        T::serialize_global(self, ar, hints)
    }
}
