//! Polymorphic fields.
//!
//! A polymorphic field stores a small concrete-type tag ahead of the value's
//! own fields. Readers hand the tag to a caller-supplied factory, which
//! returns a fresh instance of the matching variant (or `None` when the tag
//! is unknown).

use tracing::warn;

use crate::util::{Error, Result};

use super::{Archive, Hints, Serial, ELEMENT};

/// Tag written for an empty polymorphic slot.
pub const NULL_TAG: u32 = u32::MAX;

/// A [`Serial`] type whose concrete variant is identified by a tag.
pub trait Polymorphic: Serial {
    fn type_tag(&self) -> u32;
}

impl<'a> dyn Archive + 'a {
    /// Transfer an optional boxed variant under `name`.
    pub fn polymorphic<T>(&mut self, name: &str, value: &mut Option<Box<T>>, factory: &dyn Fn(u32) -> Option<Box<T>>) -> Result<bool>
    where
        T: Polymorphic + ?Sized,
    {
        if !self.begin_field(name, Hints::NONE)? {
            return Ok(false);
        }
        if self.is_writer() {
            match value.as_mut() {
                Some(v) => self.write_variant(&mut **v)?,
                None => {
                    let mut tag = NULL_TAG;
                    self.transfer_polymorphic_tag(&mut tag)?;
                }
            }
        } else {
            *value = self.read_variant(factory)?;
        }
        self.end_field()?;
        Ok(true)
    }

    /// Transfer a list of boxed variants under `name`.
    ///
    /// Readers skip elements whose tag the factory does not recognize,
    /// logging a warning for each, and keep the rest in order.
    pub fn polymorphic_elements<T>(&mut self, name: &str, values: &mut Vec<Box<T>>, factory: &dyn Fn(u32) -> Option<Box<T>>) -> Result<bool>
    where
        T: Polymorphic + ?Sized,
    {
        if !self.begin_field(name, Hints::NONE)? {
            return Ok(false);
        }

        let mut count = u32::try_from(values.len())
            .map_err(|_| Error::invalid_value(format!("{} polymorphic elements is too many", values.len())))?;
        self.transfer_container_size(&mut count, ELEMENT)?;

        if self.is_writer() {
            for value in values.iter_mut() {
                self.begin_field(ELEMENT, Hints::IGNORE_NAME)?;
                self.write_variant(&mut **value)?;
                self.end_field()?;
            }
        } else {
            values.clear();
            for index in 0..count {
                if !self.begin_field(ELEMENT, Hints::IGNORE_NAME)? {
                    return Err(Error::malformed(format!(
                        "{name} declares {count} elements but element {index} is missing"
                    )));
                }
                let mut tag = NULL_TAG;
                self.transfer_polymorphic_tag(&mut tag)?;
                if tag != NULL_TAG {
                    match factory(tag) {
                        Some(mut value) => {
                            value.serialize(self)?;
                            values.push(value);
                        }
                        None => warn!(field = name, index, "skipping element of unknown variant {tag:#010X}"),
                    }
                }
                self.end_field()?;
            }
        }

        self.end_field()?;
        Ok(true)
    }

    fn write_variant<T: Polymorphic + ?Sized>(&mut self, value: &mut T) -> Result<()> {
        let mut tag = value.type_tag();
        self.transfer_polymorphic_tag(&mut tag)?;
        value.serialize(self)
    }

    fn read_variant<T: Polymorphic + ?Sized>(&mut self, factory: &dyn Fn(u32) -> Option<Box<T>>) -> Result<Option<Box<T>>> {
        let mut tag = NULL_TAG;
        self.transfer_polymorphic_tag(&mut tag)?;
        if tag == NULL_TAG {
            return Ok(None);
        }
        let mut value = factory(tag).ok_or(Error::UnknownVariant { tag })?;
        value.serialize(self)?;
        Ok(Some(value))
    }
}
