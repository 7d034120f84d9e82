//! Named-field helpers shared by every archive.

use tracing::debug;

use crate::util::Result;

use super::{Archive, Hints, Transfer};

/// Field holding a type's layout version.
const CLASS_VERSION_FIELD: &str = "ClassVersion";

impl<'a> dyn Archive + 'a {
    /// Transfer a named field. Returns `false` when a reader finds no such field.
    #[inline]
    pub fn field<R, T: Transfer<R>>(&mut self, name: &str, value: &mut T) -> Result<bool> {
        self.field_with(name, value, Hints::NONE)
    }

    /// Transfer a named field with explicit hints.
    ///
    /// Writers skip [`Hints::NEVER_SAVE`] fields. An absent field leaves
    /// `value` untouched.
    pub fn field_with<R, T: Transfer<R>>(&mut self, name: &str, value: &mut T, hints: Hints) -> Result<bool> {
        if self.is_writer() && hints.contains(Hints::NEVER_SAVE) {
            return Ok(false);
        }
        if !self.begin_field(name, hints)? {
            debug!(field = name, "field absent, keeping current value");
            return Ok(false);
        }
        value.transfer(self, hints)?;
        self.end_field()?;
        Ok(true)
    }

    /// Transfer a field that has a default value.
    ///
    /// Writers omit [`Hints::OPTIONAL`] fields equal to `default` unless
    /// [`Hints::ALWAYS_SAVE`] is also set. Readers reset `value` to `default`
    /// when the field is absent.
    pub fn field_or<R, T>(&mut self, name: &str, value: &mut T, default: T, hints: Hints) -> Result<bool>
    where
        T: Transfer<R> + PartialEq,
    {
        if self.is_writer() {
            let skippable = hints.contains(Hints::OPTIONAL) && !hints.contains(Hints::ALWAYS_SAVE);
            if skippable && *value == default {
                return Ok(false);
            }
            return self.field_with(name, value, hints);
        }

        let present = self.field_with(name, value, hints)?;
        if !present {
            *value = default;
        }
        Ok(present)
    }

    /// Record a type's layout version and return the stored one.
    ///
    /// Writers store `current`; readers return the stored version, or 0 for
    /// streams written before the type was versioned.
    pub fn class_version(&mut self, current: u32) -> Result<u32> {
        let mut version = current;
        self.field_or(CLASS_VERSION_FIELD, &mut version, 0, Hints::ATTRIBUTE)?;
        Ok(version)
    }
}
