//! Per-field serialization hints.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Flags that adjust how a single field is framed or formatted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hints(u8);

impl Hints {
    pub const NONE: Self = Self(0);
    /// Text archives format integers as zero-padded hex
    pub const HEX_DISPLAY: Self = Self(1 << 0);
    /// Writers skip the field when it equals its default
    pub const OPTIONAL: Self = Self(1 << 1);
    /// Writers never emit the field
    pub const NEVER_SAVE: Self = Self(1 << 2);
    /// Writers emit the field even when optional and defaulted
    pub const ALWAYS_SAVE: Self = Self(1 << 3);
    /// Text archives store the leaf as an attribute of its parent
    pub const ATTRIBUTE: Self = Self(1 << 4);
    /// Readers take the next sibling without matching its name
    pub const IGNORE_NAME: Self = Self(1 << 5);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Hints {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Hints {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for Hints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Hints, &str); 6] = [
            (Hints::HEX_DISPLAY, "HEX_DISPLAY"),
            (Hints::OPTIONAL, "OPTIONAL"),
            (Hints::NEVER_SAVE, "NEVER_SAVE"),
            (Hints::ALWAYS_SAVE, "ALWAYS_SAVE"),
            (Hints::ATTRIBUTE, "ATTRIBUTE"),
            (Hints::IGNORE_NAME, "IGNORE_NAME"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "Hints(NONE)")
        } else {
            write!(f, "Hints({})", set.join(" | "))
        }
    }
}
