//! Schema nodes stored in a [`VariantSchema`](super::VariantSchema) arena.

use std::fmt;

use smallvec::SmallVec;

use super::{CookPreference, PropertyKind};
use crate::value::ScalarValue;

/// Index of a node inside its variant's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enumerator {
    pub id: u32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitFlag {
    pub mask: u32,
    pub name: String,
}

/// One property declaration.
///
/// Structs list their fields in `children`; arrays hold exactly one child,
/// the element template. Children are handles into the arena and may be
/// shared between several parents.
#[derive(Clone, Debug)]
pub struct SchemaNode {
    pub kind: PropertyKind,
    pub id: u32,
    pub name: String,
    pub cook_preference: CookPreference,
    pub default: Option<ScalarValue>,
    pub range: Option<(ScalarValue, ScalarValue)>,
    pub hex: bool,
    /// Payload revision names this node applies to; empty means all.
    pub revisions: SmallVec<[String; 2]>,
    pub children: Vec<NodeId>,
    pub single_property: bool,
    pub element_name: Option<String>,
    pub enumerators: Vec<Enumerator>,
    pub flags: Vec<BitFlag>,
}

impl SchemaNode {
    pub fn new(kind: PropertyKind, id: u32, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
            cook_preference: CookPreference::Always,
            default: None,
            range: None,
            hex: false,
            revisions: SmallVec::new(),
            children: Vec::new(),
            single_property: false,
            element_name: None,
            enumerators: Vec::new(),
            flags: Vec::new(),
        }
    }

    /// Declared default, or the zero value of the kind.
    pub fn default_value(&self) -> Option<ScalarValue> {
        self.default.clone().or_else(|| ScalarValue::zero(self.kind))
    }

    pub fn enumerator(&self, id: u32) -> Option<&Enumerator> {
        self.enumerators.iter().find(|e| e.id == id)
    }

    pub fn enumerator_by_name(&self, name: &str) -> Option<&Enumerator> {
        self.enumerators.iter().find(|e| e.name == name)
    }

    pub fn flag(&self, name: &str) -> Option<&BitFlag> {
        self.flags.iter().find(|f| f.name == name)
    }

    /// Named flags fully set in `value`.
    pub fn flags_set(&self, value: u32) -> impl Iterator<Item = &BitFlag> {
        self.flags
            .iter()
            .filter(move |f| f.mask != 0 && value & f.mask == f.mask)
    }

    /// Bits of `value` not covered by any named flag.
    pub fn unnamed_bits(&self, value: u32) -> u32 {
        self.flags.iter().fold(value, |bits, f| bits & !f.mask)
    }

    /// True if `value` lies within the declared range, or no range is declared.
    pub fn in_range(&self, value: &ScalarValue) -> bool {
        let Some((min, max)) = &self.range else {
            return true;
        };
        match (value.as_f64(), min.as_f64(), max.as_f64()) {
            (Some(v), Some(lo), Some(hi)) => lo <= v && v <= hi,
            _ => true,
        }
    }
}
