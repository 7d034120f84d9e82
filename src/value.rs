//! Typed leaf values shared by schema defaults and record instances.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use serde_json::json;

use crate::archive::{Archive, Hints};
use crate::codec::TextCodec;
use crate::schema::PropertyKind;
use crate::util::{AssetId, Error, RawBytes, Result, Vec3, Vec4};

/// Non-owning reference to an external resource.
///
/// Holds the resource id and, optionally, a weak handle to an already
/// resolved resource. Equality compares ids only.
#[derive(Clone, Default)]
pub struct ResourceRef {
    id: AssetId,
    cache: Option<Weak<dyn Any + Send + Sync>>,
}

impl ResourceRef {
    pub fn new(id: AssetId) -> Self {
        Self { id, cache: None }
    }

    #[inline]
    pub fn id(&self) -> AssetId {
        self.id
    }

    /// Point at a different resource, dropping any cached resolve.
    pub fn set_id(&mut self, id: AssetId) {
        self.id = id;
        self.cache = None;
    }

    /// Remember a resolved resource without extending its lifetime.
    pub fn cache<T: Any + Send + Sync>(&mut self, resource: &Arc<T>) {
        let shared: Arc<dyn Any + Send + Sync> = resource.clone();
        self.cache = Some(Arc::downgrade(&shared));
    }

    /// The cached resource, if it is still alive and of type `T`.
    pub fn resolved<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.cache.as_ref()?.upgrade()?.downcast::<T>().ok()
    }
}

impl PartialEq for ResourceRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceRef({:?})", self.id)
    }
}

/// Payload of a primitive-kind property.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Long(i32),
    Float(f32),
    String(String),
    Vector3(Vec3),
    Color(Vec4),
    Enum(u32),
    Bitfield(u32),
    FileReference(ResourceRef),
    Unknown(RawBytes),
}

impl ScalarValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Bool(_) => PropertyKind::Bool,
            Self::Byte(_) => PropertyKind::Byte,
            Self::Short(_) => PropertyKind::Short,
            Self::Long(_) => PropertyKind::Long,
            Self::Float(_) => PropertyKind::Float,
            Self::String(_) => PropertyKind::String,
            Self::Vector3(_) => PropertyKind::Vector3,
            Self::Color(_) => PropertyKind::Color,
            Self::Enum(_) => PropertyKind::Enum,
            Self::Bitfield(_) => PropertyKind::Bitfield,
            Self::FileReference(_) => PropertyKind::FileReference,
            Self::Unknown(_) => PropertyKind::Unknown,
        }
    }

    /// Zero value of a primitive kind; `None` for structs and arrays.
    pub fn zero(kind: PropertyKind) -> Option<Self> {
        Some(match kind {
            PropertyKind::Bool => Self::Bool(false),
            PropertyKind::Byte => Self::Byte(0),
            PropertyKind::Short => Self::Short(0),
            PropertyKind::Long => Self::Long(0),
            PropertyKind::Float => Self::Float(0.0),
            PropertyKind::String => Self::String(String::new()),
            PropertyKind::Vector3 => Self::Vector3(Vec3::ZERO),
            PropertyKind::Color => Self::Color(Vec4::ZERO),
            PropertyKind::Enum => Self::Enum(0),
            PropertyKind::Bitfield => Self::Bitfield(0),
            PropertyKind::FileReference => Self::FileReference(ResourceRef::default()),
            PropertyKind::Unknown => Self::Unknown(RawBytes::default()),
            PropertyKind::Struct | PropertyKind::Array => return None,
        })
    }

    /// Parse text as a value of `kind`, rejecting anything outside its wire width.
    pub fn parse(kind: PropertyKind, text: &str) -> Result<Self> {
        Ok(match kind {
            PropertyKind::Bool => Self::Bool(bool::parse(text)?),
            PropertyKind::Byte => Self::Byte(i8::parse(text)?),
            PropertyKind::Short => Self::Short(i16::parse(text)?),
            PropertyKind::Long => Self::Long(i32::parse(text)?),
            PropertyKind::Float => Self::Float(f32::parse(text)?),
            PropertyKind::String => Self::String(text.to_string()),
            PropertyKind::Vector3 => Self::Vector3(Vec3::parse(text)?),
            PropertyKind::Color => Self::Color(Vec4::parse(text)?),
            PropertyKind::Enum => Self::Enum(u32::parse(text)?),
            PropertyKind::Bitfield => Self::Bitfield(u32::parse(text)?),
            PropertyKind::FileReference => Self::FileReference(ResourceRef::new(AssetId::parse(text)?)),
            PropertyKind::Unknown => Self::Unknown(RawBytes::parse(text)?),
            PropertyKind::Struct | PropertyKind::Array => {
                return Err(Error::invalid_value(format!("{} properties have no scalar value", kind.name())))
            }
        })
    }

    /// Numeric view used for range checks.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Byte(v) => Some(f64::from(*v)),
            Self::Short(v) => Some(f64::from(*v)),
            Self::Long(v) => Some(f64::from(*v)),
            Self::Float(v) => Some(f64::from(*v)),
            Self::Enum(v) | Self::Bitfield(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Text form, as written by text archives.
    pub fn format(&self, hints: Hints) -> String {
        match self {
            Self::Bool(v) => v.format(hints),
            Self::Byte(v) => v.format(hints),
            Self::Short(v) => v.format(hints),
            Self::Long(v) => v.format(hints),
            Self::Float(v) => v.format(hints),
            Self::String(v) => v.format(hints),
            Self::Vector3(v) => v.format(hints),
            Self::Color(v) => v.format(hints),
            Self::Enum(v) | Self::Bitfield(v) => v.format(hints),
            Self::FileReference(r) => r.id.format(hints),
            Self::Unknown(v) => v.format(hints),
        }
    }

    /// Transfer the payload inside an already opened field.
    pub fn transfer(&mut self, ar: &mut dyn Archive, hints: Hints) -> Result<()> {
        match self {
            Self::Bool(v) => ar.transfer_primitive(v, hints),
            Self::Byte(v) => ar.transfer_primitive(v, hints),
            Self::Short(v) => ar.transfer_primitive(v, hints),
            Self::Long(v) => ar.transfer_primitive(v, hints),
            Self::Float(v) => ar.transfer_primitive(v, hints),
            Self::String(v) => ar.transfer_primitive(v, hints),
            Self::Vector3(v) => ar.transfer_primitive(v, hints),
            Self::Color(v) => ar.transfer_primitive(v, hints),
            Self::Enum(v) | Self::Bitfield(v) => ar.transfer_primitive(v, hints),
            Self::FileReference(r) => {
                let mut id = r.id;
                ar.transfer_primitive(&mut id, hints)?;
                if id != r.id {
                    r.set_id(id);
                }
                Ok(())
            }
            Self::Unknown(v) => ar.transfer_primitive(v, hints),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(v) => json!(v),
            Self::Byte(v) => json!(v),
            Self::Short(v) => json!(v),
            Self::Long(v) => json!(v),
            Self::Float(v) => json!(v),
            Self::String(v) => json!(v),
            Self::Vector3(v) => json!(v.to_array()),
            Self::Color(v) => json!(v.to_array()),
            Self::Enum(v) | Self::Bitfield(v) => json!(v),
            Self::FileReference(r) if r.id.is_valid() => json!(r.id.to_string()),
            Self::FileReference(_) => serde_json::Value::Null,
            Self::Unknown(v) => json!(v.format(Hints::NONE)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_respects_wire_width() {
        assert_eq!(ScalarValue::parse(PropertyKind::Byte, "-5").ok(), Some(ScalarValue::Byte(-5)));
        assert!(ScalarValue::parse(PropertyKind::Byte, "300").is_err());
        assert!(ScalarValue::parse(PropertyKind::Short, "70000").is_err());
        assert_eq!(
            ScalarValue::parse(PropertyKind::Enum, "0xFFFFFFFF").ok(),
            Some(ScalarValue::Enum(u32::MAX))
        );
        assert!(ScalarValue::parse(PropertyKind::Struct, "1").is_err());
    }

    #[test]
    fn test_zero_matches_kind() {
        for kind in PropertyKind::ALL {
            match ScalarValue::zero(kind) {
                Some(v) => assert_eq!(v.kind(), kind),
                None => assert!(kind.is_container()),
            }
        }
    }

    #[test]
    fn test_resource_ref_is_weak() {
        let texture = Arc::new(String::from("pixels"));
        let mut r = ResourceRef::new(AssetId::new(7));
        r.cache(&texture);
        assert_eq!(r.resolved::<String>().as_deref(), Some(&"pixels".to_string()));
        assert!(r.resolved::<u32>().is_none());
        assert_eq!(Arc::strong_count(&texture), 1);

        drop(texture);
        assert!(r.resolved::<String>().is_none());
        assert_eq!(r, ResourceRef::new(AssetId::new(7)));
    }
}
