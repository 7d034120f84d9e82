use std::sync::Arc;

use super::*;
use crate::schema::fixtures::prime;
use crate::util::{AssetId, Vec3};
use crate::value::ResourceRef;

fn door() -> Result<RecordValue> {
    let (schema, _) = prime()?;
    let schema = Arc::new(schema);
    let template = SchemaHandle::template(&schema, 0x10).ok_or_else(|| Error::other("no Door template"))?;
    Ok(RecordValue::instantiate(template))
}

fn path(text: &str) -> IdentifierPath {
    text.parse().unwrap()
}

fn set(record: &mut RecordValue, at: &str, value: ScalarValue) -> Result<()> {
    record
        .lookup_mut(&path(at))
        .ok_or_else(|| Error::other(format!("no property at {at}")))?
        .set(value)
}

#[test]
fn test_instantiate_uses_declared_defaults() -> Result<()> {
    let door = door()?;
    assert_eq!(door.kind(), PropertyKind::Struct);
    assert_eq!(door.children().len(), 9);
    assert_eq!(door.child(0x03).and_then(RecordValue::scalar), Some(&ScalarValue::Bool(true)));
    assert_eq!(
        door.lookup(&path("0x04:0x01")).and_then(RecordValue::scalar),
        Some(&ScalarValue::Vector3(Vec3::Z))
    );
    assert_eq!(door.child_by_name("State").and_then(RecordValue::scalar), Some(&ScalarValue::Enum(0)));
    assert_eq!(door.child(0x07).and_then(RecordValue::array_len), Some(0));
    assert!(door.matches_default());
    Ok(())
}

#[test]
fn test_lookup_absent_is_none() -> Result<()> {
    let door = door()?;
    assert!(door.lookup(&path("0x04:0x09")).is_none());
    assert!(door.lookup(&path("0x99")).is_none());
    assert!(door.lookup(&path("0x01:0x01")).is_none());
    Ok(())
}

#[test]
fn test_clone_is_deep() -> Result<()> {
    let original = door()?;
    let mut copy = original.clone();
    set(&mut copy, "0x01", ScalarValue::String("Vault".into()))?;

    assert_eq!(copy.id(), original.id());
    assert_eq!(copy.template(), original.template());
    assert_ne!(copy, original);
    assert!(original.matches_default());
    assert!(!copy.matches_default());
    Ok(())
}

#[test]
fn test_set_checks_kind_and_range() -> Result<()> {
    let mut door = door()?;
    let err = set(&mut door, "0x01", ScalarValue::Long(4));
    assert!(matches!(err, Err(Error::TypeMismatch { .. })));
    assert!(matches!(door.set(ScalarValue::Bool(true)), Err(Error::TypeMismatch { .. })));

    let (schema, _) = prime()?;
    let schema = Arc::new(schema);
    let mut trigger = RecordValue::instantiate(SchemaHandle::template(&schema, 0x11).unwrap());
    assert!(set(&mut trigger, "0x20", ScalarValue::Float(100.0)).is_ok());
    assert!(matches!(
        set(&mut trigger, "0x20", ScalarValue::Float(100.5)),
        Err(Error::InvalidValue(_))
    ));
    Ok(())
}

#[test]
fn test_array_default_is_empty() -> Result<()> {
    let mut door = door()?;
    let links = door.child_mut(0x07).unwrap();
    links.resize(1)?;
    // The element itself is all defaults, the array is not.
    assert!(links.children()[0].matches_default());
    assert!(!links.matches_default());
    assert!(!door.matches_default());
    Ok(())
}

#[test]
fn test_resize_keeps_prefix() -> Result<()> {
    let mut door = door()?;
    let links = door.child_mut(0x07).unwrap();
    links.resize(3)?;
    for (i, item) in links.children_mut().iter_mut().enumerate() {
        item.child_mut(0x01).unwrap().set(ScalarValue::Long(i as i32 + 10))?;
    }

    links.resize(5)?;
    assert_eq!(links.array_len(), Some(5));
    links.resize(2)?;
    assert_eq!(links.array_len(), Some(2));
    let targets: Vec<_> = links.children().iter().map(|c| c.child(0x01).unwrap().scalar().cloned()).collect();
    assert_eq!(targets, [Some(ScalarValue::Long(10)), Some(ScalarValue::Long(11))]);
    assert_eq!(links.children()[0].name(), "Link");

    links.resize(0)?;
    assert!(links.matches_default());
    assert!(door.child_mut(0x01).unwrap().resize(2).is_err());
    Ok(())
}

fn edited_door() -> Result<RecordValue> {
    let mut door = door()?;
    set(&mut door, "0x01", ScalarValue::String("Vault".into()))?;
    set(&mut door, "0x02", ScalarValue::Vector3(Vec3::new(1.0, 2.0, 3.0)))?;
    set(&mut door, "0x06", ScalarValue::Bitfield(0x3))?;
    set(&mut door, "0x04:0x02", ScalarValue::Float(45.0))?;
    set(&mut door, "0x05", ScalarValue::Enum(2))?;
    set(&mut door, "0x08", ScalarValue::FileReference(ResourceRef::new(AssetId::new(0xDEAD_BEEF))))?;
    set(&mut door, "0x09", ScalarValue::Short(-7))?;
    let links = door.child_mut(0x07).unwrap();
    links.resize(2)?;
    links.children_mut()[1].child_mut(0x02).unwrap().set(ScalarValue::Float(0.5))?;
    Ok(door)
}

#[test]
fn test_binary_round_trip() -> Result<()> {
    let mut door = edited_door()?;
    for endian in [Endian::Big, Endian::Little] {
        let bytes = door.to_binary(1, endian)?;
        let mut back = RecordValue::instantiate(door.template().clone());
        let env = back.read_binary(&bytes, endian)?;
        assert_eq!(env.payload_revision, 1);
        assert_eq!(back, door);
    }
    Ok(())
}

#[test]
fn test_text_round_trip() -> Result<()> {
    let mut door = edited_door()?;
    let text = door.to_text("Door", 1)?;
    assert!(text.contains("<Flags>0x00000003</Flags>"));
    assert!(text.contains("<Links Size=\"2\">"));

    let mut back = RecordValue::instantiate(door.template().clone());
    back.read_text(&text)?;
    assert_eq!(back, door);
    Ok(())
}

#[test]
fn test_revision_scoped_fields() -> Result<()> {
    let mut door = edited_door()?;
    let demo = door.to_binary(0, Endian::Big)?;
    let release = door.to_binary(1, Endian::Big)?;
    assert!(demo.len() < release.len());

    let mut back = RecordValue::instantiate(door.template().clone());
    back.read_binary(&demo, Endian::Big)?;
    assert_eq!(back.child(0x09).and_then(RecordValue::scalar), Some(&ScalarValue::Short(0)));
    assert_eq!(back.child(0x01), door.child(0x01));
    Ok(())
}

#[test]
fn test_cook_preference_when_changed() -> Result<()> {
    let mut door = door()?;
    door.child_mut(0x07).unwrap().resize(1)?;
    let unchanged = door.to_binary(1, Endian::Big)?;

    let element = &mut door.child_mut(0x07).unwrap().children_mut()[0];
    element.child_mut(0x02).unwrap().set(ScalarValue::Float(1.0))?;
    let changed = door.to_binary(1, Endian::Big)?;

    // Delay is a 4-byte float behind a 12-byte field header.
    assert_eq!(changed.len(), unchanged.len() + 12);

    // Text documents keep every field.
    door.child_mut(0x07).unwrap().resize(0)?;
    door.child_mut(0x07).unwrap().resize(1)?;
    assert!(door.to_text("Door", 1)?.contains("<Delay>"));
    Ok(())
}

#[test]
fn test_absent_fields_reset_to_default() -> Result<()> {
    let mut door = door()?;
    let bytes = door.to_binary(0, Endian::Big)?;

    let mut edited = edited_door()?;
    edited.read_binary(&bytes, Endian::Big)?;
    // Sound is not part of the Demo revision, so the stream lacks it.
    assert_eq!(edited.child(0x09).and_then(RecordValue::scalar), Some(&ScalarValue::Short(0)));
    assert!(edited.matches_default());
    Ok(())
}

#[test]
fn test_variant_mismatch() -> Result<()> {
    let mut door = door()?;
    let bytes = door.to_binary(1, Endian::Big)?;
    let mut patched = bytes.clone();
    patched[4..8].copy_from_slice(b"ECHO");
    assert!(matches!(door.read_binary(&patched, Endian::Big), Err(Error::TypeMismatch { .. })));
    Ok(())
}

#[test]
fn test_json_export() -> Result<()> {
    let door = edited_door()?;
    let json = door.to_json();
    assert_eq!(json["Name"], "Vault");
    assert_eq!(json["Position"], serde_json::json!([1.0, 2.0, 3.0]));
    assert_eq!(json["State"], "Jammed");
    assert_eq!(json["Hinge"]["Limit"], 45.0);
    assert_eq!(json["Links"].as_array().map(Vec::len), Some(2));
    assert!(door.to_json_string()?.contains("\"Vault\""));
    Ok(())
}

#[test]
fn test_replace_requires_same_template() -> Result<()> {
    let mut door = door()?;
    let mut hinge = door.child(0x04).unwrap().clone();
    hinge.child_mut(0x02).unwrap().set(ScalarValue::Float(30.0))?;
    door.child_mut(0x04).unwrap().replace(hinge)?;
    assert_eq!(
        door.lookup(&path("0x04:0x02")).and_then(RecordValue::scalar),
        Some(&ScalarValue::Float(30.0))
    );

    let state = door.child(0x05).unwrap().clone();
    let err = door.child_mut(0x04).unwrap().replace(state);
    assert!(matches!(err, Err(Error::TypeMismatch { .. })));
    assert_eq!(door.child(0x04).map(RecordValue::name), Some("Hinge"));
    Ok(())
}
