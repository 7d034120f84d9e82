//! Integration tests for record values under both encodings.

use std::sync::Arc;

use propstream::codec::{Endian, InputFile};
use propstream::core::VersionEnvelope;
use propstream::record::{IdentifierPath, RecordValue};
use propstream::schema::{DirectorySource, MemorySource, SchemaHandle, SchemaLoader, SchemaRegistry, MANIFEST};
use propstream::util::{FourCC, Vec3};
use propstream::value::ScalarValue;

const SCHEMA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/schema");
const TAG: FourCC = FourCC::new(*b"TEST");

/// Single-template variant built from an inline property list.
fn point_schema(properties: &str) -> SchemaHandle {
    let master = format!(
        r#"<MasterTemplate><templates><template ID="0x01" name="Point"><properties>{}</properties></template></templates></MasterTemplate>"#,
        properties
    );
    let source = MemorySource::new().with("Master.xml", master);
    let (schema, report) = SchemaLoader::load_variant(&source, TAG, "Test", "Master.xml").expect("Failed to load schema");
    assert!(report.is_clean(), "{}", report);
    SchemaHandle::template(&Arc::new(schema), 0x01).expect("Point template")
}

const NAME: &str = r#"<property ID="0x01" name="Name" type="string"><default></default></property>"#;
const POSITION: &str = r#"<property ID="0x02" name="Position" type="vector3f"><default>0, 0, 0</default></property>"#;
const SPEED: &str = r#"<property ID="0x03" name="Speed" type="float"><default>1.5</default></property>"#;

fn id(text: &str) -> IdentifierPath {
    text.parse().unwrap()
}

fn moved_point(template: SchemaHandle) -> RecordValue {
    let mut point = RecordValue::instantiate(template);
    point
        .lookup_mut(&id("0x02"))
        .unwrap()
        .set(ScalarValue::Vector3(Vec3::new(1.0, 2.0, 3.0)))
        .unwrap();
    point
}

fn assert_moved(point: &RecordValue) {
    assert_eq!(point.child(0x01).and_then(RecordValue::scalar), Some(&ScalarValue::String(String::new())));
    assert_eq!(
        point.child(0x02).and_then(RecordValue::scalar),
        Some(&ScalarValue::Vector3(Vec3::new(1.0, 2.0, 3.0)))
    );
}

/// Encode with `writer`, decode into a fresh instance of `reader`, both encodings.
fn cross_decode(writer: &mut RecordValue, reader: &SchemaHandle) -> Vec<RecordValue> {
    let bytes = writer.to_binary(0, Endian::Big).expect("binary encode");
    let text = writer.to_text("Point", 0).expect("text encode");

    let mut from_binary = RecordValue::instantiate(reader.clone());
    from_binary.read_binary(&bytes, Endian::Big).expect("binary decode");
    let mut from_text = RecordValue::instantiate(reader.clone());
    from_text.read_text(&text).expect("text decode");
    vec![from_binary, from_text]
}

#[test]
fn test_name_position_round_trip() {
    let template = point_schema(&format!("{NAME}{POSITION}"));
    let mut point = moved_point(template.clone());

    for decoded in cross_decode(&mut point, &template) {
        assert_moved(&decoded);
        assert_eq!(decoded, point);
    }
}

#[test]
fn test_swapped_fields_decode_identically() {
    let template = point_schema(&format!("{NAME}{POSITION}"));
    let swapped = point_schema(&format!("{POSITION}{NAME}"));
    let mut point = moved_point(swapped);

    for decoded in cross_decode(&mut point, &template) {
        assert_moved(&decoded);
        let names: Vec<_> = decoded.children().iter().map(RecordValue::name).collect();
        assert_eq!(names, ["Name", "Position"]);
    }
}

#[test]
fn test_unknown_fields_are_skipped() {
    // Newer writer with an extra field in the middle.
    let newer = point_schema(&format!("{NAME}{SPEED}{POSITION}"));
    let template = point_schema(&format!("{NAME}{POSITION}"));
    let mut point = moved_point(newer);
    point.lookup_mut(&id("0x03")).unwrap().set(ScalarValue::Float(9.0)).unwrap();

    for decoded in cross_decode(&mut point, &template) {
        assert_moved(&decoded);
    }
}

#[test]
fn test_missing_fields_take_defaults() {
    // Older writer without Speed.
    let older = point_schema(&format!("{NAME}{POSITION}"));
    let template = point_schema(&format!("{NAME}{POSITION}{SPEED}"));
    let mut point = moved_point(older);

    for decoded in cross_decode(&mut point, &template) {
        assert_moved(&decoded);
        assert_eq!(decoded.child(0x03).and_then(RecordValue::scalar), Some(&ScalarValue::Float(1.5)));
    }
}

#[test]
fn test_instantiated_records_round_trip() {
    let (registry, _) = SchemaRegistry::load(&DirectorySource::new(SCHEMA_DIR), MANIFEST).expect("schema set");
    for tag in registry.tags() {
        let schema = registry.require(tag).unwrap().clone();
        for (template_id, _) in schema.templates() {
            let template = SchemaHandle::template(&schema, template_id).unwrap();
            let mut record = RecordValue::instantiate(template.clone());
            for revision in 0..schema.revisions().len() as u16 {
                for endian in [Endian::Big, Endian::Little] {
                    let bytes = record.to_binary(revision, endian).unwrap();
                    let mut back = RecordValue::instantiate(template.clone());
                    let env = back.read_binary(&bytes, endian).unwrap();
                    assert_eq!(env, VersionEnvelope::new(revision, tag));
                    assert_eq!(back, record, "{} {:#X} rev {}", tag, template_id, revision);
                }
                let text = record.to_text("Record", revision).unwrap();
                let mut back = RecordValue::instantiate(template.clone());
                back.read_text(&text).unwrap();
                assert_eq!(back, record);
            }
        }
    }
}

#[test]
fn test_array_resize_sequences() {
    let (registry, _) = SchemaRegistry::load(&DirectorySource::new(SCHEMA_DIR), MANIFEST).expect("schema set");
    let door = registry.template(FourCC::new(*b"PRME"), 0x10).unwrap();

    for n in 0..4usize {
        for m in 0..4usize {
            let mut record = RecordValue::instantiate(door.clone());
            let links = record.child_mut(0x07).unwrap();
            links.resize(n).unwrap();
            for (i, link) in links.children_mut().iter_mut().enumerate() {
                link.child_mut(0x01).unwrap().set(ScalarValue::Long(i as i32 + 1)).unwrap();
            }
            links.resize(m).unwrap();

            assert_eq!(links.array_len(), Some(m));
            for (i, link) in links.children().iter().enumerate() {
                let expected = if i < n.min(m) { i as i32 + 1 } else { 0 };
                assert_eq!(link.child(0x01).and_then(RecordValue::scalar), Some(&ScalarValue::Long(expected)));
            }
        }
    }
}

#[test]
fn test_file_round_trip() {
    let (registry, _) = SchemaRegistry::load(&DirectorySource::new(SCHEMA_DIR), MANIFEST).expect("schema set");
    let template = registry.template(FourCC::new(*b"PRME"), 0x11).unwrap();
    let mut trigger = RecordValue::instantiate(template.clone());
    trigger.child_mut(0x20).unwrap().set(ScalarValue::Float(12.0)).unwrap();
    trigger.child_mut(0x01).unwrap().set(ScalarValue::String("Exit".into())).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let binary = dir.path().join("trigger.bin");
    let text = dir.path().join("trigger.xml");
    std::fs::write(&binary, trigger.to_binary(1, Endian::Little).unwrap()).unwrap();
    std::fs::write(&text, trigger.to_text("Trigger", 1).unwrap()).unwrap();

    for path in [&binary, &text] {
        let input = InputFile::open(path).unwrap();
        let mut back = RecordValue::instantiate(template.clone());
        let env = back.read_any(&input, Endian::Little).unwrap();
        println!("{}: {:?}", path.display(), env);
        assert_eq!(env.payload_revision, 1);
        assert_eq!(back, trigger);
    }
}
