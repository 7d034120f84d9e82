//! Description set shared by unit tests.

use crate::util::{FourCC, Result};

use super::{LoadReport, MemorySource, SchemaLoader, VariantSchema};

pub const PRIME: FourCC = FourCC::new(*b"PRME");
pub const ECHOES: FourCC = FourCC::new(*b"ECHO");

const FILES: [(&str, &str); 7] = [
    ("VariantList.xml", include_str!("../../tests/data/schema/VariantList.xml")),
    ("Prime/Master.xml", include_str!("../../tests/data/schema/Prime/Master.xml")),
    ("Prime/Door.xml", include_str!("../../tests/data/schema/Prime/Door.xml")),
    ("Prime/Structs/Hinge.xml", include_str!("../../tests/data/schema/Prime/Structs/Hinge.xml")),
    ("Prime/Enums/DoorState.xml", include_str!("../../tests/data/schema/Prime/Enums/DoorState.xml")),
    ("Echoes/Master.xml", include_str!("../../tests/data/schema/Echoes/Master.xml")),
    ("Echoes/Properties.xml", include_str!("../../tests/data/schema/Echoes/Properties.xml")),
];

pub fn sample_source() -> MemorySource {
    FILES
        .iter()
        .fold(MemorySource::new(), |source, (name, text)| source.with(*name, *text))
}

pub fn prime() -> Result<(VariantSchema, LoadReport)> {
    SchemaLoader::load_variant(&sample_source(), PRIME, "Prime", "Prime/Master.xml")
}
