//! All loaded variants, keyed by variant tag.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::{DescriptionSource, LoadReport, SchemaError, SchemaHandle, SchemaLoader, VariantSchema};
use crate::util::{Error, FourCC, Result};
use crate::xml::XmlElement;

/// Default manifest name inside a description directory.
pub const MANIFEST: &str = "VariantList.xml";

/// Read-only set of variant schemas, shared once loaded.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    variants: BTreeMap<FourCC, Arc<VariantSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every variant listed in `manifest`.
    ///
    /// Node-level problems are collected in the returned report. An
    /// unreadable manifest or master description is an error.
    pub fn load(source: &dyn DescriptionSource, manifest: &str) -> Result<(Self, LoadReport)> {
        let text = source
            .read(manifest)
            .map_err(|e| Error::schema(manifest, e.to_string()))?;
        let root = XmlElement::parse(&text).map_err(|e| Error::schema(manifest, e.to_string()))?;

        let mut registry = Self::new();
        let mut report = LoadReport::default();
        for entry in root.children_named("variant") {
            let tag = entry.attr("tag").map(str::parse::<FourCC>);
            let (Some(Ok(tag)), Some(master)) = (tag, entry.attr("master")) else {
                report.push(SchemaError {
                    source_name: manifest.to_string(),
                    id: None,
                    reason: "variant entry needs a four-character tag and a master file".into(),
                });
                continue;
            };
            let name = entry.attr("name").unwrap_or(master);
            let (schema, variant_report) = SchemaLoader::load_variant(source, tag, name, master)?;
            report.merge(variant_report);
            registry.insert(schema);
        }

        info!(variants = registry.len(), errors = report.len(), "schema registry loaded");
        Ok((registry, report))
    }

    /// Add or replace a variant.
    pub fn insert(&mut self, schema: VariantSchema) -> Arc<VariantSchema> {
        let schema = Arc::new(schema);
        if self.variants.insert(schema.tag(), schema.clone()).is_some() {
            debug!(variant = %schema.tag(), "replaced variant schema");
        }
        schema
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = FourCC> + '_ {
        self.variants.keys().copied()
    }

    pub fn get(&self, tag: FourCC) -> Option<&Arc<VariantSchema>> {
        self.variants.get(&tag)
    }

    pub fn require(&self, tag: FourCC) -> Result<&Arc<VariantSchema>> {
        self.get(tag).ok_or_else(|| Error::VariantNotFound(tag.to_string()))
    }

    /// Record template `id` of variant `tag`.
    pub fn template(&self, tag: FourCC, id: u32) -> Option<SchemaHandle> {
        SchemaHandle::template(self.get(tag)?, id)
    }

    /// Master-list node `id` of variant `tag`.
    pub fn master(&self, tag: FourCC, id: u32) -> Option<SchemaHandle> {
        let schema = self.get(tag)?;
        schema.master(id).map(|n| SchemaHandle::new(schema.clone(), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::{sample_source, ECHOES, PRIME};
    use crate::schema::MemorySource;

    #[test]
    fn test_identifiers_are_scoped_per_variant() -> Result<()> {
        let (registry, report) = SchemaRegistry::load(&sample_source(), MANIFEST)?;
        assert!(report.is_clean(), "{report}");
        assert_eq!(registry.tags().collect::<Vec<_>>(), [ECHOES, PRIME]);

        let door = registry.template(PRIME, 0x10).unwrap();
        let crate_ = registry.template(ECHOES, 0x10).unwrap();
        assert_eq!(door.node().name, "Door");
        assert_eq!(crate_.node().name, "Crate");
        assert_eq!(registry.master(ECHOES, 0x01).unwrap().node().name, "Label");
        assert_eq!(registry.master(PRIME, 0x01).unwrap().node().name, "Name");
        assert_eq!(registry.require(ECHOES)?.format_revision(), 5);
        Ok(())
    }

    #[test]
    fn test_missing_variant() -> Result<()> {
        let (registry, _) = SchemaRegistry::load(&sample_source(), MANIFEST)?;
        let tag = FourCC::new(*b"MP3X");
        assert!(registry.template(tag, 0x10).is_none());
        assert!(matches!(registry.require(tag), Err(Error::VariantNotFound(_))));
        Ok(())
    }

    #[test]
    fn test_bad_manifest_entries() -> Result<()> {
        let source = sample_source().with(
            "Broken.xml",
            r#"<VariantList>
                 <variant tag="TOOLONG" master="Prime/Master.xml"/>
                 <variant tag="PRME" master="Prime/Master.xml"/>
               </VariantList>"#,
        );
        let (registry, report) = SchemaRegistry::load(&source, "Broken.xml")?;
        assert_eq!(registry.len(), 1);
        assert_eq!(report.len(), 1);
        assert!(SchemaRegistry::load(&MemorySource::new(), MANIFEST).is_err());
        Ok(())
    }
}
