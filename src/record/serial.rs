//! Archive transfer for record values.
//!
//! Struct fields are named by their declared names; arrays store their size
//! followed by one positional element field per item. Binary writers honor
//! cook preferences, text writers store every field. Fields not declared
//! for the stream's payload revision are not written, and read back as
//! their defaults.

use tracing::debug;

use super::{RecordData, RecordValue};
use crate::archive::{Archive, Hints, Serial, ELEMENT};
use crate::schema::CookPreference;
use crate::util::{Error, Result};

impl Serial for RecordValue {
    fn serialize(&mut self, ar: &mut dyn Archive) -> Result<()> {
        let hints = self.value_hints();
        self.transfer_body(ar, hints)
    }
}

impl RecordValue {
    fn value_hints(&self) -> Hints {
        if self.node().hex {
            Hints::HEX_DISPLAY
        } else {
            Hints::NONE
        }
    }

    fn field_hints(&self, text: bool) -> Hints {
        let hints = self.value_hints();
        if text {
            return hints;
        }
        hints
            | match self.node().cook_preference {
                CookPreference::Always => Hints::ALWAYS_SAVE,
                CookPreference::Never => Hints::NEVER_SAVE,
                CookPreference::WhenChanged => Hints::OPTIONAL,
            }
    }

    fn skip_on_write(&self, hints: Hints) -> bool {
        hints.contains(Hints::NEVER_SAVE)
            || (hints.contains(Hints::OPTIONAL) && !hints.contains(Hints::ALWAYS_SAVE) && self.matches_default())
    }

    fn transfer_body(&mut self, ar: &mut dyn Archive, hints: Hints) -> Result<()> {
        match &mut self.data {
            RecordData::Scalar(value) => value.transfer(ar, hints),
            RecordData::Struct(fields) => transfer_fields(fields, ar),
            RecordData::Array(items) => {
                let node = self.template.node();
                let label = node.element_name.as_deref().unwrap_or(ELEMENT);
                let mut count = u32::try_from(items.len())
                    .map_err(|_| Error::invalid_value(format!("array {} is too large", node.name)))?;
                ar.transfer_container_size(&mut count, label)?;

                if ar.is_writer() {
                    for item in items.iter_mut() {
                        ar.begin_field(ELEMENT, Hints::IGNORE_NAME)?;
                        let hints = item.value_hints();
                        item.transfer_body(ar, hints)?;
                        ar.end_field()?;
                    }
                    return Ok(());
                }

                let element = self
                    .template
                    .element()
                    .ok_or_else(|| Error::invalid_value(format!("array {} has no element template", node.name)))?;
                items.clear();
                for index in 0..count {
                    if !ar.begin_field(ELEMENT, Hints::IGNORE_NAME)? {
                        return Err(Error::malformed(format!(
                            "array {} declares {count} elements but element {index} is missing",
                            node.name
                        )));
                    }
                    let mut item = RecordValue::instantiate(element.clone());
                    let hints = item.value_hints();
                    item.transfer_body(ar, hints)?;
                    ar.end_field()?;
                    items.push(item);
                }
                Ok(())
            }
        }
    }
}

fn transfer_fields(fields: &mut [RecordValue], ar: &mut dyn Archive) -> Result<()> {
    let revision = ar.envelope().payload_revision;
    let text = ar.is_text();

    for field in fields.iter_mut() {
        if !field.template.is_applicable(revision) {
            if ar.is_reader() {
                *field = RecordValue::instantiate(field.template.clone());
            }
            continue;
        }
        let hints = field.field_hints(text);
        if ar.is_writer() && field.skip_on_write(hints) {
            continue;
        }

        let template = field.template.clone();
        let name = template.node().name.as_str();
        if !ar.begin_field(name, hints)? {
            debug!(field = name, "field absent, using default");
            *field = RecordValue::instantiate(template.clone());
            continue;
        }
        field.transfer_body(ar, hints)?;
        ar.end_field()?;
    }
    Ok(())
}
