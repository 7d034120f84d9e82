//! Hierarchical text writer.

use crate::codec::Primitive;
use crate::core::VersionEnvelope;
use crate::util::{Error, Result};
use crate::xml::XmlElement;

use super::super::{Archive, Hints};
use super::{element_name, SIZE_ATTR, TYPE_ATTR};

enum Pending {
    Element(XmlElement),
    Attribute { name: String, value: String },
}

/// Builds an element tree with one nested element per field.
pub struct TextWriter {
    env: VersionEnvelope,
    stack: Vec<Pending>,
}

impl TextWriter {
    /// Start a document whose root element is `root_name`.
    pub fn new(root_name: &str, env: VersionEnvelope) -> Self {
        let mut root = XmlElement::new(element_name(root_name));
        root.push(env.to_xml());
        Self {
            env,
            stack: vec![Pending::Element(root)],
        }
    }

    /// Return the finished document tree.
    pub fn finish(mut self) -> Result<XmlElement> {
        if self.stack.len() != 1 {
            return Err(Error::state(format!("{} fields left open", self.stack.len().saturating_sub(1))));
        }
        match self.stack.pop() {
            Some(Pending::Element(root)) => Ok(root),
            _ => Err(Error::state("document root is not an element")),
        }
    }

    fn current(&mut self) -> Result<&mut XmlElement> {
        match self.stack.last_mut() {
            Some(Pending::Element(element)) => Ok(element),
            Some(Pending::Attribute { name, .. }) => Err(Error::state(format!(
                "attribute field {name} cannot hold containers or nested fields"
            ))),
            None => Err(Error::state("archive already finished")),
        }
    }
}

impl Archive for TextWriter {
    fn envelope(&self) -> &VersionEnvelope {
        &self.env
    }

    fn is_reader(&self) -> bool {
        false
    }

    fn is_text(&self) -> bool {
        true
    }

    fn begin_field(&mut self, name: &str, hints: Hints) -> Result<bool> {
        self.current()?;
        let name = element_name(name).into_owned();
        let pending = if hints.contains(Hints::ATTRIBUTE) {
            Pending::Attribute {
                name,
                value: String::new(),
            }
        } else {
            Pending::Element(XmlElement::new(name))
        };
        self.stack.push(pending);
        Ok(true)
    }

    fn end_field(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(Error::state("end_field without a matching begin_field"));
        }
        let finished = self.stack.pop();
        let parent = self.current()?;
        match finished {
            Some(Pending::Element(element)) => parent.push(element),
            Some(Pending::Attribute { name, value }) => parent.set_attr(name, value),
            None => {}
        }
        Ok(())
    }

    fn transfer_primitive(&mut self, value: &mut dyn Primitive, hints: Hints) -> Result<()> {
        let text = value.write_text(hints);
        match self.stack.last_mut() {
            Some(Pending::Element(element)) => element.text = text,
            Some(Pending::Attribute { value, .. }) => *value = text,
            None => return Err(Error::state("archive already finished")),
        }
        Ok(())
    }

    fn transfer_container_size(&mut self, size: &mut u32, _element_name: &str) -> Result<()> {
        self.current()?.set_attr(SIZE_ATTR, size.to_string());
        Ok(())
    }

    fn transfer_polymorphic_tag(&mut self, tag: &mut u32) -> Result<()> {
        self.current()?.set_attr(TYPE_ATTR, format!("{:#010X}", *tag));
        Ok(())
    }
}
