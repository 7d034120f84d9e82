//! Hierarchical text reader.

use tracing::trace;

use crate::codec::{Primitive, TextCodec};
use crate::core::VersionEnvelope;
use crate::util::{Error, Result};
use crate::xml::XmlElement;

use super::super::{Archive, Hints, NULL_TAG};
use super::{element_name, SIZE_ATTR, TYPE_ATTR};

#[derive(Clone, Copy)]
enum Frame<'a> {
    Element {
        node: &'a XmlElement,
        /// Child after the most recently entered one
        next: usize,
        /// First child that can hold a field
        first: usize,
    },
    Attribute {
        value: &'a str,
    },
}

/// Walks a parsed document, matching fields to child elements by name.
pub struct TextReader<'a> {
    env: VersionEnvelope,
    frames: Vec<Frame<'a>>,
}

impl<'a> TextReader<'a> {
    /// Read the envelope from the root's first child and open the root.
    pub fn new(root: &'a XmlElement) -> Result<Self> {
        let env = VersionEnvelope::read_xml(root)?;
        Ok(Self {
            env,
            frames: vec![Frame::Element {
                node: root,
                next: 1,
                first: 1,
            }],
        })
    }

    fn current(&self) -> Result<&'a XmlElement> {
        match self.frames.last() {
            Some(Frame::Element { node, .. }) => Ok(*node),
            Some(Frame::Attribute { .. }) => Err(Error::state("attribute fields cannot hold containers or nested fields")),
            None => Err(Error::state("no open element")),
        }
    }
}

impl Archive for TextReader<'_> {
    fn envelope(&self) -> &VersionEnvelope {
        &self.env
    }

    fn is_reader(&self) -> bool {
        true
    }

    fn is_text(&self) -> bool {
        true
    }

    fn begin_field(&mut self, name: &str, hints: Hints) -> Result<bool> {
        let (node, next, first) = match self.frames.last() {
            Some(Frame::Element { node, next, first }) => (*node, *next, *first),
            _ => return Err(Error::state("attribute fields cannot hold nested fields")),
        };
        let name = element_name(name);

        if hints.contains(Hints::ATTRIBUTE) {
            if let Some(value) = node.attr(&name) {
                self.frames.push(Frame::Attribute { value });
                return Ok(true);
            }
        }

        let found = if hints.contains(Hints::IGNORE_NAME) {
            (next < node.children.len()).then_some(next)
        } else if node.children.get(next).is_some_and(|c| c.name == name) {
            Some(next)
        } else {
            trace!(field = %name, "field not at cursor, scanning siblings");
            node.children
                .iter()
                .enumerate()
                .skip(first)
                .find(|(_, c)| c.name == name)
                .map(|(i, _)| i)
        };

        let Some(index) = found else {
            return Ok(false);
        };
        if let Some(Frame::Element { next, .. }) = self.frames.last_mut() {
            *next = index + 1;
        }
        self.frames.push(Frame::Element {
            node: &node.children[index],
            next: 0,
            first: 0,
        });
        Ok(true)
    }

    fn end_field(&mut self) -> Result<()> {
        if self.frames.len() <= 1 {
            return Err(Error::state("end_field without a matching begin_field"));
        }
        self.frames.pop();
        Ok(())
    }

    fn transfer_primitive(&mut self, value: &mut dyn Primitive, _hints: Hints) -> Result<()> {
        match self.frames.last() {
            Some(Frame::Element { node, .. }) => value.read_text(&node.text),
            Some(Frame::Attribute { value: text }) => value.read_text(text),
            None => Err(Error::state("no open element")),
        }
    }

    fn transfer_container_size(&mut self, size: &mut u32, _element_name: &str) -> Result<()> {
        let node = self.current()?;
        *size = match node.attr(SIZE_ATTR) {
            Some(text) => <u32 as TextCodec>::parse(text)?,
            None => u32::try_from(node.children.len())
                .map_err(|_| Error::malformed(format!("<{}> has too many elements", node.name)))?,
        };
        Ok(())
    }

    fn transfer_polymorphic_tag(&mut self, tag: &mut u32) -> Result<()> {
        let node = self.current()?;
        *tag = match node.attr(TYPE_ATTR) {
            Some(text) => <u32 as TextCodec>::parse(text)?,
            None => NULL_TAG,
        };
        Ok(())
    }
}
