//! Minimal XML element tree.
//!
//! Text archives and schema descriptions are small documents, so both are
//! parsed into an [`XmlElement`] tree with `quick-xml` and walked in memory.
//! Whitespace-only text between child elements is dropped; leaf text is kept
//! exactly as written.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use smallvec::SmallVec;

use crate::util::{Error, Result};

/// One element with its attributes, text and child elements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: SmallVec<[(String, String); 4]>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get an attribute value by name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        for (k, v) in &mut self.attributes {
            if *k == key {
                *v = value;
                return;
            }
        }
        self.attributes.push((key, value));
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given name.
    pub fn children_named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s XmlElement> + 's {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of a named child, if present.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Parse a document and return its root element.
    pub fn parse(source: &str) -> Result<Self> {
        let mut reader = Reader::from_str(source);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event().map_err(Error::xml)? {
                Event::Start(start) => {
                    stack.push(Self::from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| Error::xml("unbalanced closing tag"))?;
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text.unescape().map_err(Error::xml)?);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8(data.into_inner().into_owned())?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::xml(format!("unclosed element <{}>", stack[stack.len() - 1].name)));
        }
        root.ok_or_else(|| Error::xml("document has no root element"))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8(start.name().as_ref().to_vec())?;
        let mut element = Self::new(name);
        for attr in start.attributes() {
            let attr = attr.map_err(Error::xml)?;
            let key = String::from_utf8(attr.key.as_ref().to_vec())?;
            let value = attr.unescape_value().map_err(Error::xml)?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => *root = Some(element),
            None => return Err(Error::xml("document has more than one root element")),
        }
        Ok(())
    }

    /// Serialize as an indented UTF-8 document with an XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(Error::xml)?;
        self.write_into(&mut writer)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (k, v) in &self.attributes {
            start.push_attribute((k.as_str(), v.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(Error::xml);
        }

        writer.write_event(Event::Start(start)).map_err(Error::xml)?;
        if self.children.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(Error::xml)?;
        } else {
            for child in &self.children {
                child.write_into(writer)?;
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(Error::xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tree() -> crate::util::Result<()> {
        let doc = r#"<?xml version="1.0"?>
            <root kind="a &amp; b">
                <leaf>  padded  </leaf>
                <empty/>
                <nested><x>1</x></nested>
            </root>"#;
        let root = XmlElement::parse(doc)?;
        assert_eq!(root.name, "root");
        assert_eq!(root.attr("kind"), Some("a & b"));
        assert!(root.text.is_empty());
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.child("leaf").map(|c| c.text.as_str()), Some("  padded  "));
        assert_eq!(root.child_text("leaf"), Some("padded"));
        assert_eq!(root.child("nested").and_then(|n| n.child_text("x")), Some("1"));
        Ok(())
    }

    #[test]
    fn test_write_then_parse() -> crate::util::Result<()> {
        let mut root = XmlElement::new("Doc");
        root.set_attr("Size", "2");
        let mut name = XmlElement::new("Name");
        name.text = "<Door> & \"Frame\"".to_string();
        root.push(name);
        root.push(XmlElement::new("Blank"));

        let text = root.to_xml_string()?;
        let back = XmlElement::parse(&text)?;
        assert_eq!(back, root);
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert!(XmlElement::parse("").is_err());
        assert!(XmlElement::parse("<a><b></a>").is_err());
        assert!(XmlElement::parse("<a/><b/>").is_err());
    }
}
