//! Parameter state tree
//!
//! `ValueTree` is the shape the parameter store hands out and accepts back:
//! a named node with ordered string attributes and ordered children. Its XML
//! form is one element per node, so the synth state looks like:
//!
//! ```text
//! <Parameters>
//!   <PARAM id="Attack" value="0.0"/>
//!   <PARAM id="Decay" value="0.65"/>
//!   ...
//! </Parameters>
//! ```

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io;
use thiserror::Error;

/// Problems turning XML text into a `ValueTree`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum XmlError {
    /// The text is not well-formed XML
    #[error("malformed XML at byte {position}: {reason}")]
    Malformed { position: u64, reason: String },

    /// No element at all
    #[error("document has no root element")]
    NoRootElement,

    /// More than one top-level element
    #[error("document has more than one root element")]
    MultipleRoots,
}

/// A named tree of string properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueTree {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<ValueTree>,
}

impl ValueTree {
    /// Create an empty node of the given type
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder form of [`add_child`](Self::add_child)
    pub fn with_child(mut self, child: ValueTree) -> Self {
        self.add_child(child);
        self
    }

    /// Node type (the XML tag)
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn children(&self) -> &[ValueTree] {
        &self.children
    }

    pub fn add_child(&mut self, child: ValueTree) {
        self.children.push(child);
    }

    /// First child of type `tag` whose `key` attribute equals `value`
    pub fn find_child(&self, tag: &str, key: &str, value: &str) -> Option<&ValueTree> {
        self.children
            .iter()
            .find(|c| c.has_tag(tag) && c.attribute(key) == Some(value))
    }

    pub fn find_child_mut(&mut self, tag: &str, key: &str, value: &str) -> Option<&mut ValueTree> {
        self.children
            .iter_mut()
            .find(|c| c.has_tag(tag) && c.attribute(key) == Some(value))
    }

    // ─────────────────────────────────────────────────────────────────────
    // XML codec
    // ─────────────────────────────────────────────────────────────────────

    /// Serialize to indented XML (without declaration)
    pub fn to_xml(&self) -> io::Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_element(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(io::Error::other)
    }

    fn write_element(&self, writer: &mut Writer<Vec<u8>>) -> io::Result<()> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .map_err(io::Error::other)?;
            return Ok(());
        }

        writer
            .write_event(Event::Start(start))
            .map_err(io::Error::other)?;
        for child in &self.children {
            child.write_element(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.tag.as_str())))
            .map_err(io::Error::other)?;
        Ok(())
    }

    /// Parse a document with exactly one root element
    pub fn from_xml(xml: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut open: Vec<ValueTree> = Vec::new();
        let mut root: Option<ValueTree> = None;

        loop {
            let position = reader.buffer_position();
            let malformed = |reason: String| XmlError::Malformed {
                position: position as u64,
                reason,
            };

            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    open.push(element_from(&reader, &e).map_err(malformed)?);
                }
                Ok(Event::Empty(e)) => {
                    let node = element_from(&reader, &e).map_err(malformed)?;
                    attach(node, &mut open, &mut root)?;
                }
                Ok(Event::End(_)) => {
                    let node = open
                        .pop()
                        .ok_or_else(|| malformed("unexpected closing tag".to_string()))?;
                    attach(node, &mut open, &mut root)?;
                }
                Ok(Event::Text(t)) if open.is_empty() => {
                    if t.iter().any(|b| !b.is_ascii_whitespace()) {
                        return Err(malformed("text outside the root element".to_string()));
                    }
                }
                Ok(Event::Eof) => break,
                // Declarations, comments, processing instructions and inner text
                Ok(_) => {}
                Err(e) => return Err(malformed(e.to_string())),
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(XmlError::Malformed {
                position: reader.buffer_position() as u64,
                reason: format!("unclosed element <{}>", unclosed.tag),
            });
        }

        root.ok_or(XmlError::NoRootElement)
    }
}

fn element_from(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<ValueTree, String> {
    let mut node = ValueTree::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| e.to_string())?;
        node.set_attribute(key, value.into_owned());
    }
    Ok(node)
}

fn attach(
    node: ValueTree,
    open: &mut [ValueTree],
    root: &mut Option<ValueTree>,
) -> Result<(), XmlError> {
    if let Some(parent) = open.last_mut() {
        parent.add_child(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::MultipleRoots);
    }
    *root = Some(node);
    Ok(())
}
