//! # SVG tree
//!
//! A small owned XML tree, enough to read a logo, move its children into
//! another document and write the result back out. Parsing is done with
//! `quick-xml`; serialization is compact (no indentation) and prefixed with
//! the SVG 1.1 preamble.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use quick_xml::escape::{escape, resolve_predefined_entity};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};

/// XML declaration and SVG 1.1 doctype written before every document.
pub const PREAMBLE: &str = concat!(
    "<?xml version=\"1.0\" standalone=\"no\"?>\n",
    "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\"\n",
    "\"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n",
);

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with its attributes in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style [`Element::set_attr`].
    pub fn with_attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Name without its namespace prefix (`svg:rect` → `rect`).
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Consumes the element and hands back its top-level children in order.
    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// First element named `svg`: this one, else the first descendant in
    /// document order. `Err` hands the element back when there is none.
    fn take_svg(self) -> std::result::Result<Element, Element> {
        if self.local_name() == "svg" {
            return Ok(self);
        }
        let Element {
            name,
            attributes,
            children,
        } = self;
        let mut rest = Vec::with_capacity(children.len());
        let mut found = None;
        for node in children {
            match node {
                Node::Element(child) if found.is_none() => match child.take_svg() {
                    Ok(svg) => found = Some(svg),
                    Err(child) => rest.push(Node::Element(child)),
                },
                other => rest.push(other),
            }
        }
        match found {
            Some(svg) => Ok(svg),
            None => Err(Element {
                name,
                attributes,
                children: rest,
            }),
        }
    }

    /// Appends the compact XML form of this element to `out`.
    pub fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_xml(out),
                Node::Text(text) => out.push_str(&escape(text.as_str())),
                Node::CData(text) => {
                    out.push_str("<![CDATA[");
                    out.push_str(text);
                    out.push_str("]]>");
                }
                Node::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parses an XML document.
    ///
    /// Entities declared in an internal DTD subset (`<!ENTITY ns_svg "...">`,
    /// as written by Illustrator) are expanded in attributes and text. The
    /// declaration, doctype and processing instructions are then dropped, as
    /// are whitespace-only text nodes outside text content.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        let mut entities: HashMap<String, String> = HashMap::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::DocType(doctype) => {
                    entities.extend(parse_entities(&String::from_utf8_lossy(&doctype)));
                }
                Event::Start(start) => stack.push(start_element(&reader, &start, &entities)?),
                Event::Empty(start) => {
                    let element = start_element(&reader, &start, &entities)?;
                    attach(&mut stack, &mut root, Node::Element(element))?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::MalformedSvg("unexpected end tag".into()))?;
                    attach(&mut stack, &mut root, Node::Element(element))?;
                }
                Event::Text(text) => {
                    let text = text.unescape_with(|name| resolve_entity(&entities, name))?;
                    if text.trim().is_empty() && !preserves_space(&stack) {
                        continue;
                    }
                    if let Some(parent) = stack.last_mut() {
                        parent.push(Node::Text(text.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                        parent.push(Node::CData(text));
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::MalformedSvg(format!("unclosed element <{}>", open.name)));
        }
        root.map(|root| Document { root })
            .ok_or_else(|| Error::MalformedSvg("no root element".into()))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        Self::parse(&content)
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &Element {
        &self.root
    }

    /// The `<svg>` element of the document: the root itself, else the first
    /// nested `<svg>`, else the root.
    pub fn into_svg(self) -> Element {
        match self.root.take_svg() {
            Ok(svg) => svg,
            Err(root) => root,
        }
    }
}

/// Elements whose whitespace-only text is content, not indentation.
const TEXT_CONTENT: [&str; 3] = ["text", "tspan", "textPath"];

fn preserves_space(stack: &[Element]) -> bool {
    let in_text = stack
        .last()
        .is_some_and(|parent| TEXT_CONTENT.contains(&parent.local_name()));
    let preserve = stack
        .iter()
        .rev()
        .find_map(|element| element.attr("xml:space"))
        == Some("preserve");
    in_text || preserve
}

fn resolve_entity<'a>(entities: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    entities
        .get(name)
        .map(String::as_str)
        .or_else(|| resolve_predefined_entity(name))
}

/// Internal general entities of a doctype such as
/// `svg [<!ENTITY ns_svg "http://www.w3.org/2000/svg">]`.
/// Parameter entities and external (`SYSTEM`/`PUBLIC`) ones are skipped.
fn parse_entities(doctype: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();
    for decl in doctype.split("<!ENTITY").skip(1) {
        let decl = decl.trim_start();
        if decl.starts_with('%') {
            continue;
        }
        let Some((name, rest)) = decl.split_once(char::is_whitespace) else {
            continue;
        };
        let rest = rest.trim_start();
        let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            continue;
        };
        if let Some((value, _)) = rest[1..].split_once(quote) {
            entities.insert(name.to_string(), value.to_string());
        }
    }
    entities
}

fn start_element(
    reader: &Reader<&[u8]>,
    start: &BytesStart<'_>,
    entities: &HashMap<String, String>,
) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value_with(reader.decoder(), |name| {
                resolve_entity(entities, name)
            })?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push(node);
        return Ok(());
    }
    match node {
        Node::Element(element) if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        Node::Element(element) => Err(Error::MalformedSvg(format!(
            "second root element <{}>",
            element.name
        ))),
        _ => Ok(()),
    }
}

/// Serializes `root` behind the SVG preamble.
pub fn to_svg_string(root: &Element) -> String {
    let mut out = String::from(PREAMBLE);
    root.write_xml(&mut out);
    out
}

/// Writes `root` to `path` with the SVG preamble.
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed over `path`, so a failed write never leaves a truncated file.
///
/// A new file gets the permissions a plain `fs::write` would give it (umask
/// applied); an existing file keeps its permissions.
pub fn write_svg(path: &Path, root: &Element) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".qrlogo");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder.tempfile_in(dir).map_err(|err| Error::io(dir, err))?;
    if let Ok(existing) = fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(|err| Error::io(path, err))?;
    }
    file.write_all(to_svg_string(root).as_bytes())
        .map_err(|err| Error::io(path, err))?;
    file.persist(path).map_err(|err| Error::io(path, err.error))?;
    Ok(())
}
