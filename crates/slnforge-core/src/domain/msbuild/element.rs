//! Lossless XML element tree.
//!
//! Start and end tags, text, comments and declarations are kept verbatim as
//! they were read, so a document that is parsed and rendered without edits
//! reproduces its input byte for byte. Only the tags touched by an edit are
//! regenerated.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::domain::error::DomainError;

const INDENT: &str = "  ";
const BOM: char = '\u{feff}';

/// Where an element sits in the document, used to indent inserted children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub depth: usize,
    pub newline: &'static str,
}

impl Layout {
    pub fn child(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    fn indent(self) -> String {
        INDENT.repeat(self.depth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    /// Escaped character data, exactly as written in the source.
    Text(String),
    CData(String),
    /// Comments, declarations, processing instructions and doctypes.
    Markup(String),
}

impl XmlNode {
    fn is_whitespace(&self) -> bool {
        matches!(self, XmlNode::Text(text) if text.trim().is_empty())
    }

    fn write(&self, out: &mut String) {
        match self {
            XmlNode::Element(element) => element.write(out),
            XmlNode::Text(text) | XmlNode::Markup(text) => out.push_str(text),
            XmlNode::CData(data) => {
                out.push_str("<![CDATA[");
                out.push_str(data);
                out.push_str("]]>");
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
    raw_start: Option<String>,
    raw_end: Option<String>,
    self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            raw_start: None,
            raw_end: None,
            self_closing: true,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_text(name: impl Into<String>, text: &str) -> Self {
        let mut element = Self::new(name);
        element.set_text(text);
        element
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) if *existing == value => return,
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
        self.raw_start = None;
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == key)?;
        self.raw_start = None;
        Some(self.attributes.remove(index).1)
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Unescaped, trimmed character content of this element.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(raw) => match unescape(raw) {
                    Ok(value) => text.push_str(&value),
                    Err(_) => text.push_str(raw),
                },
                XmlNode::CData(data) => text.push_str(data),
                _ => {}
            }
        }
        text.trim().to_owned()
    }

    /// Replace the content with `value`. A no-op when the text is unchanged.
    pub fn set_text(&mut self, value: &str) {
        if self.elements().next().is_none() && !self.children.is_empty() && self.text() == value
        {
            return;
        }
        self.open();
        self.children = if value.is_empty() {
            Vec::new()
        } else {
            vec![XmlNode::Text(partial_escape(value).into_owned())]
        };
    }

    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(Element::text)
    }

    /// Set the text of the first child named `name`, appending one if absent.
    /// `layout` describes this element, not the child.
    pub fn set_child_text(&mut self, name: &str, value: &str, layout: Layout) {
        match self.child_mut(name) {
            Some(child) => child.set_text(value),
            None => self.append_element(Element::with_text(name, value), layout),
        }
    }

    /// Append `child` as the last element, indented one level below `layout`.
    pub fn append_element(&mut self, child: Element, layout: Layout) {
        self.open();
        match self.children.last() {
            Some(last) if last.is_whitespace() => {
                let at = self.children.len() - 1;
                self.children.insert(at, XmlNode::Element(child));
                self.children.insert(at, indentation(layout.child()));
            }
            _ => {
                self.children.push(indentation(layout.child()));
                self.children.push(XmlNode::Element(child));
                self.children.push(indentation(layout));
            }
        }
    }

    /// Insert `child` directly after the node at `index`.
    pub fn insert_element_after(&mut self, index: usize, child: Element, layout: Layout) {
        if index >= self.children.len() {
            self.append_element(child, layout);
            return;
        }
        self.children.insert(index + 1, XmlNode::Element(child));
        self.children.insert(index + 1, indentation(layout.child()));
    }

    /// Node index of the last child element matching `predicate`.
    pub fn last_position(&self, predicate: impl Fn(&Element) -> bool) -> Option<usize> {
        self.children.iter().rposition(|node| match node {
            XmlNode::Element(element) => predicate(element),
            _ => false,
        })
    }

    /// Remove every child element matching `predicate`, together with the
    /// whitespace that indented it. Returns how many were removed.
    pub fn remove_elements(&mut self, predicate: impl Fn(&Element) -> bool) -> usize {
        let mut removed = 0;
        let mut index = self.children.len();
        while index > 0 {
            index -= 1;
            let matches = match &self.children[index] {
                XmlNode::Element(element) => predicate(element),
                _ => false,
            };
            if !matches {
                continue;
            }
            self.children.remove(index);
            removed += 1;
            if index > 0 && self.children[index - 1].is_whitespace() {
                self.children.remove(index - 1);
                index -= 1;
            }
        }
        removed
    }

    fn open(&mut self) {
        if !self.self_closing {
            return;
        }
        self.self_closing = false;
        if let Some(raw) = self.raw_start.take() {
            let head = raw.trim_end_matches("/>").trim_end();
            self.raw_start = Some(format!("{head}>"));
        }
    }

    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Result<Self, DomainError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| malformed(e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attribute.value);
            let value = unescape(&raw)
                .map(Cow::into_owned)
                .unwrap_or_else(|_| raw.to_string());
            attributes.push((key, value));
        }

        let body = String::from_utf8_lossy(&**start);
        let raw_start = if self_closing {
            format!("<{body}/>")
        } else {
            format!("<{body}>")
        };

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            raw_start: Some(raw_start),
            raw_end: None,
            self_closing,
        })
    }

    fn write(&self, out: &mut String) {
        match &self.raw_start {
            Some(raw) => out.push_str(raw),
            None => self.write_start(out),
        }
        if self.self_closing && self.children.is_empty() {
            return;
        }
        for child in &self.children {
            child.write(out);
        }
        match &self.raw_end {
            Some(raw) => out.push_str(raw),
            None => {
                out.push_str("</");
                out.push_str(&self.name);
                out.push('>');
            }
        }
    }

    fn write_start(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&partial_escape(value).replace('"', "&quot;"));
            out.push('"');
        }
        if self.self_closing && self.children.is_empty() {
            out.push_str(" />");
        } else {
            out.push('>');
        }
    }
}

fn indentation(layout: Layout) -> XmlNode {
    XmlNode::Text(format!("{}{}", layout.newline, layout.indent()))
}

/// A parsed XML document: optional BOM, prolog, one root element, epilog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    bom: bool,
    newline: &'static str,
    prolog: Vec<XmlNode>,
    root: Element,
    epilog: Vec<XmlNode>,
}

impl XmlDocument {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let (bom, body) = match text.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let newline = if body.contains("\r\n") { "\r\n" } else { "\n" };

        let mut reader = Reader::from_str(body);
        let mut tree = TreeBuilder::default();

        loop {
            match reader.read_event().map_err(|e| malformed(e.to_string()))? {
                Event::Start(start) => tree.open(Element::from_start(&start, false)?),
                Event::Empty(start) => {
                    tree.attach(XmlNode::Element(Element::from_start(&start, true)?))?
                }
                Event::End(end) => tree.close(format!("</{}>", lossy(&end)))?,
                Event::Text(text) => tree.attach(XmlNode::Text(lossy(&text)))?,
                Event::CData(data) => tree.attach(XmlNode::CData(lossy(&data)))?,
                Event::Comment(comment) => {
                    tree.attach(XmlNode::Markup(format!("<!--{}-->", lossy(&comment))))?
                }
                Event::Decl(decl) => tree.attach(XmlNode::Markup(format!("<?{}?>", lossy(&decl))))?,
                Event::PI(pi) => tree.attach(XmlNode::Markup(format!("<?{}?>", lossy(&pi))))?,
                Event::DocType(doctype) => tree.attach(XmlNode::Markup(format!(
                    "<!DOCTYPE {}>",
                    lossy(&doctype).trim_start()
                )))?,
                Event::Eof => break,
            }
        }

        tree.finish(bom, newline)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn newline(&self) -> &'static str {
        self.newline
    }

    /// Layout of the root element.
    pub fn layout(&self) -> Layout {
        Layout {
            depth: 0,
            newline: self.newline,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.bom {
            out.push(BOM);
        }
        for node in &self.prolog {
            node.write(&mut out);
        }
        self.root.write(&mut out);
        for node in &self.epilog {
            node.write(&mut out);
        }
        out
    }
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    prolog: Vec<XmlNode>,
    root: Option<Element>,
    epilog: Vec<XmlNode>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) {
        self.stack.push(element);
    }

    fn close(&mut self, raw_end: String) -> Result<(), DomainError> {
        let mut element = self
            .stack
            .pop()
            .ok_or_else(|| malformed(format!("unexpected closing tag {raw_end}")))?;
        element.raw_end = Some(raw_end);
        self.attach(XmlNode::Element(element))
    }

    fn attach(&mut self, node: XmlNode) -> Result<(), DomainError> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
            return Ok(());
        }
        match node {
            XmlNode::Element(element) => {
                if self.root.is_some() {
                    return Err(malformed(format!(
                        "second root element <{}>",
                        element.name
                    )));
                }
                self.root = Some(element);
            }
            other if self.root.is_none() => self.prolog.push(other),
            other => self.epilog.push(other),
        }
        Ok(())
    }

    fn finish(self, bom: bool, newline: &'static str) -> Result<XmlDocument, DomainError> {
        if let Some(open) = self.stack.last() {
            return Err(malformed(format!("unclosed element <{}>", open.name)));
        }
        let root = self
            .root
            .ok_or_else(|| malformed("document has no root element".into()))?;
        Ok(XmlDocument {
            bom,
            newline,
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn malformed(reason: String) -> DomainError {
    DomainError::MalformedProjectFile { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n",
        "<Project ToolsVersion=\"4.0\"  xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\r\n",
        "  <!-- keep me -->\r\n",
        "  <PropertyGroup Condition=\" '$(Configuration)' == 'Debug' \">\r\n",
        "    <AssemblyName>Foo &amp; Bar</AssemblyName>\r\n",
        "  </PropertyGroup>\r\n",
        "  <ItemGroup>\r\n",
        "    <Reference Include=\"System\" />\r\n",
        "  </ItemGroup>\r\n",
        "</Project>"
    );

    #[test]
    fn unedited_document_renders_byte_for_byte() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.render(), SAMPLE);
        assert_eq!(doc.newline(), "\r\n");
    }

    #[test]
    fn text_and_attributes_are_unescaped() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let group = doc.root().child("PropertyGroup").unwrap();
        assert_eq!(group.child_text("AssemblyName").unwrap(), "Foo & Bar");
        assert_eq!(
            group.attribute("Condition"),
            Some(" '$(Configuration)' == 'Debug' ")
        );
    }

    #[test]
    fn appended_children_follow_document_indentation() {
        let mut doc = XmlDocument::parse(SAMPLE).unwrap();
        let layout = doc.layout().child();
        let group = doc.root_mut().child_mut("ItemGroup").unwrap();
        group.append_element(
            Element::new("Compile").with_attribute("Include", "Foo.cs"),
            layout,
        );

        let rendered = doc.render();
        assert!(rendered.contains(
            "    <Reference Include=\"System\" />\r\n    <Compile Include=\"Foo.cs\" />\r\n  </ItemGroup>"
        ));
    }

    #[test]
    fn self_closing_element_opens_up_when_given_children() {
        let mut doc = XmlDocument::parse(SAMPLE).unwrap();
        let layout = doc.layout().child().child();
        let reference = doc
            .root_mut()
            .child_mut("ItemGroup")
            .unwrap()
            .child_mut("Reference")
            .unwrap();
        reference.set_child_text("HintPath", "..\\lib\\System.dll", layout);

        assert!(doc.render().contains(
            "<Reference Include=\"System\">\r\n      <HintPath>..\\lib\\System.dll</HintPath>\r\n    </Reference>"
        ));
    }

    #[test]
    fn removing_elements_takes_their_indentation_along() {
        let mut doc = XmlDocument::parse(SAMPLE).unwrap();
        let removed = doc
            .root_mut()
            .child_mut("ItemGroup")
            .unwrap()
            .remove_elements(|e| e.attribute("Include") == Some("System"));

        assert_eq!(removed, 1);
        assert!(doc.render().contains("<ItemGroup>\r\n  </ItemGroup>"));
    }

    #[test]
    fn set_text_with_same_value_keeps_source_text() {
        let mut doc = XmlDocument::parse(SAMPLE).unwrap();
        doc.root_mut()
            .child_mut("PropertyGroup")
            .unwrap()
            .child_mut("AssemblyName")
            .unwrap()
            .set_text("Foo & Bar");
        assert_eq!(doc.render(), SAMPLE);
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        let err = XmlDocument::parse("<Project><ItemGroup></Project>").unwrap_err();
        assert!(matches!(err, DomainError::MalformedProjectFile { .. }));
    }
}
