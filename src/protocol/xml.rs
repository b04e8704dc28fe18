//! Namespace-aware element tree built from quick-xml events.
//!
//! Responses are small enough to hold in memory and are walked several
//! times (schema first, then rows), so they are parsed once into an owned
//! tree instead of being streamed.

use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use simdutf8::basic::from_utf8;

use crate::error::{Error, Result, eyre};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Name as written in the document, e.g. `xsi:type`
    pub qname: String,
    pub namespace: Option<String>,
    pub local_name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    qname: String,
    namespace: Option<String>,
    local_name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    pub fn qname(&self) -> &str {
        &self.qname
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Exact match on namespace URI and local name
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute by its name as written (`prefix:local`)
    pub fn attribute(&self, qname: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.qname == qname)
            .map(|a| a.value.as_str())
    }

    /// Attribute by resolved namespace and local name
    pub fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name == local_name && a.namespace.as_deref() == Some(namespace))
            .map(|a| a.value.as_str())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn into_child_elements(self) -> impl Iterator<Item = Element> {
        self.children.into_iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn find_child(&self, namespace: &str, local_name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.is(namespace, local_name))
    }

    pub fn find_children<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Element> {
        self.child_elements()
            .filter(move |e| e.is(namespace, local_name))
    }

    /// Consumes the element and returns its first matching child
    pub fn into_child(self, namespace: &str, local_name: &str) -> Option<Element> {
        self.into_child_elements()
            .find(|e| e.is(namespace, local_name))
    }

    /// First matching element below this one, in document order
    pub fn find_descendant(&self, namespace: &str, local_name: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.is(namespace, local_name) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(namespace, local_name) {
                return Some(found);
            }
        }
        None
    }

    /// All matching elements below this one, in document order
    pub fn find_descendants(&self, namespace: &str, local_name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_descendants(namespace, local_name, &mut out);
        out
    }

    fn collect_descendants<'a>(
        &'a self,
        namespace: &str,
        local_name: &str,
        out: &mut Vec<&'a Element>,
    ) {
        for child in self.child_elements() {
            if child.is(namespace, local_name) {
                out.push(child);
            }
            child.collect_descendants(namespace, local_name, out);
        }
    }

    /// Concatenated text of this element and all of its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Text of the first matching child, `None` if there is no such child
    pub fn child_text(&self, namespace: &str, local_name: &str) -> Option<String> {
        self.find_child(namespace, local_name).map(Element::text)
    }

    /// Serializes the subtree with two-space indentation.
    ///
    /// Whitespace-only text nodes are dropped so that the indentation of the
    /// source document does not leak into the output.
    pub fn pretty_print(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::LibraryBug(eyre!("pretty printer produced invalid UTF-8: {e}")))
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.qname.as_str());
        for attr in &self.attributes {
            start.push_attribute((attr.qname.as_str(), attr.value.as_str()));
        }

        let significant = self.children.iter().any(|node| match node {
            Node::Element(_) => true,
            Node::Text(t) => !t.trim().is_empty(),
        });
        if !significant {
            writer.write_event(Event::Empty(start)).map_err(write_error)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        for node in &self.children {
            match node {
                Node::Element(e) => e.write_to(writer)?,
                Node::Text(t) => {
                    let t = t.trim();
                    if !t.is_empty() {
                        // quotes stay literal in text content
                        writer
                            .write_event(Event::Text(BytesText::from_escaped(partial_escape(t))))
                            .map_err(write_error)?;
                    }
                }
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.qname.as_str())))
            .map_err(write_error)?;
        Ok(())
    }
}

fn write_error(e: impl std::fmt::Display) -> Error {
    Error::LibraryBug(eyre!("failed to write XML: {e}"))
}

/// Parses a complete document and returns its root element.
#[tracing::instrument(skip_all)]
pub fn parse(bytes: &[u8]) -> Result<Element> {
    let mut reader = NsReader::from_reader(bytes);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event().map_err(Error::malformed)?;
        let namespace = owned_namespace(resolved)?;
        match event {
            Event::Start(start) => {
                let element = open_element(&reader, namespace, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, namespace, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::malformed("unbalanced end tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let raw = from_utf8(&text).map_err(Error::malformed)?;
                let unescaped = quick_xml::escape::unescape(raw).map_err(Error::malformed)?;
                push_text(&mut stack, &unescaped);
            }
            Event::CData(data) => {
                let raw = from_utf8(&data).map_err(Error::malformed)?;
                push_text(&mut stack, raw);
            }
            Event::GeneralRef(reference) => {
                let name = from_utf8(&reference).map_err(Error::malformed)?;
                push_text(&mut stack, &resolve_reference(name)?);
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::malformed("unexpected end of document"));
    }
    root.ok_or_else(|| Error::malformed("document has no root element"))
}

fn owned_namespace(resolved: ResolveResult<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(
            from_utf8(ns.as_ref()).map_err(Error::malformed)?.to_string(),
        )),
        // An undeclared prefix never matches any expected namespace
        ResolveResult::Unbound | ResolveResult::Unknown(_) => Ok(None),
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> Result<Element> {
    let qname = from_utf8(start.name().as_ref())
        .map_err(Error::malformed)?
        .to_string();
    let local_name = from_utf8(start.local_name().as_ref())
        .map_err(Error::malformed)?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(Error::malformed)?;
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let value = from_utf8(&attr.value).map_err(Error::malformed)?;
        attributes.push(Attribute {
            qname: from_utf8(attr.key.as_ref())
                .map_err(Error::malformed)?
                .to_string(),
            namespace: owned_namespace(resolved)?,
            local_name: from_utf8(local.as_ref())
                .map_err(Error::malformed)?
                .to_string(),
            value: quick_xml::escape::unescape(value)
                .map_err(Error::malformed)?
                .into_owned(),
        });
    }

    Ok(Element {
        qname,
        namespace,
        local_name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(Error::malformed("multiple root elements"))
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    // text outside the root element is insignificant whitespace
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if let Some(Node::Text(existing)) = parent.children.last_mut() {
        existing.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_string()));
    }
}

fn resolve_reference(name: &str) -> Result<String> {
    if let Some(code) = name.strip_prefix('#') {
        let code_point = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        }
        .map_err(Error::malformed)?;
        return char::from_u32(code_point)
            .map(String::from)
            .ok_or_else(|| Error::malformed(format!("invalid character reference &{name};")));
    }
    let resolved = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => return Err(Error::malformed(format!("unknown entity &{name};"))),
    };
    Ok(resolved.to_string())
}
