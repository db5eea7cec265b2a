//! @acp:module "XML Reader/Writer"
//! @acp:summary "quick-xml backed parsing into and serialization from the element tree"
//! @acp:domain xml
//! @acp:layer service

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::element::Element;
use crate::error::{AcbfError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse an XML document into its root element.
///
/// Comments, processing instructions and the doctype are dropped.
pub fn parse(bytes: &[u8]) -> Result<Element> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(AcbfError::MalformedXml("content after root element".into()));
                }
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| AcbfError::MalformedXml("unexpected end tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                append_text(&mut stack, &text);
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                append_text(&mut stack, &text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(AcbfError::MalformedXml("unclosed element at end of document".into()));
    }
    root.ok_or_else(|| AcbfError::MalformedXml("no root element".into()))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(AcbfError::MalformedXml("multiple root elements".into())),
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) {
    // Character data outside the root element is ignored
    let Some(current) = stack.last_mut() else {
        return;
    };
    let slot = match current.children.last_mut() {
        Some(last) => &mut last.tail,
        None => &mut current.text,
    };
    slot.get_or_insert_with(String::new).push_str(text);
}

/// Serialize an element tree as a UTF-8 document with an XML declaration
pub fn to_bytes(root: &Element) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.get_mut().write_all(b"\n")?;
    write_element(&mut writer, root)?;
    Ok(writer.into_inner())
}

/// Serialize an element tree to a string
pub fn to_string(root: &Element) -> Result<String> {
    let bytes = to_bytes(root)?;
    String::from_utf8(bytes).map_err(|e| AcbfError::MalformedXml(e.to_string()))
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = element.text.as_deref().unwrap_or("");
    if element.children.is_empty() && text.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
        if let Some(tail) = child.tail.as_deref().filter(|t| !t.is_empty()) {
            writer.write_event(Event::Text(BytesText::new(tail)))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
