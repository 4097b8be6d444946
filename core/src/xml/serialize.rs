// ## 📂 File: `src/xml/serialize.rs`

//! xml/serialize.rs
//! Tree <-> bytes.
//!
//! Output format:
//! - `<?xml version="1.0" encoding="UTF-8"?>` declaration
//! - two-space indentation, one element per line
//! - leaves on one line, including empty ones (`<Age></Age>`)
//! - trailing newline
//! - carriage returns in text written as `&#xD;` so conforming parsers keep them
//!
//! Serialization is byte-reproducible: identical trees give identical bytes.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::constants::XML_INDENT_WIDTH;
use crate::types::ConvertError;
use crate::xml::tree::Element;

#[inline]
fn xml_err(e: impl std::fmt::Display) -> ConvertError {
    ConvertError::Xml(e.to_string())
}

/// Escape markup characters, plus CR which XML end-of-line handling would
/// otherwise fold into LF.
fn escape_text(text: &str) -> Cow<'_, str> {
    let escaped = escape(text);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#xD;"))
    } else {
        escaped
    }
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, el: &Element) -> Result<(), ConvertError> {
    let mut start = BytesStart::new(el.name.as_str());
    for (k, v) in &el.attributes {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    writer.write_event(Event::Start(start)).map_err(xml_err)?;

    if el.is_leaf() {
        // Always emit the text event so the closing tag stays on the same line.
        writer.write_event(Event::Text(BytesText::from_escaped(escape_text(&el.text)))).map_err(xml_err)?;
    } else {
        for child in &el.children {
            write_element(writer, child)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(el.name.as_str()))).map_err(xml_err)?;
    Ok(())
}

/// Pretty-print a tree as UTF-8 bytes.
pub fn to_pretty_xml(root: &Element) -> Result<Vec<u8>, ConvertError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', XML_INDENT_WIDTH);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    write_element(&mut writer, root)?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

/// Pretty-print as `String`.
pub fn to_pretty_string(root: &Element) -> Result<String, ConvertError> {
    String::from_utf8(to_pretty_xml(root)?).map_err(xml_err)
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, ConvertError> {
    let name = String::from_utf8(start.name().as_ref().to_vec()).map_err(xml_err)?;
    let mut el = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(xml_err)?;
        let key = String::from_utf8(attr.key.as_ref().to_vec()).map_err(xml_err)?;
        let value = attr.unescape_value().map_err(xml_err)?.into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

/// Close `el`: drop inter-element whitespace, then attach to parent or finish.
fn close_element(stack: &mut Vec<Element>, mut el: Element) -> Option<Element> {
    if !el.children.is_empty() && el.text.trim().is_empty() {
        el.text.clear();
    }
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(el);
            None
        }
        None => Some(el),
    }
}

/// Parse a document back into a tree. Comments, processing instructions and
/// the declaration are skipped.
pub fn parse_xml(bytes: &[u8]) -> Result<Element, ConvertError> {
    let mut reader = Reader::from_reader(bytes);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(open_element(&e)?),
            Event::Empty(e) => {
                let el = open_element(&e)?;
                if let Some(done) = close_element(&mut stack, el) {
                    root = Some(done);
                }
            }
            Event::End(_) => {
                let el = stack.pop().ok_or_else(|| ConvertError::Xml("unbalanced end tag".into()))?;
                if let Some(done) = close_element(&mut stack, el) {
                    root = Some(done);
                }
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape().map_err(xml_err)?);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(std::str::from_utf8(&c).map_err(xml_err)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ConvertError::Xml(format!("unclosed element '{}'", stack[stack.len() - 1].name)));
    }
    root.ok_or_else(|| ConvertError::Xml("document has no root element".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        let mut row = Element::new("Row");
        row.push(Element::leaf("Name", "Jo & Al"));
        row.push(Element::leaf("Age", ""));
        let mut root = Element::new("Root").with_attribute("schemaVersion", "1.0");
        root.push(row);
        root
    }

    #[test]
    fn layout_is_two_space_indented_with_inline_leaves() {
        let text = to_pretty_string(&sample()).unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <Root schemaVersion=\"1.0\">\n  <Row>\n    <Name>Jo &amp; Al</Name>\n    <Age></Age>\n  </Row>\n</Root>\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn parse_inverts_serialize() {
        let tree = sample();
        let back = parse_xml(&to_pretty_xml(&tree).unwrap()).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn carriage_returns_are_written_as_char_refs() {
        let mut root = Element::new("Root");
        root.push(Element::leaf("Note", "line one\r\nline two\rend"));
        let text = to_pretty_string(&root).unwrap();
        assert!(text.contains("<Note>line one&#xD;\nline two&#xD;end</Note>"));
        assert!(!text.contains('\r'));

        let back = parse_xml(text.as_bytes()).unwrap();
        assert_eq!(back.children[0].text, "line one\r\nline two\rend");
    }

    #[test]
    fn self_closing_and_unbalanced_input() {
        let el = parse_xml(b"<a><b/></a>").unwrap();
        assert_eq!(el.children[0].name, "b");
        assert!(parse_xml(b"<a><b></a>").is_err());
        assert!(parse_xml(b"").is_err());
    }
}
