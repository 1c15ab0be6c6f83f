//! Deterministic, whitespace-free HTML serialization.

use std::io::{self, Write};

use crate::dom::{Doctype, Document, Element, Node};
use crate::vocabulary::{is_void, text_mode, TextMode};

/// Write `doc` to `out`. Write errors are returned unchanged.
pub fn write_document<W: Write>(doc: &Document, out: &mut W) -> io::Result<()> {
    write_doctype(&doc.doctype, out)?;
    write_element(&doc.root, out)
}

/// Serialize a document to a string.
pub fn to_html(doc: &Document) -> String {
    render_to_string(|buf| write_document(doc, buf))
}

/// Serialize a single element (and its subtree) to a string.
pub fn element_to_html(element: &Element) -> String {
    render_to_string(|buf| write_element(element, buf))
}

fn render_to_string(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_doctype<W: Write>(doctype: &Doctype, out: &mut W) -> io::Result<()> {
    write!(out, "<!DOCTYPE {}", doctype.name)?;
    write_attrs(&doctype.attrs, out)?;
    out.write_all(b">")
}

fn write_element<W: Write>(element: &Element, out: &mut W) -> io::Result<()> {
    write!(out, "<{}", element.name)?;
    write_attrs(&element.attrs, out)?;

    // void elements are rejected with content at render time
    if is_void(&element.name) {
        return out.write_all(b"/>");
    }
    out.write_all(b">")?;

    let raw = text_mode(&element.name) == TextMode::Raw;
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(e, out)?,
            Node::Text(t) if raw => out.write_all(t.as_bytes())?,
            Node::Text(t) => out.write_all(escape_text(t).as_bytes())?,
            Node::Comment(c) => write!(out, "<!--{c}-->")?,
        }
    }

    write!(out, "</{}>", element.name)
}

fn write_attrs<W: Write>(attrs: &[(String, String)], out: &mut W) -> io::Result<()> {
    for (name, value) in attrs {
        write!(out, " {}=\"{}\"", name, escape_attr(value))?;
    }
    Ok(())
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}
