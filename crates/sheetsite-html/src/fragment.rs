//! Parser for the small HTML fragments authors put in cells.
//!
//! Handles text, comments, start and end tags with quoted, unquoted or
//! valueless attributes, void and self-closed elements, and character
//! references. End tags that HTML lets authors leave out (`li`, `p`, table
//! cells and the like) are implied; any other broken structure is an error
//! rather than being repaired.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Element, Node};
use crate::vocabulary::{has_optional_end_tag, is_void, start_tag_closes, text_mode, TextMode};

/// Errors that can occur when parsing a fragment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FragmentError {
    #[error("malformed tag at offset {offset}")]
    MalformedTag { offset: usize },

    #[error("unterminated comment at offset {offset}")]
    UnterminatedComment { offset: usize },

    #[error("end tag </{tag}> has no matching start tag")]
    UnexpectedEndTag { tag: String },

    #[error("expected </{expected}> but found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    #[error("void element <{tag}> cannot have an end tag")]
    VoidEndTag { tag: String },

    #[error("element <{tag}> is never closed")]
    Unclosed { tag: String },
}

/// Parse `source` as the content of a `context` element.
pub fn parse_fragment(source: &str, context: &str) -> Result<Vec<Node>, FragmentError> {
    match text_mode(context) {
        TextMode::Raw => Ok(text_node(source.to_string())),
        TextMode::EscapableRaw => Ok(text_node(decode_entities(source))),
        TextMode::Normal => FragmentParser::new(source).parse(),
    }
}

fn text_node(text: String) -> Vec<Node> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Node::Text(text)]
    }
}

struct FragmentParser<'a> {
    source: &'a str,
    pos: usize,
    open: Vec<Element>,
    top: Vec<Node>,
}

impl<'a> FragmentParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            open: Vec::new(),
            top: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Vec<Node>, FragmentError> {
        while self.pos < self.source.len() {
            let rest = &self.source[self.pos..];

            let Some(lt) = rest.find('<') else {
                self.push_text(rest);
                break;
            };

            if lt > 0 {
                self.push_text(&rest[..lt]);
                self.pos += lt;
                continue;
            }

            if rest.starts_with("<!--") {
                self.comment()?;
            } else if rest.starts_with("</") {
                self.end_tag()?;
            } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic() || c == '!') {
                self.start_tag()?;
            } else {
                // a lone '<' is text
                self.push_text("<");
                self.pos += 1;
            }
        }

        while self
            .open
            .last()
            .is_some_and(|top| has_optional_end_tag(&top.name))
        {
            self.close_top();
        }

        if let Some(unclosed) = self.open.last() {
            return Err(FragmentError::Unclosed {
                tag: unclosed.name.clone(),
            });
        }

        Ok(self.top)
    }

    /// Pop the innermost open element into its parent.
    fn close_top(&mut self) {
        if let Some(done) = self.open.pop() {
            self.append(Node::Element(done));
        }
    }

    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.top.push(node),
        }
    }

    fn push_text(&mut self, raw: &str) {
        let text = decode_entities(raw);

        // merge with a preceding text node so "a < b" stays one node
        let siblings = match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.top,
        };
        if let Some(Node::Text(prev)) = siblings.last_mut() {
            prev.push_str(&text);
        } else if !text.is_empty() {
            siblings.push(Node::Text(text));
        }
    }

    fn comment(&mut self) -> Result<(), FragmentError> {
        let body_start = self.pos + "<!--".len();
        let Some(len) = self.source[body_start..].find("-->") else {
            return Err(FragmentError::UnterminatedComment { offset: self.pos });
        };

        let body = self.source[body_start..body_start + len].to_string();
        self.append(Node::Comment(body));
        self.pos = body_start + len + "-->".len();
        Ok(())
    }

    fn end_tag(&mut self) -> Result<(), FragmentError> {
        static END_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^</([A-Za-z][A-Za-z0-9-]*)\s*>").expect("Invalid end tag regex")
        });

        let caps = END_RE
            .captures(&self.source[self.pos..])
            .ok_or(FragmentError::MalformedTag { offset: self.pos })?;
        let tag = caps[1].to_ascii_lowercase();
        let len = caps[0].len();

        if is_void(&tag) {
            return Err(FragmentError::VoidEndTag { tag });
        }

        if self.open.iter().any(|e| e.name == tag) {
            while self
                .open
                .last()
                .is_some_and(|top| top.name != tag && has_optional_end_tag(&top.name))
            {
                self.close_top();
            }
        }

        match self.open.last() {
            None => return Err(FragmentError::UnexpectedEndTag { tag }),
            Some(current) if current.name != tag => {
                return Err(FragmentError::MismatchedEndTag {
                    expected: current.name.clone(),
                    found: tag,
                });
            }
            Some(_) => {}
        }

        self.close_top();
        self.pos += len;
        Ok(())
    }

    fn start_tag(&mut self) -> Result<(), FragmentError> {
        static START_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                r#"^<([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
            )
            .expect("Invalid start tag regex")
        });

        let caps = START_RE
            .captures(&self.source[self.pos..])
            .ok_or(FragmentError::MalformedTag { offset: self.pos })?;

        let mut element = Element::new(caps[1].to_ascii_lowercase());
        element.attrs = parse_attrs(caps.get(2).map(|m| m.as_str()).unwrap_or(""));
        let self_closing = !caps[3].is_empty();
        let tag_end = self.pos + caps[0].len();

        while self
            .open
            .last()
            .is_some_and(|top| start_tag_closes(&top.name, &element.name))
        {
            self.close_top();
        }

        if self_closing || is_void(&element.name) {
            self.append(Node::Element(element));
            self.pos = tag_end;
            return Ok(());
        }

        match text_mode(&element.name) {
            TextMode::Normal => {
                self.open.push(element);
                self.pos = tag_end;
            }
            mode => {
                let close = format!("</{}", element.name);
                let Some(len) = find_ignore_case(&self.source[tag_end..], &close) else {
                    return Err(FragmentError::Unclosed { tag: element.name });
                };
                let raw = &self.source[tag_end..tag_end + len];
                let text = if mode == TextMode::Raw {
                    raw.to_string()
                } else {
                    decode_entities(raw)
                };
                element.children = text_node(text);
                self.open.push(element);
                self.pos = tag_end + len;
            }
        }

        Ok(())
    }
}

/// Parse the attribute list of a start tag, keeping source order.
fn parse_attrs(attrs: &str) -> Vec<(String, String)> {
    static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("Invalid attribute regex")
    });

    ATTR_RE
        .captures_iter(attrs)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

/// Decode character references, covering the full HTML5 named set.
/// Unknown references are kept as written.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
