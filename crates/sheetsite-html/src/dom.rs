//! Minimal HTML document model produced by the renderer.

/// A complete HTML document: a doctype followed by one root element.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Doctype declaration
    pub doctype: Doctype,

    /// Single top-level element
    pub root: Element,
}

/// A `<!DOCTYPE ...>` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Doctype {
    /// Document type name, `html` for HTML documents
    pub name: String,

    /// Extra attributes written after the name, in order
    pub attrs: Vec<(String, String)>,
}

impl Doctype {
    /// Plain `<!DOCTYPE html>`.
    pub fn html() -> Self {
        Self {
            name: "html".to_string(),
            attrs: Vec::new(),
        }
    }
}

/// An element with attributes in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append an attribute, keeping any earlier one with the same name.
    pub fn push_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.push((name.into(), value.into()));
    }

    /// Value of the first attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(&e.children, out),
            Node::Comment(_) => {}
        }
    }
}

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_attribute_order() {
        let mut link = Element::new("link");
        link.push_attr("rel", "stylesheet");
        link.push_attr("href", "/style.css");

        assert_eq!(link.attrs[0].0, "rel");
        assert_eq!(link.attrs[1].0, "href");
        assert_eq!(link.attr("href"), Some("/style.css"));
        assert_eq!(link.attr("type"), None);
    }

    #[test]
    fn collects_nested_text() {
        let mut anchor = Element::new("a");
        anchor.push(Node::Text("Imprint".to_string()));
        let mut footer = Element::new("footer");
        footer.push(Node::Text("See ".to_string()));
        footer.push(anchor);
        footer.push(Node::Comment("hidden".to_string()));

        assert_eq!(footer.text(), "See Imprint");
    }
}
