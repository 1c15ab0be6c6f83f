//! Spec tree nodes and locale fallback resolution.

use std::collections::BTreeMap;

use serde::Serialize;

/// One structural row of a sheet, or the synthetic document root.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SpecNode {
    /// Element or attribute name
    pub key: String,

    /// Whether this node is an attribute of its parent rather than a child element
    pub is_attribute: bool,

    /// Whether the key starts with an uppercase letter (reserved for macros)
    pub is_macro: bool,

    /// Authored values; locales without a value are absent
    pub value_by_locale: BTreeMap<String, String>,

    /// 1-based sheet row this node came from (0 for the root)
    pub source_row: usize,

    /// Nesting level: key column + 1, root is 0
    pub depth: usize,

    /// Child nodes in row order
    pub children: Vec<SpecNode>,
}

impl SpecNode {
    /// The synthetic root every page tree hangs from.
    pub fn root() -> Self {
        Self {
            key: ROOT_KEY.to_string(),
            ..Default::default()
        }
    }

    /// Best value for `preferred`, falling back through `locale_order`.
    ///
    /// Returns `""` when no locale in `{preferred} ∪ locale_order` has a value.
    pub fn best_value<'a>(&'a self, preferred: &str, locale_order: &[String]) -> &'a str {
        if let Some(value) = self.value_by_locale.get(preferred) {
            return value;
        }

        locale_order
            .iter()
            .find_map(|locale| self.value_by_locale.get(locale))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Attribute children, in row order.
    pub fn attributes(&self) -> impl Iterator<Item = &SpecNode> {
        self.children.iter().filter(|c| c.is_attribute)
    }

    /// Element children, in row order.
    pub fn elements(&self) -> impl Iterator<Item = &SpecNode> {
        self.children.iter().filter(|c| !c.is_attribute)
    }

    /// Depth-first walk over this node and all descendants.
    pub fn walk(&self) -> Vec<&SpecNode> {
        let mut out = Vec::new();
        let mut pending = vec![self];

        while let Some(node) = pending.pop() {
            out.push(node);
            pending.extend(node.children.iter().rev());
        }

        out
    }
}

/// Key of the synthetic root element.
pub const ROOT_KEY: &str = "html";

/// Whether a key names a macro (first character uppercase).
pub fn is_macro_key(key: &str) -> bool {
    key.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(locales: &[&str]) -> Vec<String> {
        locales.iter().map(|l| l.to_string()).collect()
    }

    fn node_with(values: &[(&str, &str)]) -> SpecNode {
        SpecNode {
            key: "title".to_string(),
            value_by_locale: values
                .iter()
                .map(|(l, v)| (l.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn prefers_requested_locale() {
        let node = node_with(&[("en", "Welcome"), ("de", "Willkommen")]);

        assert_eq!(node.best_value("de", &order(&["en", "de"])), "Willkommen");
        assert_eq!(node.best_value("en", &order(&["en", "de"])), "Welcome");
    }

    #[test]
    fn falls_back_through_whole_locale_order() {
        let node = node_with(&[("en", "stylesheet")]);

        assert_eq!(node.best_value("de", &order(&["de", "en"])), "stylesheet");
    }

    #[test]
    fn fallback_follows_column_order() {
        let node = node_with(&[("fr", "Bonjour"), ("en", "Hello")]);

        assert_eq!(node.best_value("de", &order(&["de", "fr", "en"])), "Bonjour");
        assert_eq!(node.best_value("de", &order(&["de", "en", "fr"])), "Hello");
    }

    #[test]
    fn returns_empty_when_nothing_intersects() {
        let node = node_with(&[("it", "Ciao")]);

        assert_eq!(node.best_value("de", &order(&["de", "en"])), "");
        assert_eq!(node_with(&[]).best_value("en", &order(&["en"])), "");
    }

    #[test]
    fn preferred_locale_need_not_be_in_order() {
        let node = node_with(&[("it", "Ciao")]);

        assert_eq!(node.best_value("it", &order(&["en"])), "Ciao");
    }

    #[test]
    fn detects_macro_keys() {
        assert!(is_macro_key("Header"));
        assert!(is_macro_key("Äbout"));
        assert!(!is_macro_key("header"));
        assert!(!is_macro_key(""));
        assert!(!is_macro_key("1col"));
    }

    #[test]
    fn walks_depth_first_in_row_order() {
        let mut root = SpecNode::root();
        let mut head = node_with(&[]);
        head.key = "head".to_string();
        head.children.push(node_with(&[]));
        let mut body = node_with(&[]);
        body.key = "body".to_string();
        root.children = vec![head, body];

        let keys: Vec<&str> = root.walk().iter().map(|n| n.key.as_str()).collect();

        assert_eq!(keys, vec!["html", "head", "title", "body"]);
    }
}
