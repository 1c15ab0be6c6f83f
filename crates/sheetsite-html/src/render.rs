//! Turns a page's spec tree into an HTML document for one locale.

use sheetsite_spec::{PageSpec, SpecNode};

use crate::dom::{Doctype, Document, Element, Node};
use crate::fragment::{parse_fragment, FragmentError};
use crate::vocabulary::{is_element, is_void};

/// Where the `lang` attribute for the rendered locale is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LangPlacement {
    /// On the doctype: `<!DOCTYPE html lang="en"><html>`
    #[default]
    Doctype,
    /// On the root element: `<!DOCTYPE html><html lang="en">`
    Root,
}

/// Options for rendering a page.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub lang: LangPlacement,
}

/// Errors that can occur when rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("row {row}: unknown HTML element type {key:?}")]
    UnknownElement { row: usize, key: String },

    #[error("row {row}, locale {locale}: node body {value:?} is invalid HTML: {source}")]
    Fragment {
        row: usize,
        locale: String,
        value: String,
        #[source]
        source: FragmentError,
    },

    #[error("row {row}: void element {key:?} cannot have content or child elements")]
    VoidContent { row: usize, key: String },

    #[error("page {page:?} has no locale {locale:?}")]
    UnknownLocale { page: String, locale: String },
}

/// Render a page for `locale` into a full document.
pub fn render_page(
    page: &PageSpec,
    locale: &str,
    options: RenderOptions,
) -> Result<Document, RenderError> {
    if !page.has_locale(locale) {
        return Err(RenderError::UnknownLocale {
            page: page.name().to_string(),
            locale: locale.to_string(),
        });
    }

    let mut root = render_node(page.root(), locale, page.locales())?;
    let mut doctype = Doctype::html();

    match options.lang {
        LangPlacement::Doctype => doctype.attrs.push(("lang".to_string(), locale.to_string())),
        LangPlacement::Root => {
            if root.attr("lang").is_none() {
                root.attrs.insert(0, ("lang".to_string(), locale.to_string()));
            }
        }
    }

    tracing::debug!(page = page.name(), locale, "rendered page");

    Ok(Document { doctype, root })
}

/// Render one node and its subtree for `locale`.
///
/// Attribute children become attributes of the element, in row order; other
/// children become nested elements. The node's own value is parsed as an
/// HTML fragment and placed before the child elements.
pub fn render_node(
    node: &SpecNode,
    locale: &str,
    locale_order: &[String],
) -> Result<Element, RenderError> {
    if !is_element(&node.key) {
        return Err(RenderError::UnknownElement {
            row: node.source_row,
            key: node.key.clone(),
        });
    }

    let body = node.best_value(locale, locale_order);
    if is_void(&node.key) && (!body.is_empty() || node.elements().next().is_some()) {
        return Err(RenderError::VoidContent {
            row: node.source_row,
            key: node.key.clone(),
        });
    }

    let mut element = Element::new(node.key.as_str());

    if !body.is_empty() {
        element.children = parse_fragment(body, &node.key).map_err(|source| {
            RenderError::Fragment {
                row: node.source_row,
                locale: locale.to_string(),
                value: body.to_string(),
                source,
            }
        })?;
    }

    for attr in node.attributes() {
        element.push_attr(attr.key.as_str(), attr.best_value(locale, locale_order));
    }

    for child in node.elements() {
        let rendered = render_node(child, locale, locale_order)?;
        element.children.push(Node::Element(rendered));
    }

    Ok(element)
}
