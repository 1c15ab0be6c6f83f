//! HTML rendering for page specifications.
//!
//! Converts a parsed page tree into a document for one locale, resolving
//! per-locale values with fallback, parsing authored values as inline HTML
//! fragments, and serializing the result without inserted whitespace.

pub mod dom;
pub mod fragment;
pub mod render;
pub mod serialize;
pub mod vocabulary;

pub use dom::{Doctype, Document, Element, Node};
pub use fragment::{decode_entities, parse_fragment, FragmentError};
pub use render::{render_node, render_page, LangPlacement, RenderError, RenderOptions};
pub use serialize::{element_to_html, to_html, write_document};
pub use vocabulary::{is_element, is_void, text_mode, TextMode};
