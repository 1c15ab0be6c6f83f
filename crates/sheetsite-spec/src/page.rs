//! Page specifications parsed from sheets.
//!
//! A sheet describes one page. Row 1 is the header: the cell reading
//! `attribute` marks the attribute column and the cells after it, up to the
//! first blank, are locale codes. Row 2 starts with `path` and holds one
//! output path per locale. Every following row is a node whose nesting is
//! given by the column its key sits in.

use std::collections::BTreeMap;

use crate::node::{is_macro_key, SpecNode};
use crate::sheet::Sheet;

/// Header cell marking the attribute column.
pub const ATTRIBUTE_MARKER: &str = "attribute";

/// First cell of the path row.
pub const PATH_MARKER: &str = "path";

/// A parsed page: locales, output paths and the element tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    name: String,
    locales: Vec<String>,
    path_by_locale: BTreeMap<String, String>,
    root: SpecNode,
}

/// Errors in the layout of a sheet. Each one aborts parsing of that sheet.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StructureError {
    #[error("Sheet {sheet:?} is empty")]
    Empty { sheet: String },

    #[error("Sheet {sheet:?} has no \"attribute\" column in its header row")]
    MissingAttributeColumn { sheet: String },

    #[error("Sheet {sheet:?}: the \"attribute\" column cannot be the first column")]
    MisplacedAttributeColumn { sheet: String },

    #[error("No locales in sheet {sheet:?}")]
    NoLocales { sheet: String },

    #[error("Sheet {sheet:?} lists locale {locale:?} more than once")]
    DuplicateLocale { sheet: String, locale: String },

    #[error("Path row missing or incomplete for sheet {sheet:?}")]
    MissingPathRow { sheet: String },

    #[error("Sheet {sheet:?} has no output path for locale {locale:?}")]
    MissingPath { sheet: String, locale: String },

    #[error("Sheet {sheet:?}, row {row}: values without an element or attribute name")]
    OrphanValues { sheet: String, row: usize },
}

/// Column layout read from the header row.
#[derive(Debug, Clone, Copy)]
struct Layout {
    attribute_col: usize,
    first_locale_col: usize,
}

impl PageSpec {
    /// Parse a sheet into a page specification.
    pub fn parse(sheet: &Sheet) -> Result<Self, StructureError> {
        let name = sheet.name.clone();

        if sheet.is_empty() {
            return Err(StructureError::Empty { sheet: name });
        }

        let (layout, locales) = parse_header(sheet)?;
        let path_by_locale = parse_paths(sheet, layout, &locales)?;
        let root = parse_tree(sheet, layout, &locales)?;

        Ok(Self {
            name,
            locales,
            path_by_locale,
            root,
        })
    }

    /// Parse in-memory rows, e.g. from a test or another tabular source.
    pub fn parse_rows<R, C>(name: &str, rows: R) -> Result<Self, StructureError>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self::parse(&Sheet::new(name, rows))
    }

    /// Sheet name this page was parsed from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locales in header order; this is also the fallback order.
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Output path for a locale.
    pub fn path(&self, locale: &str) -> Option<&str> {
        self.path_by_locale.get(locale).map(String::as_str)
    }

    /// Root of the element tree.
    pub fn root(&self) -> &SpecNode {
        &self.root
    }

    /// Whether this page is rendered for `locale`.
    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }
}

fn parse_header(sheet: &Sheet) -> Result<(Layout, Vec<String>), StructureError> {
    let header = &sheet.rows[0];

    let attribute_col = header
        .iter()
        .position(|cell| cell == ATTRIBUTE_MARKER)
        .ok_or_else(|| StructureError::MissingAttributeColumn {
            sheet: sheet.name.clone(),
        })?;

    if attribute_col == 0 {
        return Err(StructureError::MisplacedAttributeColumn {
            sheet: sheet.name.clone(),
        });
    }

    let mut locales: Vec<String> = Vec::new();
    for cell in header[attribute_col + 1..].iter() {
        if cell.is_empty() {
            break;
        }
        if locales.contains(cell) {
            return Err(StructureError::DuplicateLocale {
                sheet: sheet.name.clone(),
                locale: cell.clone(),
            });
        }
        locales.push(cell.clone());
    }

    if locales.is_empty() {
        return Err(StructureError::NoLocales {
            sheet: sheet.name.clone(),
        });
    }

    let layout = Layout {
        attribute_col,
        first_locale_col: attribute_col + 1,
    };

    Ok((layout, locales))
}

fn parse_paths(
    sheet: &Sheet,
    layout: Layout,
    locales: &[String],
) -> Result<BTreeMap<String, String>, StructureError> {
    if sheet.rows.len() < 2 || sheet.cell(1, 0) != PATH_MARKER {
        return Err(StructureError::MissingPathRow {
            sheet: sheet.name.clone(),
        });
    }

    let mut paths = BTreeMap::new();
    for (i, locale) in locales.iter().enumerate() {
        let path = sheet.cell(1, layout.first_locale_col + i);
        if path.is_empty() {
            return Err(StructureError::MissingPath {
                sheet: sheet.name.clone(),
                locale: locale.clone(),
            });
        }
        paths.insert(locale.clone(), path.to_string());
    }

    Ok(paths)
}

/// Rebuild the element tree from the depth of each row.
///
/// A stack holds the open ancestors. Each node pops everything at its own
/// depth or deeper, becomes a child of what remains on top, and is pushed.
fn parse_tree(
    sheet: &Sheet,
    layout: Layout,
    locales: &[String],
) -> Result<SpecNode, StructureError> {
    let mut stack: Vec<SpecNode> = vec![SpecNode::root()];

    for row in 2..sheet.rows.len() {
        let Some(node) = parse_row(sheet, layout, locales, row)? else {
            continue;
        };

        while stack.len() > 1 && stack.last().is_some_and(|top| top.depth >= node.depth) {
            close_top(&mut stack);
        }

        let parent_depth = stack.last().map(|n| n.depth).unwrap_or(0);
        if !node.is_attribute && node.depth > parent_depth + 1 {
            tracing::warn!(
                sheet = %sheet.name,
                row = node.source_row,
                key = %node.key,
                "row skips nesting levels; attaching to nearest open ancestor"
            );
        }
        stack.push(node);
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }

    Ok(stack.pop().unwrap_or_else(SpecNode::root))
}

/// Pop the top of the stack and attach it to the new top.
fn close_top(stack: &mut Vec<SpecNode>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(done);
        }
    }
}

fn parse_row(
    sheet: &Sheet,
    layout: Layout,
    locales: &[String],
    row: usize,
) -> Result<Option<SpecNode>, StructureError> {
    let key_col = (0..layout.first_locale_col).find(|&col| !sheet.cell(row, col).is_empty());

    let value_by_locale: BTreeMap<String, String> = locales
        .iter()
        .enumerate()
        .filter_map(|(i, locale)| {
            let value = sheet.cell(row, layout.first_locale_col + i);
            (!value.is_empty()).then(|| (locale.clone(), value.to_string()))
        })
        .collect();

    let Some(key_col) = key_col else {
        if value_by_locale.is_empty() {
            return Ok(None);
        }
        return Err(StructureError::OrphanValues {
            sheet: sheet.name.clone(),
            row: row + 1,
        });
    };

    let key = sheet.cell(row, key_col).to_string();

    Ok(Some(SpecNode {
        is_attribute: key_col == layout.attribute_col,
        is_macro: is_macro_key(&key),
        key,
        value_by_locale,
        source_row: row + 1,
        depth: key_col + 1,
        children: Vec::new(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["", "", "attribute", "en", "de"],
            vec!["path", "", "", "/index.html", "/de/index.html"],
            vec!["head"],
            vec!["", "title", "", "Test Page", "Testseite"],
            vec!["", "link"],
            vec!["", "", "rel", "stylesheet"],
            vec!["", "", "href", "/style.css"],
            vec!["body"],
            vec!["", "h1", "", "Welcome", "Willkommen"],
            vec!["", "p", "", "This is some text.", "Dies ist etwas Text."],
            vec![
                "",
                "footer",
                "",
                r#"<a href="/imprint">Imprint</a>"#,
                r#"<a href="/imprint">Impressum</a>"#,
            ],
        ]
    }

    const INDEX_TREE_YAML: &str = r#"key: html
is_attribute: false
is_macro: false
value_by_locale: {}
source_row: 0
depth: 0
children:
- key: head
  is_attribute: false
  is_macro: false
  value_by_locale: {}
  source_row: 3
  depth: 1
  children:
  - key: title
    is_attribute: false
    is_macro: false
    value_by_locale:
      de: Testseite
      en: Test Page
    source_row: 4
    depth: 2
    children: []
  - key: link
    is_attribute: false
    is_macro: false
    value_by_locale: {}
    source_row: 5
    depth: 2
    children:
    - key: rel
      is_attribute: true
      is_macro: false
      value_by_locale:
        en: stylesheet
      source_row: 6
      depth: 3
      children: []
    - key: href
      is_attribute: true
      is_macro: false
      value_by_locale:
        en: /style.css
      source_row: 7
      depth: 3
      children: []
- key: body
  is_attribute: false
  is_macro: false
  value_by_locale: {}
  source_row: 8
  depth: 1
  children:
  - key: h1
    is_attribute: false
    is_macro: false
    value_by_locale:
      de: Willkommen
      en: Welcome
    source_row: 9
    depth: 2
    children: []
  - key: p
    is_attribute: false
    is_macro: false
    value_by_locale:
      de: Dies ist etwas Text.
      en: This is some text.
    source_row: 10
    depth: 2
    children: []
  - key: footer
    is_attribute: false
    is_macro: false
    value_by_locale:
      de: <a href="/imprint">Impressum</a>
      en: <a href="/imprint">Imprint</a>
    source_row: 11
    depth: 2
    children: []
"#;

    #[test]
    fn parses_index_sheet_tree() {
        let page = PageSpec::parse_rows("index", index_rows()).unwrap();

        let yaml = serde_yaml::to_string(page.root()).unwrap();

        assert_eq!(yaml, INDEX_TREE_YAML);
    }

    #[test]
    fn reads_locales_and_paths() {
        let page = PageSpec::parse_rows("index", index_rows()).unwrap();

        assert_eq!(page.name(), "index");
        assert_eq!(page.locales(), &["en".to_string(), "de".to_string()]);
        assert_eq!(page.path("en"), Some("/index.html"));
        assert_eq!(page.path("de"), Some("/de/index.html"));
        assert_eq!(page.path("fr"), None);
        assert!(page.has_locale("de"));
        assert!(!page.has_locale("fr"));
    }

    #[test]
    fn locales_stop_at_first_blank_header_cell() {
        let page = PageSpec::parse_rows(
            "index",
            vec![
                vec!["", "attribute", "en", "de", "", "fr"],
                vec!["path", "", "/en.html", "/de.html", "", "/fr.html"],
            ],
        )
        .unwrap();

        assert_eq!(page.locales(), &["en".to_string(), "de".to_string()]);
        assert_eq!(page.path("fr"), None);
    }

    #[test]
    fn rejects_attribute_marker_in_first_column() {
        let err = PageSpec::parse_rows(
            "index",
            vec![vec!["attribute", "en"], vec!["path", "/en.html"]],
        )
        .unwrap_err();

        assert_eq!(
            err,
            StructureError::MisplacedAttributeColumn {
                sheet: "index".to_string()
            }
        );
    }

    #[test]
    fn ignores_header_cells_before_the_marker() {
        let page = PageSpec::parse_rows(
            "index",
            vec![
                vec!["element", "nested", "attribute", "en"],
                vec!["path", "", "", "/index.html"],
                vec!["body"],
            ],
        )
        .unwrap();

        assert_eq!(page.locales(), &["en".to_string()]);
        assert_eq!(page.root().children[0].key, "body");
    }

    #[test]
    fn every_child_is_one_level_deeper() {
        let page = PageSpec::parse_rows("index", index_rows()).unwrap();

        assert_eq!(page.root().depth, 0);
        for node in page.root().walk() {
            for child in &node.children {
                assert_eq!(child.depth, node.depth + 1, "row {}", child.source_row);
            }
        }
    }

    #[test]
    fn omits_blank_locale_cells() {
        let page = PageSpec::parse_rows("index", index_rows()).unwrap();
        let rel = &page.root().children[0].children[1].children[0];

        assert_eq!(rel.key, "rel");
        assert!(rel.is_attribute);
        assert!(rel.value_by_locale.contains_key("en"));
        assert!(!rel.value_by_locale.contains_key("de"));
    }

    #[test]
    fn attaches_depth_gaps_to_nearest_ancestor() {
        let page = PageSpec::parse_rows(
            "gaps",
            vec![
                vec!["", "", "", "attribute", "en"],
                vec!["path", "", "", "", "/gaps.html"],
                vec!["body"],
                vec!["", "", "span", "", "deep"],
                vec!["", "p", "", "", "shallow"],
            ],
        )
        .unwrap();

        let body = &page.root().children[0];
        assert_eq!(body.children.len(), 2);
        assert_eq!(body.children[0].key, "span");
        assert_eq!(body.children[0].depth, 3);
        assert_eq!(body.children[1].key, "p");
    }

    #[test]
    fn marks_macros_without_expanding_them() {
        let page = PageSpec::parse_rows(
            "index",
            vec![
                vec!["", "attribute", "en"],
                vec!["path", "", "/index.html"],
                vec!["Header", "", "Hi"],
            ],
        )
        .unwrap();

        let header = &page.root().children[0];
        assert!(header.is_macro);
        assert!(!header.is_attribute);
        assert_eq!(header.key, "Header");
        assert_eq!(header.best_value("en", page.locales()), "Hi");
    }

    #[test]
    fn skips_blank_rows() {
        let page = PageSpec::parse_rows(
            "index",
            vec![
                vec!["", "attribute", "en"],
                vec!["path", "", "/index.html"],
                vec!["head"],
                vec!["", "", ""],
                vec![],
                vec!["body"],
            ],
        )
        .unwrap();

        let keys: Vec<&str> = page.root().children.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["head", "body"]);
        assert_eq!(page.root().children[1].source_row, 6);
    }

    #[test]
    fn rejects_values_without_a_key() {
        let err = PageSpec::parse_rows(
            "index",
            vec![
                vec!["", "attribute", "en"],
                vec!["path", "", "/index.html"],
                vec!["", "", "stray"],
            ],
        )
        .unwrap_err();

        assert_eq!(
            err,
            StructureError::OrphanValues {
                sheet: "index".to_string(),
                row: 3
            }
        );
    }

    #[test]
    fn rejects_empty_sheet() {
        let rows: Vec<Vec<&str>> = vec![];
        let err = PageSpec::parse_rows("blank", rows).unwrap_err();

        assert_eq!(
            err,
            StructureError::Empty {
                sheet: "blank".to_string()
            }
        );
    }

    #[test]
    fn rejects_header_without_attribute_marker() {
        let err = PageSpec::parse_rows(
            "index",
            vec![vec!["", "attr", "en"], vec!["path", "", "/index.html"]],
        )
        .unwrap_err();

        assert_eq!(
            err,
            StructureError::MissingAttributeColumn {
                sheet: "index".to_string()
            }
        );
        assert!(err.to_string().contains("index"));
    }

    #[test]
    fn rejects_header_without_locales() {
        let err = PageSpec::parse_rows("index", vec![vec!["", "attribute", "", "en"]]).unwrap_err();

        assert_eq!(
            err,
            StructureError::NoLocales {
                sheet: "index".to_string()
            }
        );
    }

    #[test]
    fn rejects_duplicate_locales() {
        let err = PageSpec::parse_rows("index", vec![vec!["", "attribute", "en", "en"]]).unwrap_err();

        assert_eq!(
            err,
            StructureError::DuplicateLocale {
                sheet: "index".to_string(),
                locale: "en".to_string()
            }
        );
    }

    #[test]
    fn rejects_missing_or_mislabelled_path_row() {
        let missing = PageSpec::parse_rows("index", vec![vec!["", "attribute", "en"]]).unwrap_err();
        let mislabelled = PageSpec::parse_rows(
            "index",
            vec![vec!["", "attribute", "en"], vec!["paths", "", "/index.html"]],
        )
        .unwrap_err();

        assert_eq!(
            missing,
            StructureError::MissingPathRow {
                sheet: "index".to_string()
            }
        );
        assert_eq!(missing, mislabelled);
    }

    #[test]
    fn rejects_blank_locale_path() {
        let err = PageSpec::parse_rows(
            "index",
            vec![
                vec!["", "attribute", "en", "de"],
                vec!["path", "", "/index.html"],
            ],
        )
        .unwrap_err();

        assert_eq!(
            err,
            StructureError::MissingPath {
                sheet: "index".to_string(),
                locale: "de".to_string()
            }
        );
    }

    #[test]
    fn sheets_parse_independently() {
        let first = PageSpec::parse_rows(
            "first",
            vec![vec!["", "attribute", "en"], vec!["path", "", "/a.html"]],
        )
        .unwrap();
        let second = PageSpec::parse_rows(
            "second",
            vec![vec!["", "attribute", "fr"], vec!["path", "", "/b.html"]],
        )
        .unwrap();

        assert_eq!(first.locales(), &["en".to_string()]);
        assert_eq!(second.locales(), &["fr".to_string()]);
        assert_eq!(first.path("fr"), None);
        assert_eq!(second.path("en"), None);
    }
}
