//! Scaffold a new site.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

/// Run the init command.
pub fn run(site_dir: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing site in {}...", site_dir.display());

    let spec_dir = site_dir.join("spec");
    let static_dir = spec_dir.join("static");

    if spec_dir.exists() && !yes {
        tracing::warn!("spec/ directory already exists. Use --yes to overwrite.");
        return Ok(());
    }

    fs::create_dir_all(&static_dir).context("Failed to create spec/static directory")?;

    let config_path = site_dir.join("site.toml");
    if !config_path.exists() || yes {
        fs::write(&config_path, DEFAULT_CONFIG).context("Failed to write site.toml")?;
        tracing::info!("Created site.toml");
    }

    let workbook_path = spec_dir.join("site.xlsx");
    if !workbook_path.exists() || yes {
        write_starter_workbook(&workbook_path).context("Failed to write spec/site.xlsx")?;
        tracing::info!("Created spec/site.xlsx");
    }

    let style_path = static_dir.join("style.css");
    if !style_path.exists() || yes {
        fs::write(&style_path, DEFAULT_STYLE).context("Failed to write style.css")?;
        tracing::info!("Created spec/static/style.css");
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Edit spec/site.xlsx, then run 'sheetsite build'.");

    Ok(())
}

/// Rows of the starter `index` sheet: header, path row, element tree.
const STARTER_ROWS: &[&[&str]] = &[
    &["", "", "attribute", "en", "de"],
    &["path", "", "", "/index.html", "/de/index.html"],
    &["head"],
    &["", "meta"],
    &["", "", "charset", "utf-8"],
    &["", "title", "", "Welcome", "Willkommen"],
    &["", "link"],
    &["", "", "rel", "stylesheet"],
    &["", "", "href", "/style.css"],
    &["body"],
    &["", "h1", "", "Welcome", "Willkommen"],
    &[
        "",
        "p",
        "",
        "Edit <em>spec/site.xlsx</em> to change this page.",
        "Bearbeite <em>spec/site.xlsx</em>, um diese Seite zu ändern.",
    ],
    &[
        "",
        "footer",
        "",
        r#"<a href="/de/index.html">Deutsch</a>"#,
        r#"<a href="/index.html">English</a>"#,
    ],
];

fn write_starter_workbook(path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("index")?;

    for (r, row) in STARTER_ROWS.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            if r < 2 {
                sheet.write_string_with_format(r as u32, c as u16, *cell, &header)?;
            } else {
                sheet.write_string(r as u32, c as u16, *cell)?;
            }
        }
    }
    sheet.set_column_width(3, 48)?;
    sheet.set_column_width(4, 48)?;

    workbook.save(path)?;
    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Sheetsite Configuration

[site]
# Directory holding the spec workbooks (one sheet per page)
spec_dir = "spec"

# Copied verbatim into the output before pages are written
static_dir = "spec/static"

# Output directory for the built site
output = "www"

# Remove the output directory before each build
clean = true

# Where the page locale goes: "doctype" or "root" (<html lang="..">)
lang = "doctype"

[sitemap]
# Uncomment to write sitemap.xml
# base_url = "https://example.org"
"#;

const DEFAULT_STYLE: &str = r#"body {
  font-family: system-ui, -apple-system, "Segoe UI", Roboto, sans-serif;
  max-width: 40rem;
  margin: 2rem auto;
  padding: 0 1rem;
  line-height: 1.5;
}

footer {
  margin-top: 3rem;
  font-size: 0.875rem;
}
"#;
