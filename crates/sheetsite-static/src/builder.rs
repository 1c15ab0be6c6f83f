//! Static site builder.

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use sheetsite_html::{render_page, write_document, Document, LangPlacement, RenderError, RenderOptions};
use sheetsite_spec::{SheetError, StructureError};

use crate::assets::copy_tree;
use crate::site::SiteSpec;

/// Configuration for building a site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Site root; relative paths below are resolved against it
    pub site_dir: PathBuf,

    /// Directory holding the spec workbooks
    pub spec_dir: PathBuf,

    /// Directory copied verbatim into the output
    pub static_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Remove the output directory before writing
    pub clean: bool,

    /// Where the locale's `lang` attribute goes
    pub lang: LangPlacement,

    /// Write `sitemap.xml` with URLs under this base
    pub sitemap_base_url: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            site_dir: PathBuf::from("."),
            spec_dir: PathBuf::from("spec"),
            static_dir: PathBuf::from("spec/static"),
            output_dir: PathBuf::from("www"),
            clean: true,
            lang: LangPlacement::default(),
            sitemap_base_url: None,
        }
    }
}

impl BuildConfig {
    /// Spec directory, resolved against the site directory.
    pub fn spec_path(&self) -> PathBuf {
        self.site_dir.join(&self.spec_dir)
    }

    /// Static directory, resolved against the site directory.
    pub fn static_path(&self) -> PathBuf {
        self.site_dir.join(&self.static_dir)
    }

    /// Output directory, resolved against the site directory.
    pub fn output_path(&self) -> PathBuf {
        self.site_dir.join(&self.output_dir)
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages (sheets) processed
    pub pages: usize,

    /// Number of HTML documents written, one per page per locale
    pub documents: usize,

    /// Number of static files copied
    pub assets: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Spec directory not found: {}", .0.display())]
    MissingSpecDir(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: SheetError,
    },

    #[error("{}: {source}", path.display())]
    Structure {
        path: PathBuf,
        #[source]
        source: StructureError,
    },

    #[error("Page {page:?}, locale {locale}: {source}")]
    Render {
        page: String,
        locale: String,
        #[source]
        source: RenderError,
    },

    #[error("Page {page:?}, locale {locale}: output path {path:?} must stay inside the output directory")]
    InvalidPath {
        page: String,
        locale: String,
        path: String,
    },

    #[error("Pages {first:?} and {second:?} both write {path:?}")]
    DuplicateOutput {
        path: String,
        first: String,
        second: String,
    },

    #[error(
        "Refusing to clean output directory {}: it would delete {}",
        output.display(),
        protected.display()
    )]
    UnsafeOutputDir { output: PathBuf, protected: PathBuf },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One rendered page variant, ready to be written.
#[derive(Debug)]
pub struct RenderedDocument {
    /// Sheet name of the page
    pub page: String,

    /// Locale rendered
    pub locale: String,

    /// Output path as authored in the path row
    pub path: String,

    /// Rendered document
    pub document: Document,
}

/// Summary of a check run.
#[derive(Debug)]
pub struct CheckResult {
    pub pages: usize,
    pub documents: usize,
    pub locales: Vec<String>,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the static site.
    ///
    /// Every page is parsed and rendered before anything is written, so a
    /// broken sheet leaves the previous output untouched.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if self.config.clean {
            self.ensure_clean_is_safe()?;
        }

        let site = self.load()?;
        let documents = self.render_all(&site)?;

        let output_dir = self.config.output_path();
        if self.config.clean {
            remove_dir_if_exists(&output_dir)?;
        }

        let static_dir = self.config.static_path();
        let assets = if static_dir.is_dir() {
            copy_tree(&static_dir, &output_dir)?
        } else {
            fs::create_dir_all(&output_dir).map_err(|source| BuildError::Write {
                path: output_dir.clone(),
                source,
            })?;
            0
        };

        for doc in &documents {
            let file = output_file(&output_dir, &doc.path);
            write_html(&file, &doc.document)?;
            tracing::debug!("Wrote {} ({}) to {}", doc.page, doc.locale, file.display());
        }

        if let Some(base_url) = &self.config.sitemap_base_url {
            let sitemap = generate_sitemap(base_url, &documents);
            let path = output_dir.join("sitemap.xml");
            fs::write(&path, sitemap).map_err(|source| BuildError::Write { path, source })?;
        }

        let duration = start.elapsed();

        tracing::info!(
            "Built {} pages into {} documents ({} assets) in {}ms",
            site.pages().len(),
            documents.len(),
            assets,
            duration.as_millis()
        );

        Ok(BuildResult {
            pages: site.pages().len(),
            documents: documents.len(),
            assets,
            duration_ms: duration.as_millis() as u64,
            output_dir,
        })
    }

    /// Parse and render every page without writing anything.
    pub fn check(&self) -> Result<CheckResult, BuildError> {
        let site = self.load()?;
        let documents = self.render_all(&site)?;

        Ok(CheckResult {
            pages: site.pages().len(),
            documents: documents.len(),
            locales: site.locales().into_iter().map(String::from).collect(),
        })
    }

    /// Load all pages from the spec directory.
    pub fn load(&self) -> Result<SiteSpec, BuildError> {
        let static_dir = self.config.static_path();
        let site = SiteSpec::load(&self.config.spec_path(), Some(&static_dir))?;

        if site.is_empty() {
            tracing::warn!(
                "No pages found in {}",
                self.config.spec_path().display()
            );
        }

        Ok(site)
    }

    /// Refuse to clean an output directory that is the site directory or
    /// holds the spec or static directory.
    fn ensure_clean_is_safe(&self) -> Result<(), BuildError> {
        let output = resolved(&self.config.output_path());

        let protected = [
            self.config.site_dir.clone(),
            self.config.spec_path(),
            self.config.static_path(),
        ];
        for path in protected {
            let resolved_path = resolved(&path);
            if resolved_path.starts_with(&output) {
                return Err(BuildError::UnsafeOutputDir {
                    output: self.config.output_path(),
                    protected: path,
                });
            }
        }

        Ok(())
    }

    /// Render every locale of every page, rejecting clashing output paths.
    pub fn render_all(&self, site: &SiteSpec) -> Result<Vec<RenderedDocument>, BuildError> {
        let options = RenderOptions {
            lang: self.config.lang,
        };
        let mut documents = Vec::new();
        let mut owners: HashMap<PathBuf, String> = HashMap::new();

        for page in site.pages() {
            let spec = &page.spec;

            for locale in spec.locales() {
                let path = spec.path(locale).unwrap_or_default().to_string();
                let key = normalized_output(&path).ok_or_else(|| BuildError::InvalidPath {
                    page: spec.name().to_string(),
                    locale: locale.clone(),
                    path: path.clone(),
                })?;

                let owner = format!("{} ({})", spec.name(), locale);
                if let Some(first) = owners.insert(key, owner.clone()) {
                    return Err(BuildError::DuplicateOutput {
                        path,
                        first,
                        second: owner,
                    });
                }

                let document =
                    render_page(spec, locale, options).map_err(|source| BuildError::Render {
                        page: spec.name().to_string(),
                        locale: locale.clone(),
                        source,
                    })?;

                documents.push(RenderedDocument {
                    page: spec.name().to_string(),
                    locale: locale.clone(),
                    path,
                    document,
                });
            }
        }

        Ok(documents)
    }
}

/// Output path relative to the output directory, or `None` if it escapes it.
fn normalized_output(path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();

    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }

    (!out.as_os_str().is_empty()).then_some(out)
}

/// Absolute form of `path`, following links when it exists and resolving
/// `.` and `..` lexically when it does not.
fn resolved(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }

    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve an authored path under the output directory; a leading `/` is
/// relative to the output directory, not the file system root.
fn output_file(output_dir: &Path, path: &str) -> PathBuf {
    output_dir.join(normalized_output(path).unwrap_or_default())
}

fn write_html(path: &Path, document: &Document) -> Result<(), BuildError> {
    let write_err = |source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let file = fs::File::create(path).map_err(write_err)?;
    let mut out = BufWriter::new(file);
    write_document(document, &mut out).map_err(write_err)?;
    out.flush().map_err(write_err)
}

fn remove_dir_if_exists(dir: &Path) -> Result<(), BuildError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BuildError::Write {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Generate a sitemap listing every rendered document.
fn generate_sitemap(base_url: &str, documents: &[RenderedDocument]) -> String {
    let base = base_url.trim_end_matches('/');

    let urls: Vec<String> = documents
        .iter()
        .map(|doc| {
            format!(
                "  <url>\n    <loc>{}/{}</loc>\n  </url>",
                xml_escape(base),
                xml_escape(doc.path.trim_start_matches('/'))
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
        urls.join("\n")
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
