//! Discovery and parsing of every page in a spec directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use sheetsite_spec::{is_workbook, PageSpec, SheetSource, Workbook};

use crate::builder::BuildError;

/// Prefix of files editors leave behind while a workbook is open.
pub const BACKUP_PREFIX: char = '~';

/// A page together with the workbook it came from.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// Workbook the sheet was read from
    pub source: PathBuf,

    /// Parsed page
    pub spec: PageSpec,
}

/// All pages of a site.
#[derive(Debug, Clone, Default)]
pub struct SiteSpec {
    pages: Vec<LoadedPage>,
}

impl SiteSpec {
    /// Load every workbook under `spec_dir`, skipping `exclude` and its contents.
    ///
    /// Workbooks are visited in file name order and sheets in workbook
    /// order, so page order is stable between runs.
    pub fn load(spec_dir: &Path, exclude: Option<&Path>) -> Result<Self, BuildError> {
        if !spec_dir.is_dir() {
            return Err(BuildError::MissingSpecDir(spec_dir.to_path_buf()));
        }

        let mut site = Self::default();

        let walker = WalkDir::new(spec_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| exclude.map_or(true, |ex| e.path() != ex));

        for entry in walker {
            let entry = entry.map_err(|e| BuildError::Read {
                path: spec_dir.to_path_buf(),
                source: e.into(),
            })?;
            let path = entry.path();

            if !entry.file_type().is_file() || !is_workbook(path) {
                continue;
            }

            let backup = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(BACKUP_PREFIX));
            if backup {
                tracing::debug!("Skipping editor backup {}", path.display());
                continue;
            }

            let mut workbook = Workbook::open(path).map_err(|source| BuildError::Workbook {
                path: path.to_path_buf(),
                source,
            })?;
            site.load_source(path, &mut workbook)?;
        }

        Ok(site)
    }

    /// Parse every sheet of `source` as a page.
    pub fn load_source<S: SheetSource>(
        &mut self,
        path: &Path,
        source: &mut S,
    ) -> Result<usize, BuildError> {
        let sheets = source.sheets().map_err(|source| BuildError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

        let count = sheets.len();
        for sheet in sheets {
            let spec = PageSpec::parse(&sheet).map_err(|source| BuildError::Structure {
                path: path.to_path_buf(),
                source,
            })?;
            tracing::debug!(
                "Loaded page {:?} ({} locales) from {}",
                spec.name(),
                spec.locales().len(),
                path.display()
            );
            self.pages.push(LoadedPage {
                source: path.to_path_buf(),
                spec,
            });
        }

        Ok(count)
    }

    pub fn pages(&self) -> &[LoadedPage] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Union of all page locales, in first-seen order.
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = Vec::new();
        for page in &self.pages {
            for locale in page.spec.locales() {
                if !locales.contains(&locale.as_str()) {
                    locales.push(locale.as_str());
                }
            }
        }
        locales
    }
}
