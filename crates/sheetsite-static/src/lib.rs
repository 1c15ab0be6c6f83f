//! Static site generator for spreadsheet page specifications.
//!
//! Loads every workbook in a spec directory, renders each sheet once per
//! locale and writes the documents, plus static assets, into an output tree.

pub mod assets;
pub mod builder;
pub mod site;

#[cfg(test)]
mod testutil;

pub use builder::{BuildConfig, BuildError, BuildResult, CheckResult, RenderedDocument, StaticBuilder};
pub use site::{LoadedPage, SiteSpec};
