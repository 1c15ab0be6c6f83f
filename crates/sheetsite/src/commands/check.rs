//! Validate every sheet without writing output.

use std::path::Path;

use anyhow::{Context, Result};
use sheetsite_static::StaticBuilder;

use crate::config::load_config;

/// Run the check command.
pub fn run(site_dir: &Path, config: &Path) -> Result<()> {
    let build_config = load_config(site_dir, config)?.build_config(site_dir);

    let result = StaticBuilder::new(build_config)
        .check()
        .context("Check failed")?;

    tracing::info!(
        "{} pages render cleanly in {} documents (locales: {})",
        result.pages,
        result.documents,
        result.locales.join(", ")
    );

    Ok(())
}
