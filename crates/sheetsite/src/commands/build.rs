//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sheetsite_static::StaticBuilder;

use crate::config::load_config;

/// Run the build command.
pub fn run(site_dir: &Path, config: &Path, output: Option<PathBuf>, no_clean: bool) -> Result<()> {
    tracing::info!("Building site in {}...", site_dir.display());

    let file_config = load_config(site_dir, config)?;

    let mut build_config = file_config.build_config(site_dir);
    if let Some(output) = output {
        build_config.output_dir = output;
    }
    if no_clean {
        build_config.clean = false;
    }

    let builder = StaticBuilder::new(build_config);
    tracing::debug!(
        "Reading specs from {}, writing to {}",
        builder.config().spec_path().display(),
        builder.config().output_path().display()
    );

    let result = builder.build().context("Build failed")?;

    tracing::info!(
        "Built {} pages as {} documents, copied {} assets in {}ms",
        result.pages,
        result.documents,
        result.assets,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
