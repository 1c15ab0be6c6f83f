//! Site configuration file (site.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sheetsite_html::LangPlacement;
use sheetsite_static::BuildConfig;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub sitemap: SitemapConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default = "default_spec_dir")]
    pub spec_dir: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_clean")]
    pub clean: bool,
    #[serde(default)]
    pub lang: LangSetting,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            spec_dir: default_spec_dir(),
            static_dir: default_static_dir(),
            output: default_output(),
            clean: default_clean(),
            lang: LangSetting::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SitemapConfig {
    /// Base URL; no sitemap is written without one
    pub base_url: Option<String>,
}

/// Placement of the `lang` attribute.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LangSetting {
    #[default]
    Doctype,
    Root,
}

impl From<LangSetting> for LangPlacement {
    fn from(setting: LangSetting) -> Self {
        match setting {
            LangSetting::Doctype => LangPlacement::Doctype,
            LangSetting::Root => LangPlacement::Root,
        }
    }
}

fn default_spec_dir() -> String {
    "spec".to_string()
}
fn default_static_dir() -> String {
    "spec/static".to_string()
}
fn default_output() -> String {
    "www".to_string()
}
fn default_clean() -> bool {
    true
}

impl ConfigFile {
    /// Turn the file settings into a build configuration for `site_dir`.
    pub fn build_config(&self, site_dir: &Path) -> BuildConfig {
        BuildConfig {
            site_dir: site_dir.to_path_buf(),
            spec_dir: PathBuf::from(&self.site.spec_dir),
            static_dir: PathBuf::from(&self.site.static_dir),
            output_dir: PathBuf::from(&self.site.output),
            clean: self.site.clean,
            lang: self.site.lang.into(),
            sitemap_base_url: self.sitemap.base_url.clone(),
        }
    }
}

/// Load configuration from `site_dir/config` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(site_dir: &Path, config: &Path) -> Result<ConfigFile> {
    let config_path = site_dir.join(config);
    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let parsed: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        tracing::info!("Loaded config from {}", config_path.display());
        return Ok(parsed);
    }
    tracing::debug!("No {} found, using defaults", config_path.display());
    Ok(ConfigFile::default())
}
