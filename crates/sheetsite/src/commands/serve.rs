//! Preview server command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::load_config;

/// Run the serve command.
pub async fn run(
    site_dir: &Path,
    config: &Path,
    port: u16,
    output: Option<PathBuf>,
    open_browser: bool,
) -> Result<()> {
    let dir = match output {
        Some(dir) => site_dir.join(dir),
        None => load_config(site_dir, config)?
            .build_config(site_dir)
            .output_path(),
    };

    if !dir.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'sheetsite build' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    tracing::info!("Serving {} at http://{}", dir.display(), addr);

    let app = Router::new().fallback_service(ServeDir::new(&dir));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    if open_browser {
        let url = format!("http://{}", addr);
        if let Err(e) = open::that(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    axum::serve(listener, app).await?;

    Ok(())
}
