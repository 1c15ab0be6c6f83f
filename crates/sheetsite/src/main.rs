//! Sheetsite CLI - static sites authored in spreadsheets.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "sheetsite")]
#[command(about = "Build multi-locale static HTML sites from spreadsheet workbooks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Site directory
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Path to site.toml config file, relative to the site directory
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter site with a sample workbook
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build the static site
    Build {
        /// Output directory (defaults to config or "www")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep existing files in the output directory
        #[arg(long)]
        no_clean: bool,
    },

    /// Parse and render every page without writing output
    Check,

    /// Preview the built site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to the configured output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.dir, yes)?;
        }
        Commands::Build { output, no_clean } => {
            commands::build::run(&cli.dir, &cli.config, output, no_clean)?;
        }
        Commands::Check => {
            commands::check::run(&cli.dir, &cli.config)?;
        }
        Commands::Serve {
            port,
            output,
            no_open,
        } => {
            commands::serve::run(&cli.dir, &cli.config, port, output, !no_open).await?;
        }
    }

    Ok(())
}
