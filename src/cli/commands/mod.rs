//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod convert;
mod fetch_lang;
mod helpers;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use searchpdf::Settings;

#[derive(Parser)]
#[command(name = "searchpdf")]
#[command(about = "Turn scanned PDFs into searchable PDFs with an invisible OCR text layer")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "SEARCHPDF_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// OCR a PDF and write a searchable copy
    Convert {
        /// PDF to read
        input: PathBuf,
        /// Where to write the searchable PDF
        output: PathBuf,
        /// Rendering resolution (default: 300, or from config)
        #[arg(long)]
        dpi: Option<u32>,
        /// Languages joined with '+', e.g. eng+spa+fra (default: eng, or from config)
        #[arg(short, long)]
        lang: Option<String>,
        /// Print the result as JSON instead of per-page text
        #[arg(long)]
        json: bool,
        /// Don't print recognized text
        #[arg(short, long)]
        quiet: bool,
    },

    /// Download OCR language data without converting anything
    FetchLang {
        /// Languages joined with '+' (default: from config)
        langs: Option<String>,
    },

    /// Check if required tools are installed
    Check,
}

/// Run the CLI.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = &settings.source_path {
        tracing::info!("Loaded configuration from {}", path.display());
    }

    match cli.command {
        Commands::Convert {
            input,
            output,
            dpi,
            lang,
            json,
            quiet,
        } => {
            let settings = helpers::with_overrides(settings, dpi, lang)?;
            convert::cmd_convert(&settings, &input, &output, json, quiet)
        }
        Commands::FetchLang { langs } => {
            let settings = helpers::with_overrides(settings, None, langs)?;
            fetch_lang::cmd_fetch_lang(&settings)
        }
        Commands::Check => check::cmd_check(&settings),
    }
}
