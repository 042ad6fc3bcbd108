//! Shared helper functions for CLI commands.

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};

use searchpdf::Settings;

/// Apply command-line overrides on top of loaded settings.
pub fn with_overrides(
    mut settings: Settings,
    dpi: Option<u32>,
    languages: Option<String>,
) -> anyhow::Result<Settings> {
    if let Some(dpi) = dpi {
        settings.dpi = dpi;
    }
    if let Some(languages) = languages {
        settings.languages = languages;
    }
    settings.validate().context("Invalid arguments")?;
    Ok(settings)
}

/// Page progress bar; hidden when `hidden` is set.
pub fn page_progress(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
