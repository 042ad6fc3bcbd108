//! The `check` command: external tool and language data status.

use console::style;

use searchpdf::tool::check_binary;
use searchpdf::{OcrBackend, Settings, TessdataStore, TesseractBackend};

/// Report which external tools and language models are available.
pub fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("OCR Tool Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("Poppler:").cyan());
    let mut all_found = true;
    for (name, path) in [
        ("pdftoppm", &settings.tools.pdftoppm),
        ("pdftotext", &settings.tools.pdftotext),
    ] {
        let status = if check_binary(path) {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<15} {}", name, status);
    }
    if !all_found {
        println!(
            "                  {}",
            style("Install with: apt install poppler-utils").dim()
        );
    }

    println!("\n{}", style("OCR Backend:").cyan());
    let tesseract =
        TesseractBackend::new(&settings.tessdata_dir).with_binary(&settings.tools.tesseract);
    let tesseract_status = if tesseract.is_available() {
        style("✓ available").green()
    } else {
        all_found = false;
        style("✗ not available").red()
    };
    println!("  {:<15} {}", "Tesseract", tesseract_status);
    if !tesseract.is_available() {
        println!(
            "                  {}",
            style(tesseract.availability_hint()).dim()
        );
    }

    println!("\n{}", style("Language Data:").cyan());
    let store = TessdataStore::from_settings(settings)?;
    println!("  {:<15} {}", "directory", store.dir().display());
    let cached = store.cached_languages()?;
    if cached.is_empty() {
        println!(
            "  {:<15} {}",
            "cached",
            style("○ none yet, will auto-download").yellow()
        );
    } else {
        println!("  {:<15} {}", "cached", cached.join(", "));
    }

    let languages = settings.language_set()?;
    for code in languages.codes() {
        let status = if store.is_cached(code) {
            style("✓ cached").green()
        } else {
            style("○ will auto-download").yellow()
        };
        println!("  {:<15} {}", code, status);
    }

    println!();
    if all_found {
        println!("{}", style("All required tools found.").green());
    } else {
        println!(
            "{}",
            style("Some tools are missing; conversion will fail until they are installed.").yellow()
        );
    }

    Ok(())
}
