//! The `convert` command.

use std::path::Path;

use anyhow::Context;
use console::style;

use searchpdf::{Conversion, ConvertEvent, ConvertOptions, Converter, Settings};

use super::helpers::page_progress;

/// OCR `input` into a searchable PDF at `output` and print the recognized text.
pub fn cmd_convert(
    settings: &Settings,
    input: &Path,
    output: &Path,
    json: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let converter = Converter::from_settings(settings)?;
    let options = ConvertOptions::from_settings(settings)?;

    let pb = page_progress(json);
    pb.set_message(format!("Preparing {}", options.languages));

    let result = converter.convert_with_events(
        input,
        output,
        &options,
        &mut |event: ConvertEvent| match event {
            ConvertEvent::LanguagesReady { fetched } => {
                for code in fetched {
                    pb.println(format!(
                        "{} Downloaded language data: {}",
                        style("↓").cyan(),
                        code
                    ));
                }
            }
            ConvertEvent::RasterizeFailed { error } => {
                pb.finish_and_clear();
                eprintln!(
                    "{} An error occurred while converting PDF to images: {}",
                    style("✗").red(),
                    error
                );
                eprintln!(
                    "  {}",
                    style("Ensure Poppler is installed and added to PATH.").dim()
                );
            }
            ConvertEvent::Rasterized { total_pages } => {
                pb.set_length(total_pages as u64);
                pb.set_message("Running OCR");
            }
            ConvertEvent::PageStarted { page_number } => {
                pb.set_message(format!("page {}", page_number));
            }
            ConvertEvent::PageCompleted { .. } => pb.inc(1),
            ConvertEvent::Saved { .. } => pb.finish_and_clear(),
        },
    );

    let result = result.with_context(|| format!("Failed to convert {}", input.display()))?;
    let conversion = match result {
        Some(conversion) => conversion,
        None => anyhow::bail!("No output written for {}", input.display()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&conversion)?);
    } else {
        print_summary(&conversion, quiet);
    }

    Ok(())
}

fn print_summary(conversion: &Conversion, quiet: bool) {
    if !quiet {
        for (page_num, text) in conversion.ocr_texts().iter().enumerate() {
            println!("{}", style(format!("Page {} OCR text:", page_num + 1)).bold());
            println!("{}", text);
            println!();
        }
    }

    println!(
        "{} Wrote {} ({} pages, {} dpi, {})",
        style("✓").green(),
        conversion.output.display(),
        conversion.pages.len(),
        conversion.dpi,
        conversion.languages
    );
}
