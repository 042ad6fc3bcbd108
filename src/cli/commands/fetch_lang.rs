//! The `fetch-lang` command.

use console::style;

use searchpdf::{Settings, TessdataStore};

/// Download any missing language data for the configured languages.
pub fn cmd_fetch_lang(settings: &Settings) -> anyhow::Result<()> {
    let languages = settings.language_set()?;
    let store = TessdataStore::from_settings(settings)?;

    println!(
        "Language data directory: {}",
        style(store.dir().display()).cyan()
    );

    for code in languages.codes() {
        let status = if store.ensure_language(code)? {
            style("✓ downloaded").green()
        } else {
            style("✓ cached").dim()
        };
        println!("  {:<10} {}", code, status);
    }

    Ok(())
}
