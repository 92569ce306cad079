//! Language detection and resolution handlers.

use std::io;
use std::path::Path;

use anyhow::Context;
use revlens_annotate::{detect_languages, read_reviews, LanguageResolver, Stage};
use revlens_core::{default_country_map, load_country_map, AppConfig};

fn resolver(config: &AppConfig) -> anyhow::Result<LanguageResolver> {
    let country_map = match &config.country_map_path {
        Some(path) => load_country_map(path)
            .with_context(|| format!("failed to load country map {}", path.display()))?,
        None => default_country_map(),
    };
    Ok(LanguageResolver::new(country_map))
}

/// Write `id,country,detected_language,resolved_language` for each input row.
///
/// # Errors
///
/// Returns an error if the input cannot be read or lacks required columns.
pub(crate) fn run_detect(config: &AppConfig, input: &Path) -> anyhow::Result<()> {
    let resolver = resolver(config)?;
    let table = read_reviews(input, Stage::Detection)
        .with_context(|| format!("failed to read reviews from {}", input.display()))?;

    let detected = detect_languages(&table.reviews, resolver.country_map())?;
    let resolution = resolver.resolve_all(detected.iter().map(String::as_str));

    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    writer.write_record(["id", "country", "detected_language", "resolved_language"])?;
    for ((review, detected), resolved) in table
        .reviews
        .iter()
        .zip(&detected)
        .zip(&resolution.per_row)
    {
        writer.write_record([
            review.id.as_str(),
            review.country.as_str(),
            detected.as_str(),
            resolved.as_str(),
        ])?;
    }
    writer.flush()?;

    tracing::info!(rows = table.reviews.len(), languages = ?resolution.by_raw, "detected languages");
    Ok(())
}

/// Print `code -> language` for each code, in argument order.
///
/// # Errors
///
/// Returns an error only if the configured country map cannot be loaded;
/// resolution itself never fails.
pub(crate) fn run_resolve(config: &AppConfig, codes: &[String]) -> anyhow::Result<()> {
    let resolver = resolver(config)?;
    for code in codes {
        println!("{code} -> {}", resolver.resolve(code));
    }
    Ok(())
}
