//! Annotation command handlers.

use std::path::Path;

use anyhow::Context;
use revlens_annotate::{
    annotate, annotate_detected, compose_from_row, read_annotated_rows, read_reviews,
    summarize_topics, write_notebook, write_outputs, write_topic_summary, PipelineContext, Stage,
};
use revlens_core::{AppConfig, NotebookRow};

/// Annotate an input table and write the three output tables.
///
/// Rows that already carry `detected_language` skip detection; everything
/// else is detected in-run. Inference servers are probed once up front and
/// replaced by fallbacks if unreachable.
///
/// # Errors
///
/// Returns an error if the input cannot be read or lacks required columns,
/// the country map file is invalid, or an output table cannot be written.
pub(crate) async fn run_annotate(
    config: &AppConfig,
    input: &Path,
    output_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let table = read_reviews(input, Stage::Annotation)
        .with_context(|| format!("failed to read reviews from {}", input.display()))?;
    let mut ctx = PipelineContext::from_config(config).await?;

    let output = match &table.detected_languages {
        Some(detected) => annotate_detected(&table.reviews, detected, &mut ctx).await?,
        None => annotate(&table.reviews, &mut ctx).await?,
    };

    let dir = output_dir.unwrap_or(config.output_dir.as_path());
    let paths = write_outputs(&output, dir)
        .with_context(|| format!("failed to write outputs to {}", dir.display()))?;

    println!(
        "annotated {} of {} reviews: {}, {}, {}",
        output.reviews.len(),
        table.reviews.len(),
        paths.structured.display(),
        paths.notebook.display(),
        paths.topic_summary.display(),
    );
    Ok(())
}

/// Recompose summaries and topic statistics from a structured table.
///
/// No models are needed: sentiment and topics are read back from the table.
/// Only the notebook and topic summary tables are written; the structured
/// table is left as it is on disk. Malformed rows are skipped.
///
/// # Errors
///
/// Returns an error if the structured table cannot be read or the outputs
/// cannot be written.
pub(crate) fn run_summarize(
    config: &AppConfig,
    input: &Path,
    output_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let rows = read_annotated_rows(input)
        .with_context(|| format!("failed to read structured table {}", input.display()))?;

    let mut notebook = Vec::with_capacity(rows.len());
    let mut reviews = Vec::with_capacity(rows.len());
    for row in rows {
        let summary = compose_from_row(
            &row.country,
            &row.app_name,
            &row.resolved_language,
            row.sentiment_label,
            row.sentiment_score,
            &row.topics,
            &row.details,
        );
        notebook.push(NotebookRow {
            id: row.id.clone(),
            app_name: row.app_name.clone(),
            country: row.country.clone(),
            language: row.resolved_language.clone(),
            rating: row.rating,
            review_date: row.review_date,
            sentiment_label: row.sentiment_label,
            summary,
        });
        reviews.push(row.into_review());
    }
    let topic_summary = summarize_topics(&reviews);

    let dir = output_dir.unwrap_or(config.output_dir.as_path());
    let notebook_path = write_notebook(&notebook, dir)
        .with_context(|| format!("failed to write notebook export to {}", dir.display()))?;
    let topics_path = write_topic_summary(&topic_summary, dir)
        .with_context(|| format!("failed to write topic summary to {}", dir.display()))?;

    println!(
        "summarized {} reviews: {}, {}",
        notebook.len(),
        notebook_path.display(),
        topics_path.display(),
    );
    Ok(())
}
