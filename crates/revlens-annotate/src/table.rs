//! CSV input negotiation and the three output tables.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{Reader, StringRecord, Writer};
use revlens_core::{
    AnnotatedReview, NotebookRow, Review, ReviewAggregate, ReviewLabel, SentenceDetail,
    TopicSummaryRow,
};
use serde::{Deserialize, Serialize};

use crate::error::AnnotateError;
use crate::pipeline::PipelineOutput;
use crate::summary::split_topics;

pub const STRUCTURED_FILE: &str = "reviews_sentiment_topics.csv";
pub const NOTEBOOK_FILE: &str = "notebooklm_reviews.csv";
pub const TOPIC_SUMMARY_FILE: &str = "topic_summary.csv";

const TEXT_COLUMN: &str = "cleaned_content";

/// Exact names tried, in order, when `cleaned_content` is absent.
const TEXT_COLUMN_NAMES: &[&str] = &[
    "content",
    "review_text",
    "review_body",
    "reviewbody",
    "text",
    "body",
    "comment",
    "description",
    "review",
];

/// Name tokens that mark a column as free text.
const TEXT_COLUMN_TOKENS: &[&str] = &["content", "text", "body", "comment", "description"];

/// Which consumer an input table is read for. Each needs different columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Language detection only: country plus text.
    Detection,
    /// Full annotation from cleaned rows; languages are detected in-run.
    Annotation,
    /// Annotation of rows that already carry `detected_language`.
    Segmentation,
}

impl Stage {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Stage::Detection => "language detection",
            Stage::Annotation => "annotation",
            Stage::Segmentation => "segmentation",
        }
    }

    #[must_use]
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Stage::Detection => &["country", TEXT_COLUMN],
            Stage::Annotation => &["id", "app_name", "country", TEXT_COLUMN],
            Stage::Segmentation => &[
                "id",
                "app_name",
                "country",
                TEXT_COLUMN,
                "detected_language",
            ],
        }
    }
}

/// Typed rows of an input table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewTable {
    pub reviews: Vec<Review>,
    /// Present when the table carries a `detected_language` column.
    pub detected_languages: Option<Vec<String>>,
}

/// Column positions resolved from the header row.
struct Columns {
    by_name: HashMap<String, usize>,
    text: usize,
}

impl Columns {
    fn negotiate(headers: &StringRecord, stage: Stage) -> Result<Self, AnnotateError> {
        let by_name: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_lowercase(), idx))
            .collect();

        let text = by_name
            .get(TEXT_COLUMN)
            .copied()
            .or_else(|| find_text_column(headers));

        let missing: Vec<String> = stage
            .required_columns()
            .iter()
            .filter(|col| {
                if **col == TEXT_COLUMN {
                    text.is_none()
                } else {
                    !by_name.contains_key(**col)
                }
            })
            .map(|col| (*col).to_string())
            .collect();

        match text {
            Some(text) if missing.is_empty() => Ok(Self { by_name, text }),
            _ => Err(AnnotateError::MissingColumns {
                stage: stage.name(),
                columns: missing,
            }),
        }
    }

    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.by_name
            .get(name)
            .and_then(|&idx| record.get(idx))
            .map(str::trim)
    }

    fn non_blank(&self, record: &StringRecord, name: &str) -> Option<String> {
        self.get(record, name)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Locate a free-text column by name when `cleaned_content` is missing.
fn find_text_column(headers: &StringRecord) -> Option<usize> {
    let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    for candidate in TEXT_COLUMN_NAMES {
        if let Some(idx) = names.iter().position(|n| n == candidate) {
            return Some(idx);
        }
    }
    names.iter().position(|name| {
        name.split(|c: char| !c.is_alphanumeric())
            .any(|token| TEXT_COLUMN_TOKENS.contains(&token))
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_rating(raw: &str) -> Option<u8> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    if !(0.0..=f64::from(u8::MAX)).contains(&rounded) {
        return None;
    }
    Some(rounded as u8)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Parse an input table from any reader.
///
/// Ratings are read as numbers and rounded; unparseable ratings and dates
/// become `None` rather than failing the row.
///
/// # Errors
///
/// Returns [`AnnotateError::MissingColumns`] if the header lacks a column
/// `stage` needs, [`AnnotateError::EmptyInput`] if there are no rows, or
/// [`AnnotateError::Csv`] on malformed CSV.
pub fn parse_reviews<R: io::Read>(input: R, stage: Stage) -> Result<ReviewTable, AnnotateError> {
    let mut reader = Reader::from_reader(input);
    let headers = reader.headers()?.clone();
    let columns = Columns::negotiate(&headers, stage)?;
    let has_detected = columns.by_name.contains_key("detected_language");

    let mut reviews = Vec::new();
    let mut detected = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        reviews.push(Review {
            id: columns
                .non_blank(&record, "id")
                .unwrap_or_else(|| row.to_string()),
            app_name: columns.non_blank(&record, "app_name").unwrap_or_default(),
            country: columns
                .non_blank(&record, "country")
                .map(|c| c.to_lowercase())
                .unwrap_or_default(),
            language: columns.non_blank(&record, "language"),
            cleaned_content: record.get(columns.text).unwrap_or_default().to_string(),
            content: columns.non_blank(&record, "content"),
            rating: columns.get(&record, "rating").and_then(parse_rating),
            review_date: columns.get(&record, "review_date").and_then(parse_date),
        });
        if has_detected {
            detected.push(
                columns
                    .non_blank(&record, "detected_language")
                    .map(|l| l.to_lowercase())
                    .unwrap_or_default(),
            );
        }
    }

    if reviews.is_empty() {
        return Err(AnnotateError::EmptyInput(stage.name()));
    }
    tracing::info!(rows = reviews.len(), stage = stage.name(), "read input table");

    Ok(ReviewTable {
        reviews,
        detected_languages: has_detected.then_some(detected),
    })
}

/// Read an input CSV file for `stage`.
///
/// # Errors
///
/// See [`parse_reviews`]; also [`AnnotateError::Io`] if the file cannot be opened.
pub fn read_reviews(path: &Path, stage: Stage) -> Result<ReviewTable, AnnotateError> {
    let file = std::fs::File::open(path).map_err(|source| AnnotateError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_reviews(file, stage)
}

/// One row of the structured output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRow {
    pub id: String,
    pub app_name: String,
    pub country: String,
    pub language: Option<String>,
    pub detected_language: String,
    pub resolved_language: String,
    pub rating: Option<u8>,
    pub review_date: Option<NaiveDate>,
    pub cleaned_content: String,
    pub sentiment_label: ReviewLabel,
    pub sentiment_score: f64,
    /// Topics joined with `;`.
    pub topics: String,
    /// JSON array of sentence details.
    pub details: String,
}

impl AnnotatedRow {
    /// Flatten an annotated review into table columns.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Json`] if the details fail to serialize.
    pub fn from_review(annotated: &AnnotatedReview) -> Result<Self, AnnotateError> {
        let review = &annotated.review;
        let aggregate = &annotated.aggregate;
        Ok(Self {
            id: review.id.clone(),
            app_name: review.app_name.clone(),
            country: review.country.clone(),
            language: review.language.clone(),
            detected_language: annotated.detected_language.clone(),
            resolved_language: annotated.resolved_language.clone(),
            rating: review.rating,
            review_date: review.review_date,
            cleaned_content: review.cleaned_content.clone(),
            sentiment_label: aggregate.sentiment_label,
            sentiment_score: aggregate.sentiment_score,
            topics: aggregate.topics.join(";"),
            details: serde_json::to_string(&aggregate.details)?,
        })
    }

    /// Rebuild the annotated review. Malformed details become an empty list.
    #[must_use]
    pub fn into_review(self) -> AnnotatedReview {
        let details: Vec<SentenceDetail> = match serde_json::from_str(&self.details) {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(id = %self.id, error = %e, "malformed details JSON, using empty list");
                Vec::new()
            }
        };
        AnnotatedReview {
            review: Review {
                id: self.id,
                app_name: self.app_name,
                country: self.country,
                language: self.language,
                cleaned_content: self.cleaned_content,
                content: None,
                rating: self.rating,
                review_date: self.review_date,
            },
            detected_language: self.detected_language,
            resolved_language: self.resolved_language,
            aggregate: ReviewAggregate {
                sentiment_label: self.sentiment_label,
                sentiment_score: self.sentiment_score,
                topics: split_topics(&self.topics),
                details,
            },
        }
    }
}

/// Where [`write_outputs`] put each table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub structured: PathBuf,
    pub notebook: PathBuf,
    pub topic_summary: PathBuf,
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), AnnotateError> {
    let mut writer = Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| AnnotateError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), AnnotateError> {
    std::fs::create_dir_all(dir).map_err(|source| AnnotateError::Io {
        path: dir.display().to_string(),
        source,
    })
}

/// Write the structured table to `dir/reviews_sentiment_topics.csv`.
///
/// # Errors
///
/// Returns [`AnnotateError::Io`] if `dir` cannot be created, or a CSV/JSON
/// error if the table fails to write.
pub fn write_structured(reviews: &[AnnotatedReview], dir: &Path) -> Result<PathBuf, AnnotateError> {
    ensure_dir(dir)?;
    let path = dir.join(STRUCTURED_FILE);
    let rows = reviews
        .iter()
        .map(AnnotatedRow::from_review)
        .collect::<Result<Vec<_>, _>>()?;
    write_csv(&path, &rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote structured reviews");
    Ok(path)
}

/// Write the notebook export to `dir/notebooklm_reviews.csv`.
///
/// # Errors
///
/// Returns [`AnnotateError::Io`] if `dir` cannot be created, or a CSV error
/// if the table fails to write.
pub fn write_notebook(rows: &[NotebookRow], dir: &Path) -> Result<PathBuf, AnnotateError> {
    ensure_dir(dir)?;
    let path = dir.join(NOTEBOOK_FILE);
    write_csv(&path, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote notebook export");
    Ok(path)
}

/// Write the topic summary to `dir/topic_summary.csv`.
///
/// # Errors
///
/// Returns [`AnnotateError::Io`] if `dir` cannot be created, or a CSV error
/// if the table fails to write.
pub fn write_topic_summary(rows: &[TopicSummaryRow], dir: &Path) -> Result<PathBuf, AnnotateError> {
    ensure_dir(dir)?;
    let path = dir.join(TOPIC_SUMMARY_FILE);
    write_csv(&path, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote topic summary");
    Ok(path)
}

/// Write the structured, notebook and topic summary tables under `dir`.
///
/// # Errors
///
/// See [`write_structured`], [`write_notebook`] and [`write_topic_summary`].
pub fn write_outputs(output: &PipelineOutput, dir: &Path) -> Result<OutputPaths, AnnotateError> {
    Ok(OutputPaths {
        structured: write_structured(&output.reviews, dir)?,
        notebook: write_notebook(&output.notebook, dir)?,
        topic_summary: write_topic_summary(&output.topic_summary, dir)?,
    })
}

/// Read the raw rows of a structured table written by [`write_outputs`].
///
/// Rows that do not match the structured schema (unknown label, blank
/// score, wrong field count) are logged and skipped.
///
/// # Errors
///
/// Returns [`AnnotateError::Csv`] if the file cannot be opened or read, or
/// its header row is malformed.
pub fn read_annotated_rows(path: &Path) -> Result<Vec<AnnotatedRow>, AnnotateError> {
    let mut reader = Reader::from_path(path)?;
    reader.headers()?;

    let mut rows = Vec::new();
    let mut skipped = 0_usize;
    for (idx, row) in reader.deserialize::<AnnotatedRow>().enumerate() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(row = idx + 1, error = %e, "skipping malformed structured row");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        tracing::warn!(path = %path.display(), skipped, kept = rows.len(), "skipped malformed rows");
    }
    Ok(rows)
}

/// Read a structured table back into annotated reviews.
///
/// # Errors
///
/// See [`read_annotated_rows`].
pub fn read_annotated(path: &Path) -> Result<Vec<AnnotatedReview>, AnnotateError> {
    Ok(read_annotated_rows(path)?
        .into_iter()
        .map(AnnotatedRow::into_review)
        .collect())
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
