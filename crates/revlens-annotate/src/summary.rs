//! Human-readable per-review summaries for the notebook export.

use revlens_core::{Review, ReviewAggregate, ReviewLabel, SentenceDetail, SentimentLabel};

/// Rendered in place of the topic list when a review has none.
pub const NO_TOPICS: &str = "various aspects";

const MAX_EXAMPLES: usize = 2;

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "english"),
    ("fr", "french"),
    ("de", "german"),
    ("sv", "swedish"),
    ("it", "italian"),
    ("es", "spanish"),
    ("ca", "catalan"),
    ("pt", "portuguese"),
    ("nl", "dutch"),
    ("da", "danish"),
    ("no", "norwegian"),
    ("fi", "finnish"),
    ("pl", "polish"),
    ("ru", "russian"),
    ("tr", "turkish"),
    ("ja", "japanese"),
    ("ko", "korean"),
    ("zh", "chinese"),
    ("ar", "arabic"),
];

/// English display name for a language code, or the code itself.
#[must_use]
pub fn language_name(code: &str) -> String {
    let code = code.trim().to_lowercase();
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(code, |(_, name)| (*name).to_string())
}

/// Upper-case the first letter of every run of letters and lower-case the
/// rest. Separators (`_`, `-`, digits, whitespace) are kept as they are.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn format_score(score: f64) -> String {
    if score.is_nan() || score == 0.0 {
        return "0.00".to_string();
    }
    format!("{score:.2}")
}

fn tag(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "POS",
        SentimentLabel::Negative => "NEG",
        SentimentLabel::Neutral => "NEU",
    }
}

/// First positive, negative and neutral sentence, in that order, at most two.
fn examples(details: &[SentenceDetail]) -> Vec<String> {
    [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ]
    .into_iter()
    .filter_map(|label| {
        details
            .iter()
            .find(|d| d.sentiment == label)
            .map(|d| format!("\u{2018}{}\u{2019} [{}]", d.sentence, tag(label)))
    })
    .take(MAX_EXAMPLES)
    .collect()
}

/// Fields a summary is rendered from, borrowed from either a live review or a
/// row read back from the structured table.
struct SummaryParts<'a> {
    country: &'a str,
    app_name: &'a str,
    language: &'a str,
    label: ReviewLabel,
    score: f64,
    topics: &'a [String],
    details: &'a [SentenceDetail],
}

fn render(parts: &SummaryParts<'_>) -> String {
    let topics = if parts.topics.is_empty() {
        NO_TOPICS.to_string()
    } else {
        parts.topics.join("; ")
    };

    let mut summary = format!(
        "In {}, a {} user wrote in {}. The overall sentiment is {} (score {}). It mainly discusses {}.",
        parts.country.trim().to_uppercase(),
        title_case(parts.app_name.trim()),
        language_name(parts.language),
        parts.label,
        format_score(parts.score),
        topics,
    );

    let examples = examples(parts.details);
    if !examples.is_empty() {
        summary.push_str(" Example sentences: ");
        summary.push_str(&examples.join("; "));
        summary.push('.');
    }
    summary
}

/// Compose the notebook summary for one aggregated review.
///
/// `language` is the review's resolved language code.
#[must_use]
pub fn compose(review: &Review, language: &str, aggregate: &ReviewAggregate) -> String {
    render(&SummaryParts {
        country: &review.country,
        app_name: &review.app_name,
        language,
        label: aggregate.sentiment_label,
        score: aggregate.sentiment_score,
        topics: &aggregate.topics,
        details: &aggregate.details,
    })
}

/// Compose a summary from serialized columns of the structured table.
///
/// `topics` is `;`-separated and `details` a JSON array. Details that fail to
/// parse are treated as absent, so the summary has no examples.
#[must_use]
pub fn compose_from_row(
    country: &str,
    app_name: &str,
    language: &str,
    label: ReviewLabel,
    score: f64,
    topics: &str,
    details: &str,
) -> String {
    let topics = split_topics(topics);
    let details: Vec<SentenceDetail> = match serde_json::from_str(details) {
        Ok(details) => details,
        Err(e) => {
            tracing::debug!(error = %e, "unparseable details, composing without examples");
            Vec::new()
        }
    };

    render(&SummaryParts {
        country,
        app_name,
        language,
        label,
        score,
        topics: &topics,
        details: &details,
    })
}

/// Split a `;`-joined topic column, dropping blank entries.
#[must_use]
pub fn split_topics(joined: &str) -> Vec<String> {
    joined
        .split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
