//! Topic statistics per app and storefront.

use std::collections::{BTreeMap, HashSet};

use revlens_core::{AnnotatedReview, ReviewLabel, TopicSummaryRow};

#[derive(Default)]
struct Tally {
    reviews: usize,
    /// Reviews with a numeric score; NaN scores count toward `reviews` only.
    scored: usize,
    score_sum: f64,
    positive: usize,
    negative: usize,
    mixed: usize,
    neutral: usize,
}

/// Count reviews per `(app_name, country, topic)`.
///
/// A review counts once per distinct topic it mentions. The mean score
/// ignores NaN scores, and is 0 when no review of a topic has one. Rows are
/// ordered by app, country, descending review count, then topic.
#[must_use]
pub fn summarize_topics(reviews: &[AnnotatedReview]) -> Vec<TopicSummaryRow> {
    let mut tallies: BTreeMap<(String, String, String), Tally> = BTreeMap::new();

    for annotated in reviews {
        let aggregate = &annotated.aggregate;
        let mut seen = HashSet::new();
        for topic in aggregate.topics.iter().filter(|t| seen.insert(t.as_str())) {
            let key = (
                annotated.review.app_name.clone(),
                annotated.review.country.clone(),
                topic.clone(),
            );
            let tally = tallies.entry(key).or_default();
            tally.reviews += 1;
            if !aggregate.sentiment_score.is_nan() {
                tally.scored += 1;
                tally.score_sum += aggregate.sentiment_score;
            }
            match aggregate.sentiment_label {
                ReviewLabel::Positive => tally.positive += 1,
                ReviewLabel::Negative => tally.negative += 1,
                ReviewLabel::Mixed => tally.mixed += 1,
                ReviewLabel::Neutral => tally.neutral += 1,
            }
        }
    }

    let mut rows: Vec<TopicSummaryRow> = tallies
        .into_iter()
        .map(|((app_name, country, topic), tally)| {
            #[allow(clippy::cast_precision_loss)]
            let mean_sentiment_score = if tally.scored == 0 {
                0.0
            } else {
                tally.score_sum / tally.scored as f64
            };
            TopicSummaryRow {
                app_name,
                country,
                topic,
                review_count: tally.reviews,
                mean_sentiment_score,
                positive: tally.positive,
                negative: tally.negative,
                mixed: tally.mixed,
                neutral: tally.neutral,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.app_name
            .cmp(&b.app_name)
            .then_with(|| a.country.cmp(&b.country))
            .then_with(|| b.review_count.cmp(&a.review_count))
            .then_with(|| a.topic.cmp(&b.topic))
    });
    rows
}
