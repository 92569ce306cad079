//! Roll sentence-level sentiment and topics up to the review.

use std::collections::HashSet;

use revlens_core::{ReviewAggregate, ReviewLabel, SentenceDetail, SentimentLabel};

/// Default cap on merged review topics.
pub const DEFAULT_TOPIC_LIMIT: usize = 5;

/// Review label and score from sentence labels.
///
/// Neutral sentences do not count. With no positive or negative sentence the
/// review is neutral at `0.0`. Otherwise the positive share decides: `0.4..=0.6`
/// is mixed (both ends inclusive), above is positive, below is negative. The
/// score is `(pos - neg) / (pos + neg)`.
#[must_use]
pub fn aggregate_sentiment(labels: &[SentimentLabel]) -> (ReviewLabel, f64) {
    let pos = labels
        .iter()
        .filter(|l| **l == SentimentLabel::Positive)
        .count();
    let neg = labels
        .iter()
        .filter(|l| **l == SentimentLabel::Negative)
        .count();
    let total = pos + neg;
    if total == 0 {
        return (ReviewLabel::Neutral, 0.0);
    }

    #[allow(clippy::cast_precision_loss)]
    let (pos, neg, total) = (pos as f64, neg as f64, total as f64);
    let pos_ratio = pos / total;
    let label = if (0.4..=0.6).contains(&pos_ratio) {
        ReviewLabel::Mixed
    } else if pos_ratio > 0.6 {
        ReviewLabel::Positive
    } else {
        ReviewLabel::Negative
    };
    (label, (pos - neg) / total)
}

/// Merge per-sentence topics into at most `limit` unique topics.
///
/// Walks sentences in order and topics within each in order, keeping first
/// occurrences. Stops as soon as `limit` topics are collected.
#[must_use]
pub fn merge_topics<S: AsRef<str>>(topics: &[Vec<S>], limit: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    'sentences: for sentence_topics in topics {
        for topic in sentence_topics {
            if merged.len() >= limit {
                break 'sentences;
            }
            let topic = topic.as_ref();
            if !topic.is_empty() && seen.insert(topic) {
                merged.push(topic.to_string());
            }
        }
    }
    merged
}

/// Zip sentences with their sentiment and topics into owned detail entries.
#[must_use]
pub fn build_details(
    sentences: &[String],
    sentiments: &[SentimentLabel],
    topics: &[Vec<String>],
) -> Vec<SentenceDetail> {
    sentences
        .iter()
        .zip(sentiments)
        .zip(topics)
        .map(|((sentence, sentiment), topic_list)| SentenceDetail {
            sentence: sentence.clone(),
            sentiment: *sentiment,
            topics: topic_list.clone(),
        })
        .collect()
}

/// Aggregate one review from its sentence details.
#[must_use]
pub fn aggregate_review(details: Vec<SentenceDetail>, topic_limit: usize) -> ReviewAggregate {
    let labels: Vec<SentimentLabel> = details.iter().map(|d| d.sentiment).collect();
    let (sentiment_label, sentiment_score) = aggregate_sentiment(&labels);
    let per_sentence: Vec<Vec<String>> = details.iter().map(|d| d.topics.clone()).collect();
    let topics = merge_topics(&per_sentence, topic_limit);

    ReviewAggregate {
        sentiment_label,
        sentiment_score,
        topics,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use SentimentLabel::{Negative as N, Neutral as U, Positive as P};

    fn labels(pos: usize, neg: usize, neu: usize) -> Vec<SentimentLabel> {
        let mut v = vec![P; pos];
        v.extend(vec![N; neg]);
        v.extend(vec![U; neu]);
        v
    }

    #[test]
    fn empty_is_neutral_zero() {
        assert_eq!(aggregate_sentiment(&[]), (ReviewLabel::Neutral, 0.0));
    }

    #[test]
    fn all_neutral_is_neutral_zero() {
        assert_eq!(aggregate_sentiment(&[U, U, U]), (ReviewLabel::Neutral, 0.0));
    }

    #[test]
    fn two_positive_two_negative_is_mixed_zero() {
        let (label, score) = aggregate_sentiment(&[P, N, P, N]);
        assert_eq!(label, ReviewLabel::Mixed);
        assert!(score.abs() < 1e-9);
    }

    #[test]
    fn ratio_boundaries_are_mixed() {
        // 2 / 5 = 0.4
        assert_eq!(aggregate_sentiment(&labels(2, 3, 0)).0, ReviewLabel::Mixed);
        // 3 / 5 = 0.6
        assert_eq!(aggregate_sentiment(&labels(3, 2, 0)).0, ReviewLabel::Mixed);
    }

    #[test]
    fn thresholds_and_score_over_grid() {
        for pos in 0..8 {
            for neg in 0..8 {
                let total = pos + neg;
                if total == 0 {
                    continue;
                }
                let (label, score) = aggregate_sentiment(&labels(pos, neg, 3));
                #[allow(clippy::cast_precision_loss)]
                let ratio = pos as f64 / total as f64;
                let expected = if (0.4..=0.6).contains(&ratio) {
                    ReviewLabel::Mixed
                } else if ratio > 0.6 {
                    ReviewLabel::Positive
                } else {
                    ReviewLabel::Negative
                };
                assert_eq!(label, expected, "pos={pos} neg={neg}");
                #[allow(clippy::cast_precision_loss)]
                let want = (pos as f64 - neg as f64) / total as f64;
                assert!((score - want).abs() < 1e-12, "pos={pos} neg={neg}");
                assert!((-1.0..=1.0).contains(&score));
            }
        }
    }

    #[test]
    fn neutral_sentences_do_not_dilute_score() {
        let (label, score) = aggregate_sentiment(&labels(1, 0, 5));
        assert_eq!(label, ReviewLabel::Positive);
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn merge_keeps_first_seen_order_and_limit() {
        let topics = vec![vec!["a", "b"], vec!["b", "c"]];
        assert_eq!(merge_topics(&topics, 2), vec!["a", "b"]);
    }

    #[test]
    fn merge_dedupes_and_stops_at_limit() {
        let topics = vec![vec!["ui", "bugs"], vec!["bugs", "chat issues"], vec!["latency"]];
        assert_eq!(merge_topics(&topics, 2), vec!["ui", "bugs"]);
        assert_eq!(
            merge_topics(&topics, 5),
            vec!["ui", "bugs", "chat issues", "latency"]
        );
    }

    #[test]
    fn merge_skips_empty_topics() {
        let topics = vec![vec!["", "a"], vec![""], vec!["b"]];
        assert_eq!(merge_topics(&topics, 5), vec!["a", "b"]);
    }

    #[test]
    fn merge_is_idempotent_on_its_output() {
        let topics = vec![vec!["x", "y", "z"], vec!["y", "w", "v", "u"]];
        let once = merge_topics(&topics, 4);
        let twice = merge_topics(&[once.clone()], 4);
        assert_eq!(once, twice);
        assert!(once.len() <= 4);
    }

    #[test]
    fn build_details_keeps_topics() {
        let details = build_details(
            &["I love it".to_string(), "It crashes".to_string()],
            &[P, N],
            &[vec!["design".to_string()], vec!["bugs".to_string()]],
        );
        assert_eq!(details[0].topics, vec!["design"]);
        assert_eq!(details[1].sentiment, N);
    }

    #[test]
    fn aggregate_review_copies_details() {
        let mut details = build_details(
            &["a".to_string(), "b".to_string()],
            &[P, P],
            &[vec!["t1".to_string()], vec!["t2".to_string()]],
        );
        let aggregate = aggregate_review(details.clone(), DEFAULT_TOPIC_LIMIT);
        details[0].sentiment = N;
        assert_eq!(aggregate.details[0].sentiment, P);
        assert_eq!(aggregate.sentiment_label, ReviewLabel::Positive);
        assert_eq!(aggregate.topics, vec!["t1", "t2"]);
    }
}
