use revlens_core::{ReviewLabel, TopicSettings};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::inference::InferenceClient;

fn review(id: &str, country: &str, text: &str) -> Review {
    Review {
        id: id.to_string(),
        app_name: "yubo".to_string(),
        country: country.to_string(),
        language: None,
        cleaned_content: text.to_string(),
        content: None,
        rating: Some(3),
        review_date: None,
    }
}

fn offline_context() -> PipelineContext {
    PipelineContext::new(
        LanguageResolver::default(),
        SentimentStrategy::Fallback,
        TopicExtractor::new(TopicStrategy::Fallback, TopicSettings::default()),
    )
}

// -----------------------------------------------------------------------
// end to end, fallback models
// -----------------------------------------------------------------------

#[tokio::test]
async fn italian_review_resolves_and_is_annotated() {
    let rows = vec![review("1", "it", "Adoro l'app ma si blocca")];
    let mut ctx = offline_context();
    let output = annotate(&rows, &mut ctx).await.unwrap();

    assert_eq!(output.reviews.len(), 1);
    let annotated = &output.reviews[0];
    assert_eq!(annotated.detected_language, "it");
    assert_eq!(annotated.resolved_language, "it");
    assert!(!annotated.aggregate.details.is_empty());
    for detail in &annotated.aggregate.details {
        assert!(matches!(
            detail.sentiment,
            SentimentLabel::Positive | SentimentLabel::Neutral | SentimentLabel::Negative
        ));
    }
    assert!(ctx.segmenters().is_loaded("it"));

    assert_eq!(output.notebook.len(), 1);
    assert!(
        output.notebook[0]
            .summary
            .starts_with("In IT, a Yubo user wrote in italian."),
        "{}",
        output.notebook[0].summary
    );
}

#[tokio::test]
async fn two_positive_two_negative_sentences_aggregate_to_mixed() {
    let rows = vec![review(
        "1",
        "us",
        "I love the design. The chat is bad. Great filters. Terrible lag.",
    )];
    let mut ctx = offline_context();
    let output = annotate(&rows, &mut ctx).await.unwrap();

    let aggregate = &output.reviews[0].aggregate;
    assert_eq!(aggregate.details.len(), 4);
    assert_eq!(aggregate.sentiment_label, ReviewLabel::Mixed);
    assert!(aggregate.sentiment_score.abs() < 1e-12);
    assert_eq!(output.notebook[0].sentiment_label, ReviewLabel::Mixed);
    assert!(output.notebook[0].summary.contains("[POS]; "));
    assert!(output.notebook[0].summary.contains("[NEG]."));
}

#[tokio::test]
async fn blank_reviews_are_dropped_and_order_is_kept() {
    let rows = vec![
        review("a", "us", "Good stuff."),
        review("b", "us", "   "),
        review("c", "fr", "Bad update."),
    ];
    let mut ctx = offline_context();
    let output = annotate(&rows, &mut ctx).await.unwrap();

    let ids: Vec<&str> = output.reviews.iter().map(|r| r.review.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    let notebook_ids: Vec<&str> = output.notebook.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(notebook_ids, vec!["a", "c"]);
}

#[tokio::test]
async fn topic_summary_is_built_from_reviews() {
    let rows = vec![
        review("1", "us", "Chat freezes."),
        review("2", "us", "Chat freezes again."),
    ];
    let mut ctx = offline_context();
    let output = annotate(&rows, &mut ctx).await.unwrap();

    let chat = output
        .topic_summary
        .iter()
        .find(|row| row.topic == "chat")
        .unwrap();
    assert_eq!(chat.review_count, 2);
    assert_eq!(chat.app_name, "yubo");
    assert_eq!(chat.country, "us");
}

#[tokio::test]
async fn review_topics_respect_limit() {
    let rows = vec![review(
        "1",
        "us",
        "Login screen freezes. Payment page crashes. Profile photos vanish.",
    )];
    let mut ctx = offline_context().with_topic_limit(2);
    let output = annotate(&rows, &mut ctx).await.unwrap();
    assert_eq!(output.reviews[0].aggregate.topics, vec!["login", "screen"]);
}

// -----------------------------------------------------------------------
// pre-detected languages and input validation
// -----------------------------------------------------------------------

#[tokio::test]
async fn annotate_detected_resolves_given_codes() {
    let rows = vec![review("1", "se", "Appen är bra.")];
    let mut ctx = offline_context();
    let output = annotate_detected(&rows, &["se".to_string()], &mut ctx)
        .await
        .unwrap();
    assert_eq!(output.reviews[0].detected_language, "se");
    assert_eq!(output.reviews[0].resolved_language, "sv");
    assert_eq!(output.notebook[0].language, "sv");
}

#[tokio::test]
async fn empty_rows_are_rejected() {
    let mut ctx = offline_context();
    let err = annotate(&[], &mut ctx).await.unwrap_err();
    assert!(matches!(err, AnnotateError::EmptyInput(_)), "got: {err:?}");
}

#[tokio::test]
async fn misaligned_languages_are_rejected() {
    let rows = vec![review("1", "us", "fine"), review("2", "us", "fine")];
    let mut ctx = offline_context();
    let err = annotate_detected(&rows, &["en".to_string()], &mut ctx)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            AnnotateError::LanguageCountMismatch {
                rows: 2,
                languages: 1
            }
        ),
        "got: {err:?}"
    );
}

// -----------------------------------------------------------------------
// learned sentiment
// -----------------------------------------------------------------------

#[tokio::test]
async fn failed_sentiment_batch_leaves_sentences_out_of_details() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_string_contains("Great filters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
            {"label": "negative", "score": 0.05},
            {"label": "neutral", "score": 0.1},
            {"label": "positive", "score": 0.85}
        ]])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = InferenceClient::new(&server.uri(), 5).unwrap();
    let mut ctx = PipelineContext::new(
        LanguageResolver::default(),
        SentimentStrategy::Learned(client),
        TopicExtractor::new(TopicStrategy::Fallback, TopicSettings::default()),
    )
    .with_batch_size(1);

    let rows = vec![review("1", "us", "Great filters. It lags.")];
    let output = annotate(&rows, &mut ctx).await.unwrap();

    let aggregate = &output.reviews[0].aggregate;
    assert_eq!(aggregate.details.len(), 1);
    assert_eq!(aggregate.details[0].sentence, "Great filters.");
    assert_eq!(aggregate.sentiment_label, ReviewLabel::Positive);
    assert!((aggregate.sentiment_score - 1.0).abs() < 1e-12);
}

#[tokio::test]
async fn from_config_without_urls_uses_fallbacks() {
    let config = AppConfig {
        output_dir: PathBuf::from("./out"),
        log_level: "info".to_string(),
        sentiment_url: None,
        embed_url: None,
        inference_timeout_secs: 1,
        sentiment_batch_size: 8,
        topics: TopicSettings::default(),
        review_topic_limit: 3,
        country_map_path: None,
        segmenter_dir: None,
    };
    let ctx = PipelineContext::from_config(&config).await.unwrap();
    assert!(!ctx.sentiment().is_learned());
    assert!(!ctx.topics().strategy().is_learned());
    assert_eq!(ctx.resolver().resolve("se"), "sv");
}

#[tokio::test]
async fn from_config_reports_missing_country_map() {
    let config = AppConfig {
        output_dir: PathBuf::from("./out"),
        log_level: "info".to_string(),
        sentiment_url: None,
        embed_url: None,
        inference_timeout_secs: 1,
        sentiment_batch_size: 8,
        topics: TopicSettings::default(),
        review_topic_limit: 3,
        country_map_path: Some(PathBuf::from("/nonexistent/revlens/countries.yaml")),
        segmenter_dir: None,
    };
    let err = PipelineContext::from_config(&config).await.unwrap_err();
    assert!(matches!(err, AnnotateError::Config(_)), "got: {err:?}");
}
