use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn en() -> HashSet<&'static str> {
    stopwords_for("en")
}

fn settings(top_n: usize, diversity: f32) -> TopicSettings {
    TopicSettings {
        top_n,
        ngram_range: (1, 2),
        diversity,
    }
}

// -----------------------------------------------------------------------
// normalize_topic
// -----------------------------------------------------------------------

#[test]
fn normalize_strips_quotes_and_punctuation() {
    assert_eq!(
        normalize_topic("\"Chat-Issues\"", &en()).as_deref(),
        Some("chat issues")
    );
}

#[test]
fn normalize_removes_stopword_tokens() {
    assert_eq!(
        normalize_topic("the dark mode", &en()).as_deref(),
        Some("dark mode")
    );
}

#[test]
fn normalize_drops_all_stopword_phrase() {
    assert_eq!(normalize_topic("the app", &en()), None);
    assert_eq!(normalize_topic("!!", &en()), None);
}

// -----------------------------------------------------------------------
// fallback_topics
// -----------------------------------------------------------------------

#[test]
fn fallback_orders_by_frequency_then_first_seen() {
    let topics = fallback_topics("The chat chat is slow", &en(), (1, 2), 5);
    assert_eq!(topics, vec!["chat", "slow", "chat chat"]);
}

#[test]
fn fallback_caps_at_three() {
    let topics = fallback_topics("login screen freezes during payment", &en(), (1, 2), 5);
    assert_eq!(topics, vec!["login", "screen", "freezes"]);
}

#[test]
fn fallback_respects_smaller_top_n() {
    let topics = fallback_topics("login screen freezes", &en(), (1, 2), 1);
    assert_eq!(topics, vec!["login"]);
}

#[test]
fn fallback_skips_domain_stopwords() {
    let topics = fallback_topics("great app ui", &en(), (1, 1), 5);
    assert_eq!(topics, vec!["great"]);
}

#[test]
fn fallback_with_only_stopwords_is_empty() {
    assert!(fallback_topics("it is the app", &en(), (1, 2), 5).is_empty());
}

// -----------------------------------------------------------------------
// candidates and MMR
// -----------------------------------------------------------------------

#[test]
fn candidates_are_unique_and_skip_single_characters() {
    let c = candidate_phrases("chat x chat", &en(), (1, 2));
    assert_eq!(c, vec!["chat", "chat chat"]);
}

#[test]
fn mmr_without_diversity_ranks_by_relevance() {
    let doc = [1.0, 0.0];
    let cands = vec![vec![0.0, 1.0], vec![1.0, 0.1], vec![1.0, 0.0]];
    assert_eq!(mmr_select(&doc, &cands, 2, 0.0), vec![2, 1]);
}

#[test]
fn mmr_with_diversity_avoids_near_duplicates() {
    let doc = [1.0, 0.0, 0.0];
    let cands = vec![
        vec![1.0, 0.0, 0.0],
        vec![0.99, 0.01, 0.0],
        vec![0.5, 0.0, 0.5],
    ];
    assert_eq!(mmr_select(&doc, &cands, 2, 0.8), vec![0, 2]);
}

#[test]
fn mmr_handles_empty_and_zero() {
    assert!(mmr_select(&[1.0], &[], 3, 0.5).is_empty());
    assert!(mmr_select(&[1.0], &[vec![1.0]], 0, 0.5).is_empty());
}

// -----------------------------------------------------------------------
// TopicExtractor
// -----------------------------------------------------------------------

#[tokio::test]
async fn fallback_extractor_returns_empty_for_blank_sentence() {
    let extractor = TopicExtractor::new(TopicStrategy::Fallback, TopicSettings::default());
    assert!(extractor.extract("   ", "en").await.is_empty());
}

#[tokio::test]
async fn fallback_extractor_batches_align_with_input() {
    let extractor = TopicExtractor::new(TopicStrategy::Fallback, TopicSettings::default());
    let out = extractor
        .extract_batch(&["chat freezes", "", "la chat si blocca"], "it")
        .await;
    assert_eq!(out.len(), 3);
    assert!(out[1].is_empty());
    assert_eq!(out[2], vec!["chat", "blocca", "chat blocca"]);
}

#[tokio::test]
async fn learned_extractor_uses_embeddings() {
    let server = MockServer::start().await;
    // Inputs: sentence, then candidates in order:
    // chat, crashes, constantly, chat crashes, crashes constantly
    let body = serde_json::json!([
        [1.0, 0.0, 0.0],
        [0.9, 0.1, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.05, 0.0],
        [0.0, 0.7, 0.7]
    ]);
    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = InferenceClient::new(&server.uri(), 5).unwrap();
    let extractor = TopicExtractor::new(TopicStrategy::Learned(client), settings(2, 0.5));
    let topics = extractor.extract("Chat crashes constantly", "en").await;
    assert_eq!(topics, vec!["chat crashes", "constantly"]);
}

#[tokio::test]
async fn learned_extractor_falls_back_per_sentence_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = InferenceClient::new(&server.uri(), 5).unwrap();
    let extractor = TopicExtractor::new(TopicStrategy::Learned(client), settings(5, 0.5));
    let topics = extractor.extract("chat crashes constantly", "en").await;
    assert_eq!(topics, vec!["chat", "crashes", "constantly"]);
}

#[tokio::test]
async fn learned_extractor_skips_model_for_blank_sentence() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = InferenceClient::new(&server.uri(), 5).unwrap();
    let extractor = TopicExtractor::new(TopicStrategy::Learned(client), TopicSettings::default());
    assert!(extractor.extract(" \t", "en").await.is_empty());
}

#[tokio::test]
async fn probe_with_unhealthy_server_selects_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let strategy = TopicStrategy::probe(Some(&server.uri()), 5).await;
    assert!(!strategy.is_learned());
}

#[tokio::test]
async fn probe_with_healthy_server_selects_learned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let strategy = TopicStrategy::probe(Some(&server.uri()), 5).await;
    assert!(strategy.is_learned());
}
