use std::io::Write;

use super::*;

fn review(id: &str, text: &str) -> Review {
    Review {
        id: id.to_string(),
        app_name: "yubo".to_string(),
        country: "it".to_string(),
        language: None,
        cleaned_content: text.to_string(),
        content: None,
        rating: Some(4),
        review_date: None,
    }
}

fn registry_with(languages: &[&str]) -> SegmenterRegistry {
    let mut registry = SegmenterRegistry::new(None);
    registry.load_all(languages.iter().copied());
    registry
}

// -----------------------------------------------------------------------
// models
// -----------------------------------------------------------------------

#[test]
fn rules_model_splits_on_sentence_boundaries() {
    let model = SegmentationModel::load("en", None).unwrap();
    let sentences = model.sentences("I love the chat. It crashes daily! Why?");
    assert_eq!(sentences, vec!["I love the chat.", "It crashes daily!", "Why?"]);
}

#[test]
fn rules_model_keeps_abbreviations_inside_sentence() {
    let model = SegmentationModel::load("en", None).unwrap();
    let sentences = model.sentences("Dr. Smith built it. Works fine.");
    assert_eq!(sentences, vec!["Dr. Smith built it.", "Works fine."]);
}

#[test]
fn blank_model_splits_on_punctuation_only() {
    let sentences = SegmentationModel::Blank.sentences("ok. bad! why? trailing");
    assert_eq!(sentences, vec!["ok.", "bad!", "why?", "trailing"]);
}

#[test]
fn unknown_language_without_file_is_unavailable() {
    let err = SegmentationModel::load("nl", None).unwrap_err();
    assert!(matches!(err, AnnotateError::ModelUnavailable(_)), "got: {err:?}");
}

#[test]
fn abbreviation_file_extends_builtin_model() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("en.txt")).unwrap();
    writeln!(file, "# custom entries").unwrap();
    writeln!(file, "feat.").unwrap();
    drop(file);

    let model = SegmentationModel::load("en", Some(dir.path())).unwrap();
    let sentences = model.sentences("New feat. Dark mode is here. Thanks.");
    assert_eq!(sentences, vec!["New feat. Dark mode is here.", "Thanks."]);
}

#[test]
fn abbreviation_file_provides_model_for_new_language() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("nl.txt"), "bijv\n").unwrap();
    let model = SegmentationModel::load("nl", Some(dir.path())).unwrap();
    assert!(matches!(model, SegmentationModel::Rules { ref language, .. } if language == "nl"));
}

// -----------------------------------------------------------------------
// registry
// -----------------------------------------------------------------------

#[test]
fn registry_degrades_unavailable_language_to_blank() {
    let mut registry = SegmenterRegistry::new(None);
    assert_eq!(registry.load("nl"), &SegmentationModel::Blank);
    assert!(registry.is_loaded("nl"));
}

#[test]
fn registry_substitutes_english_for_unloaded_language() {
    let registry = registry_with(&["en"]);
    assert!(matches!(
        registry.model_for("pt"),
        SegmentationModel::Rules { language, .. } if language == "en"
    ));
}

#[test]
fn registry_without_english_falls_back_to_blank() {
    let registry = registry_with(&[]);
    assert_eq!(registry.model_for("pt"), &SegmentationModel::Blank);
}

#[test]
fn registry_unreadable_file_degrades_to_blank() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes the read fail.
    std::fs::create_dir(dir.path().join("it.txt")).unwrap();
    let mut registry = SegmenterRegistry::new(Some(dir.path().to_path_buf()));
    assert_eq!(registry.load("it"), &SegmentationModel::Blank);
}

// -----------------------------------------------------------------------
// segment
// -----------------------------------------------------------------------

#[test]
fn segment_assigns_indices_and_inherits_metadata() {
    let registry = registry_with(&["it"]);
    let sentences = segment(
        &review("1", "Adoro l'app. Ma si blocca."),
        "it",
        "it",
        &registry,
    );
    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[0].sentence_index, 0);
    assert_eq!(sentences[1].sentence_index, 1);
    assert_eq!(sentences[1].sentence, "Ma si blocca.");
    assert_eq!(sentences[1].review_id, "1");
    assert_eq!(sentences[1].country, "it");
    assert_eq!(sentences[1].resolved_language, "it");
    assert_eq!(sentences[1].rating, Some(4));
}

#[test]
fn segment_without_boundaries_keeps_whole_text() {
    let registry = registry_with(&["it"]);
    let sentences = segment(&review("1", "  Adoro l'app ma si blocca  "), "it", "it", &registry);
    assert_eq!(sentences.len(), 1);
    assert_eq!(sentences[0].sentence, "Adoro l'app ma si blocca");
}

#[test]
fn segment_blank_text_yields_nothing() {
    let registry = registry_with(&["en"]);
    assert!(segment(&review("1", " \n\t "), "en", "en", &registry).is_empty());
}

#[test]
fn segment_never_emits_whitespace_sentences() {
    let registry = registry_with(&["en"]);
    let text = "First.   \n\n  Second!  ...  third";
    let sentences = segment(&review("1", text), "en", "en", &registry);
    assert!(!sentences.is_empty());
    for s in &sentences {
        assert!(!s.sentence.trim().is_empty());
        assert_eq!(s.sentence, s.sentence.trim());
        assert!(text.contains(&s.sentence), "{:?} not in source", s.sentence);
    }
}

#[test]
fn split_sentences_flattens_in_review_order_and_drops_empty() {
    let registry = registry_with(&["en"]);
    let reviews = vec![
        review("1", "Great idea. Keeps crashing."),
        review("2", "   "),
        review("3", "Fine"),
    ];
    let detected = vec!["en".to_string(); 3];
    let resolved = vec!["en".to_string(); 3];
    let split = split_sentences(&reviews, &detected, &resolved, &registry);
    let ids: Vec<&str> = split.sentences.iter().map(|s| s.review_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "1", "3"]);
    assert_eq!(split.spans, vec![(0, 0..2), (2, 2..3)]);
}
