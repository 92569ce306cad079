//! Per-language stopword sets used by topic extraction.

use std::collections::HashSet;

/// Words that say nothing about what an app review discusses.
pub const DOMAIN_STOPWORDS: &[&str] = &["ui", "ux", "app", "apps", "application", "game"];

const EN: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "done", "down", "during",
    "each", "even", "ever", "every", "few", "for", "from", "further", "get", "gets", "got", "had",
    "has", "have", "having", "he", "her", "here", "hers", "herself", "him", "himself", "his",
    "how", "however", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "keep",
    "keeps", "least", "less", "made", "make", "many", "may", "me", "might", "more", "most",
    "much", "must", "my", "myself", "never", "no", "nor", "not", "now", "of", "off", "often",
    "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "please", "quite", "rather", "really", "same", "say", "see", "she", "should", "so", "some",
    "still", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "though", "through", "to", "too", "under", "until",
    "up", "us", "used", "using", "very", "was", "we", "well", "were", "what", "whatever", "when",
    "where", "whether", "which", "while", "who", "whole", "whom", "why", "will", "with", "within",
    "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

const FR: &[&str] = &[
    "a", "ai", "au", "aux", "avec", "avoir", "bien", "c", "ce", "ceci", "cela", "ces", "cet",
    "cette", "d", "dans", "de", "des", "donc", "du", "elle", "elles", "en", "encore", "est", "et",
    "été", "être", "eu", "fait", "faire", "il", "ils", "j", "je", "l", "la", "le", "les", "leur",
    "leurs", "lui", "m", "ma", "mais", "me", "mes", "moi", "mon", "même", "n", "ne", "nos",
    "notre", "nous", "on", "ont", "ou", "où", "par", "pas", "peu", "plus", "pour", "qu", "que",
    "qui", "s", "sa", "sans", "se", "ses", "si", "son", "sont", "sur", "t", "ta", "te", "tes",
    "toi", "ton", "tous", "tout", "toute", "toutes", "très", "tu", "un", "une", "vos", "votre",
    "vous", "y",
];

const DE: &[&str] = &[
    "aber", "alle", "allem", "als", "also", "am", "an", "auch", "auf", "aus", "bei", "bin",
    "bis", "bist", "da", "damit", "dann", "das", "dass", "dem", "den", "denn", "der", "des",
    "dich", "die", "dir", "doch", "du", "durch", "ein", "eine", "einem", "einen", "einer",
    "eines", "er", "es", "etwas", "euch", "für", "gibt", "hab", "habe", "haben", "hat", "hatte",
    "ich", "ihr", "ihre", "im", "immer", "in", "ist", "ja", "jetzt", "kann", "kein", "keine",
    "man", "mehr", "mich", "mir", "mit", "muss", "nach", "nicht", "nichts", "noch", "nun", "nur",
    "ob", "oder", "ohne", "schon", "sehr", "sein", "sich", "sie", "sind", "so", "um", "und",
    "uns", "unser", "viel", "vom", "von", "vor", "war", "was", "weil", "wenn", "wie", "wieder",
    "wir", "wird", "wo", "zu", "zum", "zur",
];

const IT: &[&str] = &[
    "a", "ad", "ai", "al", "alla", "alle", "anche", "ancora", "avere", "c", "che", "chi", "ci",
    "come", "con", "cosa", "da", "dal", "dalla", "dei", "del", "della", "delle", "di", "dopo",
    "e", "è", "ed", "essere", "gli", "ha", "hanno", "ho", "i", "il", "in", "io", "l", "la", "le",
    "lei", "lo", "loro", "lui", "ma", "mi", "mia", "mio", "molto", "ne", "nei", "nel", "nella",
    "no", "noi", "non", "o", "per", "perché", "più", "poi", "quando", "quella", "quello",
    "questa", "questo", "qui", "se", "si", "sia", "sono", "su", "sua", "suo", "sul", "sulla",
    "ti", "tra", "tu", "tutto", "un", "una", "uno", "volta", "volte",
];

const ES: &[&str] = &[
    "a", "al", "algo", "algunos", "ante", "con", "cuando", "de", "del", "desde", "donde", "el",
    "él", "ella", "ellos", "en", "entre", "era", "es", "esa", "ese", "eso", "esta", "está",
    "estaba", "están", "este", "esto", "fue", "ha", "hace", "hay", "la", "las", "le", "les", "lo",
    "los", "más", "me", "mi", "mis", "mucho", "muy", "nada", "ni", "no", "nos", "o", "para",
    "pero", "poco", "por", "porque", "que", "qué", "se", "sea", "ser", "si", "sí", "sin",
    "sobre", "solo", "son", "su", "sus", "también", "te", "tiene", "todo", "tu", "un", "una",
    "uno", "y", "ya", "yo",
];

const SV: &[&str] = &[
    "alla", "allt", "att", "av", "blev", "bli", "blir", "de", "dem", "den", "denna", "det",
    "detta", "dig", "din", "du", "där", "efter", "ej", "eller", "en", "er", "ett", "från", "för",
    "ha", "hade", "han", "har", "hon", "hur", "i", "inte", "jag", "kan", "man", "med", "men",
    "mig", "min", "mot", "mycket", "ni", "nu", "när", "och", "om", "oss", "på", "sedan", "sig",
    "sin", "som", "så", "till", "under", "upp", "ut", "var", "vad", "vi", "vid", "är", "än",
];

fn base_stopwords(language: &str) -> &'static [&'static str] {
    match language {
        "en" => EN,
        "fr" => FR,
        "de" => DE,
        "it" => IT,
        "es" => ES,
        "sv" => SV,
        _ => &[],
    }
}

/// Base stopwords for `language` plus [`DOMAIN_STOPWORDS`].
///
/// Languages without a base list get only the domain words.
#[must_use]
pub fn stopwords_for(language: &str) -> HashSet<&'static str> {
    let language = language.trim().to_lowercase();
    let language = if language.is_empty() { "en" } else { language.as_str() };
    base_stopwords(language)
        .iter()
        .chain(DOMAIN_STOPWORDS)
        .copied()
        .collect()
}
