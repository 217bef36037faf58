// Language Detection Service
// Cheap cascade: script check -> optional statistical identifier -> ASCII ratio

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

pub const DEFAULT_LANGUAGE: &str = "en";
/// Arabic-script text is treated as Urdu in this project.
pub const ARABIC_SCRIPT_LANGUAGE: &str = "ur";
const ASCII_RATIO_THRESHOLD: f64 = 0.8;

/// Pluggable statistical language identifier.
///
/// `Err` (or an empty tag) means the identifier could not decide; the
/// detector then falls back to the ASCII-ratio rule.
pub trait LanguageIdentifier: Send + Sync {
    fn identify(&self, text: &str) -> Result<String, String>;
}

pub struct LanguageDetector {
    identifier: Option<Box<dyn LanguageIdentifier>>,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector {
    /// Detector without a statistical stage.
    pub fn new() -> Self {
        Self { identifier: None }
    }

    pub fn with_identifier(identifier: Box<dyn LanguageIdentifier>) -> Self {
        Self {
            identifier: Some(identifier),
        }
    }

    /// Detect the language of an already-normalized text. Never fails.
    pub fn detect(&self, text: &str) -> String {
        if text.is_empty() {
            return DEFAULT_LANGUAGE.to_string();
        }
        if contains_arabic_script(text) {
            return ARABIC_SCRIPT_LANGUAGE.to_string();
        }
        if let Some(identifier) = &self.identifier {
            match identifier.identify(text) {
                Ok(tag) if !tag.trim().is_empty() => return primary_subtag(&tag),
                Ok(_) => debug!("[LANG] identifier returned empty tag, using ASCII ratio"),
                Err(e) => debug!("[LANG] identifier undecided ({}), using ASCII ratio", e),
            }
        }
        ascii_ratio_language(text).to_string()
    }

    pub fn detect_batch(&self, texts: &[String]) -> Vec<String> {
        texts.iter().map(|t| self.detect(t)).collect()
    }
}

pub fn contains_arabic_script(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

fn ascii_ratio_language(text: &str) -> &'static str {
    let total = text.chars().count().max(1);
    let ascii = text.chars().filter(|c| c.is_ascii()).count();
    if ascii as f64 / total as f64 > ASCII_RATIO_THRESHOLD {
        DEFAULT_LANGUAGE
    } else {
        ARABIC_SCRIPT_LANGUAGE
    }
}

/// Lower-case a language tag and keep its primary subtag ("ur-PK" -> "ur").
pub fn primary_subtag(tag: &str) -> String {
    let lower = tag.trim().to_ascii_lowercase();
    lower
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .to_string()
}

// ============ Built-in Function-word Identifier ============

const MIN_HIT_RATIO: f64 = 0.2;

const STOPWORDS: &[(&str, &[&str])] = &[
    ("en", &["the", "and", "is", "are", "i", "you", "this", "that", "it", "to", "of", "was", "not", "my", "so", "with", "for", "a"]),
    ("es", &["el", "la", "los", "las", "que", "es", "y", "de", "en", "no", "muy", "pero", "por", "con", "una"]),
    ("fr", &["le", "la", "les", "et", "est", "je", "tu", "pas", "une", "des", "du", "que", "pour", "très", "c'est"]),
    ("de", &["der", "die", "das", "und", "ist", "nicht", "ich", "du", "ein", "eine", "zu", "mit", "sehr", "aber"]),
    ("it", &["il", "lo", "gli", "che", "è", "non", "sono", "una", "per", "con", "molto", "ma", "della"]),
    ("pt", &["o", "os", "que", "é", "não", "um", "uma", "para", "com", "muito", "mas", "eu", "você"]),
    ("ur", &["hai", "hain", "ka", "ki", "ke", "nahi", "nahin", "mein", "aur", "ko", "se", "bhi", "yeh", "woh", "kya", "tha", "bohat", "bahut"]),
];

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{L}']+").expect("word regex"))
}

/// Function-word frequency identifier for a handful of Latin-script languages.
pub struct StopwordIdentifier {
    lexicon: HashMap<&'static str, Vec<&'static str>>,
}

impl Default for StopwordIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StopwordIdentifier {
    pub fn new() -> Self {
        let mut lexicon: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for (lang, words) in STOPWORDS {
            for word in *words {
                lexicon.entry(*word).or_default().push(*lang);
            }
        }
        Self { lexicon }
    }
}

impl LanguageIdentifier for StopwordIdentifier {
    fn identify(&self, text: &str) -> Result<String, String> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = word_re().find_iter(&lowered).map(|m| m.as_str()).collect();
        if words.is_empty() {
            return Err("no words".to_string());
        }

        let mut hits: HashMap<&str, usize> = HashMap::new();
        for word in &words {
            if let Some(langs) = self.lexicon.get(*word) {
                for lang in langs {
                    *hits.entry(*lang).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(&str, usize)> = hits.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        match ranked.as_slice() {
            [] => Err("no function words".to_string()),
            [(_, top), (_, second), ..] if top == second => Err("ambiguous".to_string()),
            [(lang, top), ..] => {
                if (*top as f64) / (words.len() as f64) < MIN_HIT_RATIO {
                    Err("too few function words".to_string())
                } else {
                    Ok((*lang).to_string())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedIdentifier(Result<String, String>);

    impl LanguageIdentifier for FixedIdentifier {
        fn identify(&self, _text: &str) -> Result<String, String> {
            self.0.clone()
        }
    }

    #[test]
    fn test_empty_defaults_to_english() {
        assert_eq!(LanguageDetector::new().detect(""), "en");
        let failing = LanguageDetector::with_identifier(Box::new(FixedIdentifier(Err("boom".into()))));
        assert_eq!(failing.detect(""), "en");
    }

    #[test]
    fn test_arabic_script_is_urdu() {
        let detector = LanguageDetector::with_identifier(Box::new(FixedIdentifier(Ok("fr".into()))));
        assert_eq!(detector.detect("یہ بہت اچھا ہے"), "ur");
        assert_eq!(detector.detect("mostly latin text with one ب"), "ur");
        assert_eq!(LanguageDetector::new().detect("great day ہے"), "ur");
    }

    #[test]
    fn test_ascii_ratio_fallback() {
        let detector = LanguageDetector::new();
        assert_eq!(detector.detect("I love this!"), "en");
        assert_eq!(detector.detect("Привет мир"), "ur");
        assert_eq!(detector.detect("naïve approach"), "en");
    }

    #[test]
    fn test_identifier_result_is_used() {
        let detector = LanguageDetector::with_identifier(Box::new(FixedIdentifier(Ok("pt-BR".into()))));
        assert_eq!(detector.detect("qualquer coisa"), "pt");
    }

    #[test]
    fn test_identifier_failure_falls_back_to_ascii_ratio() {
        let detector = LanguageDetector::with_identifier(Box::new(FixedIdentifier(Err("boom".into()))));
        assert_eq!(detector.detect("plain ascii words"), "en");
        assert_eq!(detector.detect("Привет мир"), "ur");

        let empty = LanguageDetector::with_identifier(Box::new(FixedIdentifier(Ok("  ".into()))));
        assert_eq!(empty.detect("Привет мир"), "ur");
    }

    #[test]
    fn test_detect_is_total() {
        let detector = LanguageDetector::with_identifier(Box::new(StopwordIdentifier::new()));
        for text in ["", " ", "?!", "12345", "🙂🙂", "a", "ب"] {
            assert!(!detector.detect(text).is_empty());
        }
    }

    #[test]
    fn test_primary_subtag() {
        assert_eq!(primary_subtag("ur-PK"), "ur");
        assert_eq!(primary_subtag("EN"), "en");
        assert_eq!(primary_subtag("zh_CN"), "zh");
    }

    #[test]
    fn test_stopword_identifier() {
        let identifier = StopwordIdentifier::new();
        assert_eq!(identifier.identify("I love this and it is great").unwrap(), "en");
        assert_eq!(identifier.identify("yeh bohat acha hai").unwrap(), "ur");
        assert_eq!(identifier.identify("der Hund ist nicht hier").unwrap(), "de");
        assert!(identifier.identify("xyzzy plugh").is_err());
        assert!(identifier.identify("").is_err());
    }
}
