// Text Processing Service
// Tweet cleaning and token budgeting ahead of model calls

use regex::Regex;
use std::sync::OnceLock;

fn noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // URLs anywhere; @mentions and #hashtags only at the start of a token.
    // Each match runs to the next whitespace.
    RE.get_or_init(|| Regex::new(r"(?i)http\S*|www\S*|(?:^|\s)[@#]\S*").expect("noise regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+|[^\w\s]").expect("token regex"))
}

/// Clean a tweet: drop URLs, mentions and hashtags, collapse whitespace.
pub fn normalize_tweet(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let s = text.replace('\n', " ");
    let s = noise_re().replace_all(&s, " ");
    let s = whitespace_re().replace_all(&s, " ");
    s.trim().to_string()
}

/// Cut `text` after its `max_tokens`-th word-level token.
pub fn clip_to_token_budget(text: &str, max_tokens: usize) -> &str {
    if max_tokens == 0 {
        return "";
    }
    match token_re().find_iter(text).nth(max_tokens - 1) {
        Some(last) => &text[..last.end()],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_url() {
        assert_eq!(normalize_tweet("I love this! http://x.co"), "I love this!");
        assert_eq!(normalize_tweet("see www.example.com now"), "see now");
        assert_eq!(normalize_tweet("https://t.co/abc"), "");
    }

    #[test]
    fn test_normalize_strips_mentions_and_hashtags() {
        assert_eq!(
            normalize_tweet("@user thanks  for\nthe #help #rust"),
            "thanks for the"
        );
        assert_eq!(normalize_tweet("lone @ and # marks"), "lone and marks");
        assert_eq!(normalize_tweet("@a @b #c done"), "done");
    }

    #[test]
    fn test_normalize_keeps_mid_word_at_and_hash() {
        assert_eq!(
            normalize_tweet("mail me at bob@example.com please"),
            "mail me at bob@example.com please"
        );
        assert_eq!(normalize_tweet("C# rocks"), "C# rocks");
        assert_eq!(normalize_tweet("learn C# with @mentor"), "learn C# with");
    }

    #[test]
    fn test_normalize_empty_and_whitespace() {
        assert_eq!(normalize_tweet(""), "");
        assert_eq!(normalize_tweet("   \n\t  "), "");
        assert_eq!(normalize_tweet("  a \t b\n\nc  "), "a b c");
    }

    #[test]
    fn test_normalize_is_idempotent_and_clean() {
        let samples = [
            "RT @someone: check http://a.b/c?d=e #wow www.site.org",
            "نہایت اچھا دن ہے #پاکستان @dost",
            "wwhttpx end",
            "a@b#c http",
            "x@http://y C# #tag",
            "\n\n  mixed\tcase HTTPS://X.Y WWW.Z.com ok ",
        ];
        for sample in samples {
            let once = normalize_tweet(sample);
            assert_eq!(normalize_tweet(&once), once, "not idempotent for {:?}", sample);
            assert!(!once.to_lowercase().contains("http"));
            assert!(!once.to_lowercase().contains("www"));
            assert!(!once.contains("  "));
            for token in once.split_whitespace() {
                assert!(!token.starts_with('@') && !token.starts_with('#'));
            }
        }
    }

    #[test]
    fn test_normalize_keeps_arabic_script() {
        assert_eq!(normalize_tweet("یہ بہت اچھا ہے"), "یہ بہت اچھا ہے");
    }

    #[test]
    fn test_clip_to_token_budget() {
        assert_eq!(clip_to_token_budget("one two three four", 2), "one two");
        assert_eq!(clip_to_token_budget("short", 10), "short");
        assert_eq!(clip_to_token_budget("anything", 0), "");
        assert_eq!(clip_to_token_budget("wow! great", 2), "wow!");
    }
}
