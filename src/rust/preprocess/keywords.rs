use std::collections::{HashMap, HashSet};
use std::fmt;

use lazy_static::lazy_static;

/// Default number of keywords kept per product.
pub const DEFAULT_MAX_KEYWORDS: usize = 15;

/// Default minimum token length. Shorter tokens are dropped.
pub const DEFAULT_MIN_TOKEN_LEN: usize = 2;

/// Symbols that mark a token as noise.
const NOISE_SYMBOLS: &[char] = &['@', '*', '/', '±', '&', '%', '#'];

lazy_static! {
    /// English function words that carry no product signal.
    static ref STOPWORDS: HashSet<&'static str> = {
        let words = [
            "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
            "by", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
            "does", "did", "will", "would", "could", "should", "may", "might", "must", "can",
            "this", "that", "these", "those", "i", "you", "he", "she", "it", "we", "they", "me",
            "him", "her", "us", "them",
        ];
        words.into_iter().collect()
    };
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

fn looks_like_noise(token: &str) -> bool {
    token.chars().any(|c| NOISE_SYMBOLS.contains(&c))
}

/// Keywords ordered by descending frequency, ties in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordList(Vec<String>);

impl KeywordList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.0.iter().any(|k| k == keyword)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for KeywordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Reduces normalized text to its most frequent meaningful words.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    max_keywords: usize,
    min_token_len: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            max_keywords: DEFAULT_MAX_KEYWORDS,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
        }
    }
}

impl KeywordExtractor {
    pub fn new(max_keywords: usize, min_token_len: usize) -> Self {
        Self { max_keywords, min_token_len }
    }

    pub fn max_keywords(&self) -> usize {
        self.max_keywords
    }

    pub fn min_token_len(&self) -> usize {
        self.min_token_len
    }

    /// Splits lowercased text into maximal runs of letters.
    ///
    /// Runs holding any non-ASCII letter are dropped whole, so `café` yields nothing
    /// rather than `caf`.
    pub fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphabetic())
            .filter(|token| !token.is_empty() && token.is_ascii())
            .map(str::to_string)
            .collect()
    }

    fn keep(&self, token: &str) -> bool {
        token.len() >= self.min_token_len && !is_stopword(token) && !looks_like_noise(token)
    }

    /// Extracts at most `max_keywords` keywords from `text`.
    ///
    /// # Example
    /// ```
    /// use prodclass::KeywordExtractor;
    ///
    /// let keywords = KeywordExtractor::default().extract("the watch is a steel watch");
    /// assert_eq!(keywords.as_slice(), ["watch", "steel"]);
    /// ```
    pub fn extract(&self, text: &str) -> KeywordList {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();

        for token in Self::tokenize(text) {
            if !self.keep(&token) {
                continue;
            }
            let count = counts.entry(token.clone()).or_insert(0);
            if *count == 0 {
                first_seen.push(token);
            }
            *count += 1;
        }

        // Stable sort keeps first-seen order among equal counts.
        first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
        first_seen.truncate(self.max_keywords);
        KeywordList(first_seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_on_letters_only() {
        assert_eq!(
            KeywordExtractor::tokenize("USB3.0 cable_2m, 10x-Zoom!"),
            vec!["usb", "cable", "m", "x", "zoom"]
        );
    }

    #[test]
    fn test_accented_words_are_not_fragmented() {
        assert_eq!(
            KeywordExtractor::tokenize("Crème brûlée café, naïve-cotton 2kg"),
            vec!["cotton", "kg"]
        );
        let keywords = KeywordExtractor::default().extract("Crème brûlée café steel");
        assert_eq!(keywords.as_slice(), ["steel"]);
    }

    #[test]
    fn test_stopwords_and_short_tokens() {
        let keywords = KeywordExtractor::default().extract("a a a an an is is x x x y steel");
        assert_eq!(keywords.as_slice(), ["steel"]);
    }

    #[test]
    fn test_min_len_three() {
        let keywords = KeywordExtractor::new(15, 3).extract("tv tv tv remote");
        assert_eq!(keywords.as_slice(), ["remote"]);
    }

    #[test]
    fn test_frequency_then_first_seen() {
        let keywords =
            KeywordExtractor::default().extract("blue cotton shirt cotton blue cotton collar");
        assert_eq!(keywords.as_slice(), ["cotton", "blue", "shirt", "collar"]);
    }

    #[test]
    fn test_cap() {
        let keywords = KeywordExtractor::new(2, 2).extract("aa bb cc aa");
        assert_eq!(keywords.as_slice(), ["aa", "bb"]);
    }

    #[test]
    fn test_noise_symbols() {
        assert!(looks_like_noise("a/b"));
        assert!(looks_like_noise("50%"));
        assert!(!looks_like_noise("steel"));
    }

    #[test]
    fn test_empty() {
        let keywords = KeywordExtractor::default().extract("");
        assert!(keywords.is_empty());
        assert_eq!(keywords.to_string(), "");
    }

    #[test]
    fn test_display_joins() {
        let keywords = KeywordExtractor::default().extract("watch steel watch");
        assert_eq!(keywords.to_string(), "watch, steel");
    }
}
