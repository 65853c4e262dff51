//! Id generation for pages that arrive without one.

use rand::Rng;
use rand::seq::SliceRandom;
use std::cell::Cell;

/// Supplies a fresh, slug-like token.
pub trait IdGenerator {
    fn generate(&self) -> String;
}

const ADJECTIVES: &[&str] = &[
    "amber", "ancient", "bold", "brave", "bright", "calm", "clever", "cold", "crisp", "curly",
    "dry", "eager", "early", "faint", "fancy", "fast", "gentle", "giant", "golden", "happy",
    "hollow", "humble", "icy", "jolly", "keen", "kind", "late", "lively", "loud", "lucky",
    "mellow", "misty", "modern", "narrow", "noble", "odd", "plain", "proud", "quick", "quiet",
    "rapid", "rare", "rough", "round", "rusty", "shiny", "silent", "silver", "slow", "small",
    "smooth", "soft", "spicy", "steep", "sunny", "swift", "tall", "tidy", "tiny", "warm",
    "wide", "wild", "wise", "young",
];

const NOUNS: &[&str] = &[
    "apple", "badge", "beach", "bird", "boat", "breeze", "brook", "cabin", "candle", "canyon",
    "cliff", "cloud", "comet", "coral", "crane", "creek", "dawn", "desert", "dune", "eagle",
    "ember", "falcon", "fern", "field", "flame", "forest", "fox", "garden", "glacier", "grove",
    "harbor", "hill", "island", "lake", "lantern", "leaf", "meadow", "moon", "moss", "night",
    "ocean", "otter", "owl", "pebble", "pine", "planet", "pond", "rain", "raven", "reef",
    "river", "rock", "sea", "shadow", "shore", "sky", "snow", "spark", "star", "stone",
    "storm", "sun", "thunder", "tree", "valley", "wave", "willow", "wind",
];

/// Random `adjective-…-noun` slugs, e.g. `swift-amber-otter`.
#[derive(Debug, Clone)]
pub struct SlugIds {
    words: usize,
    separator: String,
}

impl SlugIds {
    /// `words` is clamped to at least one; the last word is always a noun.
    pub fn new(words: usize, separator: impl Into<String>) -> Self {
        Self {
            words: words.max(1),
            separator: separator.into(),
        }
    }
}

impl Default for SlugIds {
    fn default() -> Self {
        Self::new(3, "-")
    }
}

impl IdGenerator for SlugIds {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let mut parts: Vec<&str> = (1..self.words)
            .map(|_| *ADJECTIVES.choose(&mut rng).unwrap_or(&"plain"))
            .collect();
        parts.push(NOUNS[rng.gen_range(0..NOUNS.len())]);
        parts.join(&self.separator)
    }
}

/// Deterministic `prefix-1`, `prefix-2`, … tokens.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_has_requested_word_count() {
        let slug = SlugIds::new(3, "-").generate();
        assert_eq!(slug.split('-').count(), 3);
        assert!(NOUNS.contains(&slug.rsplit('-').next().unwrap()));
    }

    #[test]
    fn slug_word_count_is_at_least_one() {
        let slug = SlugIds::new(0, "_").generate();
        assert!(NOUNS.contains(&slug.as_str()));
    }

    #[test]
    fn slug_uses_separator() {
        let slug = SlugIds::new(2, "_").generate();
        assert_eq!(slug.split('_').count(), 2);
        assert!(!slug.contains('-'));
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new("page");
        assert_eq!(ids.generate(), "page-1");
        assert_eq!(ids.generate(), "page-2");
    }
}
