//! The word bank: an immutable list of candidate words.

use std::sync::Arc;

use rand::Rng;

use crate::SessionError;

/// Words used when the config does not supply its own list.
pub const DEFAULT_WORDS: &[&str] = &[
    "APPLE", "BANANA", "BICYCLE", "BRIDGE", "BUTTERFLY", "CACTUS", "CAMERA",
    "CASTLE", "CLOCK", "CLOUD", "DRAGON", "ELEPHANT", "GUITAR", "HAMBURGER",
    "HOUSE", "ICE CREAM", "KITE", "LIGHTHOUSE", "MOUNTAIN", "OCTOPUS",
    "PENGUIN", "PIZZA", "RAINBOW", "ROBOT", "ROCKET", "SNOWMAN", "SPIDER",
    "SUNFLOWER", "TELESCOPE", "TRAIN", "TREE", "UMBRELLA", "VOLCANO",
    "WATERMELON", "WHALE",
];

/// Case- and whitespace-normalize a word or guess: trim, collapse internal
/// whitespace runs to one space, uppercase.
pub fn normalize_word(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// A static, non-empty list of normalized words.
///
/// Cloning is cheap (one `Arc` bump) and the list is never mutated, so one
/// bank can be shared by any number of sessions without locking.
#[derive(Debug, Clone)]
pub struct WordBank {
    words: Arc<[String]>,
}

impl WordBank {
    /// Build a bank from raw words. Entries are normalized; blank ones are
    /// dropped.
    ///
    /// # Errors
    /// Returns [`SessionError::EmptyWordBank`] if nothing usable remains.
    pub fn new<I, S>(words: I) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| normalize_word(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return Err(SessionError::EmptyWordBank);
        }
        Ok(Self {
            words: words.into(),
        })
    }

    /// A uniformly random word, using the thread-local RNG.
    pub fn pick(&self) -> &str {
        self.pick_with(&mut rand::rng())
    }

    /// A uniformly random word from the given RNG.
    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.words[rng.random_range(0..self.words.len())]
    }

    /// A uniformly random word other than `exclude`. Falls back to any word
    /// when the bank has only one entry.
    pub fn pick_excluding<R: Rng + ?Sized>(&self, rng: &mut R, exclude: Option<&str>) -> &str {
        let candidates: Vec<&String> = self
            .words
            .iter()
            .filter(|w| Some(w.as_str()) != exclude)
            .collect();
        if candidates.is_empty() {
            return self.pick_with(rng);
        }
        candidates[rng.random_range(0..candidates.len())]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always `false`; a bank cannot be built empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        let word = normalize_word(word);
        self.words.iter().any(|w| *w == word)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}
