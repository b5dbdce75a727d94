//! Spelling dictionaries.
//!
//! A session only ever talks to the [`Dictionary`] trait. This module ships
//! an FST-backed word list, a personal word list kept in a plain text file,
//! the combination of the two, and a [`Broker`] that resolves language tags
//! to shared dictionary handles.

pub mod broker;
pub mod manager;
pub mod pwl;
pub mod suggestions;
pub mod wordlist;

use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub use self::broker::{Broker, DictHandle};
pub use self::wordlist::FstDictionary;
pub use self::pwl::{DictWithPwl, PwlDictionary};

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("cannot check an empty word")]
    InvalidWord,

    #[error("dictionary '{tag}' was used after being freed")]
    Freed { tag: String },

    #[error("dictionary backend failed: {0}")]
    Backend(String),

    #[error("invalid dictionary data: {0}")]
    Fst(#[from] ::fst::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type DictResult<T> = Result<T, DictionaryError>;

/// Spell data for one language.
///
/// Words passed in must be non-empty; implementations reject the empty word
/// with [`DictionaryError::InvalidWord`].
pub trait Dictionary {
    /// Language tag this dictionary was loaded for.
    fn tag(&self) -> &str;

    fn check(&self, word: &str) -> DictResult<bool>;

    /// Corrections for `word`, best first.
    fn suggest(&self, word: &str) -> DictResult<Vec<String>>;

    /// Add `word` to the personal word list.
    fn add(&mut self, word: &str) -> DictResult<()>;

    /// Accept `word` until this dictionary is dropped.
    fn add_to_session(&mut self, word: &str) -> DictResult<()>;

    fn is_added(&self, word: &str) -> DictResult<bool>;

    /// Reject `word` from now on, even if the word list has it.
    fn remove(&mut self, word: &str) -> DictResult<()>;

    fn remove_from_session(&mut self, word: &str) -> DictResult<()>;

    fn is_removed(&self, word: &str) -> DictResult<bool>;

    /// Record that `misspelled` was corrected to `corrected`. Advisory.
    fn store_replacement(&mut self, _misspelled: &str, _corrected: &str) -> DictResult<()> {
        Ok(())
    }
}

impl<D: Dictionary + ?Sized> Dictionary for Box<D> {
    fn tag(&self) -> &str {
        (**self).tag()
    }

    fn check(&self, word: &str) -> DictResult<bool> {
        (**self).check(word)
    }

    fn suggest(&self, word: &str) -> DictResult<Vec<String>> {
        (**self).suggest(word)
    }

    fn add(&mut self, word: &str) -> DictResult<()> {
        (**self).add(word)
    }

    fn add_to_session(&mut self, word: &str) -> DictResult<()> {
        (**self).add_to_session(word)
    }

    fn is_added(&self, word: &str) -> DictResult<bool> {
        (**self).is_added(word)
    }

    fn remove(&mut self, word: &str) -> DictResult<()> {
        (**self).remove(word)
    }

    fn remove_from_session(&mut self, word: &str) -> DictResult<()> {
        (**self).remove_from_session(word)
    }

    fn is_removed(&self, word: &str) -> DictResult<bool> {
        (**self).is_removed(word)
    }

    fn store_replacement(&mut self, misspelled: &str, corrected: &str) -> DictResult<()> {
        (**self).store_replacement(misspelled, corrected)
    }
}

/// Reject the empty word.
pub fn ensure_word(word: &str) -> DictResult<()> {
    if word.is_empty() {
        return Err(DictionaryError::InvalidWord);
    }
    Ok(())
}

/// Words accepted or rejected on top of a word list, plus the corrections
/// seen so far.
#[derive(Debug, Default)]
pub(crate) struct WordOverlay {
    pub(crate) added: HashSet<String>,
    pub(crate) session_added: HashSet<String>,
    pub(crate) removed: HashSet<String>,
    pub(crate) session_removed: HashSet<String>,
    replacements: HashMap<String, Vec<String>>,
}

impl WordOverlay {
    /// `Some` when the overlay alone decides whether `word` is correct.
    pub(crate) fn verdict(&self, word: &str) -> Option<bool> {
        if self.is_removed(word) {
            Some(false)
        } else if self.is_added(word) {
            Some(true)
        } else {
            None
        }
    }

    pub(crate) fn add(&mut self, word: &str) {
        self.removed.remove(word);
        self.session_removed.remove(word);
        self.added.insert(word.to_string());
    }

    pub(crate) fn add_to_session(&mut self, word: &str) {
        self.session_removed.remove(word);
        self.session_added.insert(word.to_string());
    }

    pub(crate) fn is_added(&self, word: &str) -> bool {
        self.added.contains(word) || self.session_added.contains(word)
    }

    pub(crate) fn remove(&mut self, word: &str) {
        self.added.remove(word);
        self.session_added.remove(word);
        self.removed.insert(word.to_string());
    }

    pub(crate) fn remove_from_session(&mut self, word: &str) {
        self.session_added.remove(word);
        self.session_removed.insert(word.to_string());
    }

    pub(crate) fn is_removed(&self, word: &str) -> bool {
        self.removed.contains(word) || self.session_removed.contains(word)
    }

    /// Accepted words starting with `prefix`.
    pub(crate) fn added_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a String> {
        self.added
            .iter()
            .chain(self.session_added.iter())
            .filter(move |w| w.starts_with(prefix))
    }

    /// Most recent correction first.
    pub(crate) fn store_replacement(&mut self, misspelled: &str, corrected: &str) {
        if corrected.is_empty() {
            return;
        }
        let seen = self.replacements.entry(misspelled.to_string()).or_default();
        seen.retain(|w| w != corrected);
        seen.insert(0, corrected.to_string());
    }

    /// Stored corrections for `word` followed by `generated`, without
    /// duplicates or rejected words.
    pub(crate) fn rank(&self, word: &str, generated: Vec<String>) -> Vec<String> {
        let mut ranked: Vec<String> = self.replacements.get(word).cloned().unwrap_or_default();
        for candidate in generated {
            if !ranked.contains(&candidate) {
                ranked.push(candidate);
            }
        }
        ranked.retain(|w| !self.is_removed(w));
        ranked
    }
}
