use super::suggestions::{self, WordSource};
use super::{ensure_word, DictResult, Dictionary, WordOverlay};
use fst::{Automaton, IntoStreamer, Set, SetBuilder, Streamer};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

const MAX_SUGGESTIONS: usize = 10;

/// A word list compiled into a finite state transducer.
///
/// Lookups try the word as written and then in lower case, so a list of
/// lower-case words accepts sentence-initial capitals.
pub struct FstDictionary {
    tag: String,
    set: Set<Vec<u8>>,
    overlay: WordOverlay,
}

impl FstDictionary {
    /// Build an in-memory dictionary from unsorted words.
    pub fn from_words<I, S>(tag: &str, words: I) -> DictResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        sorted.sort();
        sorted.dedup();

        let mut builder = SetBuilder::memory();
        for word in &sorted {
            builder.insert(word)?;
        }
        let set = Set::new(builder.into_inner()?)?;
        Ok(Self::with_set(tag, set))
    }

    /// Load a `.dict` file built by [`FstDictionary::build_from_words`].
    pub fn open(tag: &str, path: &Path) -> DictResult<Self> {
        let set = Set::new(fs::read(path)?)?;
        log::debug!("loaded {} words for {} from {}", set.len(), tag, path.display());
        Ok(Self::with_set(tag, set))
    }

    fn with_set(tag: &str, set: Set<Vec<u8>>) -> Self {
        Self {
            tag: tag.to_string(),
            set,
            overlay: WordOverlay::default(),
        }
    }

    /// Build dictionary from word list
    ///
    /// The list is written next to `output_path` and moved over it once
    /// complete, so a failed build leaves any installed dictionary intact.
    pub fn build_from_words(words: &[String], output_path: &Path) -> DictResult<()> {
        let mut sorted_words = words.to_vec();
        sorted_words.sort();
        sorted_words.dedup();

        let partial = output_path.with_extension("dict.partial");
        let writer = BufWriter::new(File::create(&partial)?);
        let mut builder = SetBuilder::new(writer)?;
        for word in sorted_words.iter().filter(|w| !w.is_empty()) {
            builder.insert(word)?;
        }
        builder.finish()?;
        fs::rename(&partial, output_path)?;

        Ok(())
    }

    /// Number of words in the compiled list.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    fn in_list(&self, word: &str) -> bool {
        if self.set.contains(word) {
            return true;
        }
        let lower = word.to_lowercase();
        lower != word && self.set.contains(&lower)
    }
}

impl WordSource for FstDictionary {
    fn contains(&self, word: &str) -> bool {
        !self.overlay.is_removed(word) && (self.overlay.is_added(word) || self.set.contains(word))
    }

    fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self
            .set
            .search(fst::automaton::Str::new(prefix).starts_with())
            .into_stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                results.push(word);
            }
        }
        results.extend(self.overlay.added_with_prefix(prefix).cloned());
        results
    }

    fn all_words(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut stream = self.set.stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                words.push(word);
            }
        }
        words.extend(self.overlay.added_with_prefix("").cloned());
        words
    }
}

impl Dictionary for FstDictionary {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn check(&self, word: &str) -> DictResult<bool> {
        ensure_word(word)?;
        Ok(match self.overlay.verdict(word) {
            Some(verdict) => verdict,
            None => self.in_list(word),
        })
    }

    fn suggest(&self, word: &str) -> DictResult<Vec<String>> {
        ensure_word(word)?;
        let generated = suggestions::generate_matching_case(word, self, MAX_SUGGESTIONS);
        let mut ranked = self.overlay.rank(word, generated);
        ranked.truncate(MAX_SUGGESTIONS);
        Ok(ranked)
    }

    fn add(&mut self, word: &str) -> DictResult<()> {
        ensure_word(word)?;
        self.overlay.add(word);
        Ok(())
    }

    fn add_to_session(&mut self, word: &str) -> DictResult<()> {
        ensure_word(word)?;
        self.overlay.add_to_session(word);
        Ok(())
    }

    fn is_added(&self, word: &str) -> DictResult<bool> {
        ensure_word(word)?;
        Ok(self.overlay.is_added(word))
    }

    fn remove(&mut self, word: &str) -> DictResult<()> {
        ensure_word(word)?;
        self.overlay.remove(word);
        Ok(())
    }

    fn remove_from_session(&mut self, word: &str) -> DictResult<()> {
        ensure_word(word)?;
        self.overlay.remove_from_session(word);
        Ok(())
    }

    fn is_removed(&self, word: &str) -> DictResult<bool> {
        ensure_word(word)?;
        Ok(self.overlay.is_removed(word))
    }

    fn store_replacement(&mut self, misspelled: &str, corrected: &str) -> DictResult<()> {
        ensure_word(misspelled)?;
        self.overlay.store_replacement(misspelled, corrected);
        Ok(())
    }
}
