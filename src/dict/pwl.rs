use super::suggestions::{self, WordSource};
use super::{ensure_word, DictResult, Dictionary, WordOverlay};
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const PWL_MAX_SUGGESTIONS: usize = 10;

/// A personal word list: a text file with one word per line.
///
/// Blank lines and lines starting with `#` are ignored. Words added with
/// [`Dictionary::add`] are appended to the file right away; removed words
/// are dropped from it.
pub struct PwlDictionary {
    tag: String,
    path: Option<PathBuf>,
    words: BTreeSet<String>,
    overlay: WordOverlay,
}

impl PwlDictionary {
    /// Open the list at `path`, creating an empty file if there is none.
    pub fn open(path: &Path) -> DictResult<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "")?;
        }

        let contents = fs::read_to_string(path)?;
        let words: BTreeSet<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        log::debug!("loaded {} personal words from {}", words.len(), path.display());

        Ok(Self {
            tag: "pwl".to_string(),
            path: Some(path.to_path_buf()),
            words,
            overlay: WordOverlay::default(),
        })
    }

    /// A list that is never written anywhere.
    pub fn in_memory() -> Self {
        Self {
            tag: "pwl".to_string(),
            path: None,
            words: BTreeSet::new(),
            overlay: WordOverlay::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn words(&self) -> impl Iterator<Item = &String> {
        self.words.iter()
    }

    fn append(&self, word: &str) -> DictResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let needs_newline = fs::read(path)?.last().map_or(false, |&b| b != b'\n');
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if needs_newline {
            writeln!(file)?;
        }
        writeln!(file, "{}", word)?;
        Ok(())
    }

    fn drop_from_file(&self, word: &str) -> DictResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = fs::read_to_string(path)?;
        let kept: Vec<&str> = contents.lines().filter(|line| line.trim() != word).collect();
        let mut rewritten = kept.join("\n");
        if !rewritten.is_empty() {
            rewritten.push('\n');
        }
        fs::write(path, rewritten)?;
        Ok(())
    }

    fn in_list(&self, word: &str) -> bool {
        self.words.contains(word) || self.words.contains(&word.to_lowercase())
    }
}

impl WordSource for PwlDictionary {
    fn contains(&self, word: &str) -> bool {
        !self.overlay.is_removed(word)
            && (self.overlay.is_added(word) || self.words.contains(word))
    }

    fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results: Vec<String> = self
            .words
            .range(prefix.to_string()..)
            .take_while(|w| w.starts_with(prefix))
            .cloned()
            .collect();
        results.extend(self.overlay.added_with_prefix(prefix).cloned());
        results
    }

    fn all_words(&self) -> Vec<String> {
        self.words_with_prefix("")
    }
}

impl Dictionary for PwlDictionary {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn check(&self, word: &str) -> DictResult<bool> {
        ensure_word(word)?;
        Ok(self.overlay.verdict(word).unwrap_or_else(|| self.in_list(word)))
    }

    fn suggest(&self, word: &str) -> DictResult<Vec<String>> {
        ensure_word(word)?;
        let generated = suggestions::generate_matching_case(word, self, PWL_MAX_SUGGESTIONS);
        Ok(self.overlay.rank(word, generated))
    }

    fn add(&mut self, word: &str) -> DictResult<()> {
        ensure_word(word)?;
        if self.words.insert(word.to_string()) {
            self.append(word)?;
        }
        self.overlay.removed.remove(word);
        self.overlay.session_removed.remove(word);
        Ok(())
    }

    fn add_to_session(&mut self, word: &str) -> DictResult<()> {
        ensure_word(word)?;
        self.overlay.add_to_session(word);
        Ok(())
    }

    fn is_added(&self, word: &str) -> DictResult<bool> {
        ensure_word(word)?;
        Ok(self.words.contains(word) || self.overlay.is_added(word))
    }

    fn remove(&mut self, word: &str) -> DictResult<()> {
        ensure_word(word)?;
        if self.words.remove(word) {
            self.drop_from_file(word)?;
        }
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

/// A dictionary backed by a personal word list.
///
/// Words are correct if either accepts them, unless the personal list has
/// removed them. Additions and removals go to the personal list.
pub struct DictWithPwl {
    base: Box<dyn Dictionary>,
    pwl: PwlDictionary,
}

impl DictWithPwl {
    pub fn new(base: Box<dyn Dictionary>, pwl: PwlDictionary) -> Self {
        Self { base, pwl }
    }

    pub fn pwl(&self) -> &PwlDictionary {
        &self.pwl
    }
}

impl Dictionary for DictWithPwl {
    fn tag(&self) -> &str {
        self.base.tag()
    }

    fn check(&self, word: &str) -> DictResult<bool> {
        if self.pwl.is_removed(word)? {
            return Ok(false);
        }
        Ok(self.pwl.check(word)? || self.base.check(word)?)
    }

    fn suggest(&self, word: &str) -> DictResult<Vec<String>> {
        let mut suggestions = self.base.suggest(word)?;
        for candidate in self.pwl.suggest(word)? {
            if !suggestions.contains(&candidate) {
                suggestions.push(candidate);
            }
        }
        suggestions.retain(|w| !self.pwl.overlay.is_removed(w));
        Ok(suggestions)
    }

    fn add(&mut self, word: &str) -> DictResult<()> {
        self.pwl.add(word)
    }

    fn add_to_session(&mut self, word: &str) -> DictResult<()> {
        self.pwl.add_to_session(word)
    }

    fn is_added(&self, word: &str) -> DictResult<bool> {
        self.pwl.is_added(word)
    }

    fn remove(&mut self, word: &str) -> DictResult<()> {
        self.pwl.remove(word)
    }

    fn remove_from_session(&mut self, word: &str) -> DictResult<()> {
        self.pwl.remove_from_session(word)
    }

    fn is_removed(&self, word: &str) -> DictResult<bool> {
        self.pwl.is_removed(word)
    }

    fn store_replacement(&mut self, misspelled: &str, corrected: &str) -> DictResult<()> {
        self.base.store_replacement(misspelled, corrected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::FstDictionary;
    use tempfile::tempdir;

    #[test]
    fn test_open_skips_comments_and_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "# my words\nLozz\n\n  spellwalk  \n").unwrap();

        let pwl = PwlDictionary::open(&path).unwrap();
        assert_eq!(pwl.words().count(), 2);
        assert!(pwl.check("Lozz").unwrap());
        assert!(pwl.check("spellwalk").unwrap());
        assert!(!pwl.check("my").unwrap());
    }

    #[test]
    fn test_add_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("words.txt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "Lozz").unwrap();

        let mut pwl = PwlDictionary::open(&path).unwrap();
        pwl.add("Hazz").unwrap();
        pwl.add("Hazz").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Lozz\nHazz\n");

        let reopened = PwlDictionary::open(&path).unwrap();
        assert!(reopened.check("Hazz").unwrap());
    }

    #[test]
    fn test_open_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("words.txt");
        let pwl = PwlDictionary::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(pwl.words().count(), 0);
    }

    #[test]
    fn test_remove_rewrites_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "# keep\nLozz\nHazz\n").unwrap();

        let mut pwl = PwlDictionary::open(&path).unwrap();
        pwl.remove("Lozz").unwrap();
        assert!(pwl.is_removed("Lozz").unwrap());
        assert!(!pwl.check("Lozz").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# keep\nHazz\n");
    }

    #[test]
    fn test_pwl_suggestions() {
        let mut pwl = PwlDictionary::in_memory();
        pwl.add("spellwalk").unwrap();
        assert_eq!(pwl.suggest("spelwalk").unwrap(), vec!["spellwalk"]);
    }

    #[test]
    fn test_dict_with_pwl() {
        let base = FstDictionary::from_words("en_US", ["hello", "world"]).unwrap();
        let mut dict = DictWithPwl::new(Box::new(base), PwlDictionary::in_memory());
        assert!(dict.check("hello").unwrap());
        assert!(!dict.check("Lozz").unwrap());

        dict.add("Lozz").unwrap();
        assert!(dict.check("Lozz").unwrap());
        assert!(dict.is_added("Lozz").unwrap());
        assert_eq!(dict.pwl().words().count(), 1);

        dict.remove("hello").unwrap();
        assert!(!dict.check("hello").unwrap());
        assert!(!dict.suggest("helo").unwrap().contains(&"hello".to_string()));
        assert_eq!(dict.tag(), "en_US");
    }
}
