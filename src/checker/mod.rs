//! The interactive spellchecking session.
//!
//! A [`SpellChecker`] walks a text buffer one misspelled word at a time. The
//! caller inspects the current error and picks an action; replacements are
//! written straight into the buffer and the tokenizer cursor is moved by the
//! change in length, so scanning carries on right after the new text.
//!
//! ```no_run
//! use spellwalk::SpellChecker;
//!
//! let mut checker: SpellChecker = SpellChecker::builder("en_US")
//!     .text("This is sme text")
//!     .build()?;
//! while checker.advance()? {
//!     let suggestions = checker.suggest()?;
//!     if let Some(best) = suggestions.first() {
//!         checker.replace(best)?;
//!     }
//! }
//! # Ok::<(), spellwalk::Error>(())
//! ```

use crate::chunker::ChunkerRef;
use crate::dict::broker::default_dict;
use crate::dict::Dictionary;
use crate::error::{Error, Result};
use crate::tokenize::{
    BoxedTokenizer, FilterRef, SharedText, TextUnit, Token, TokenizerFn, TokenizerRegistry,
};
use std::collections::{HashMap, HashSet};
use std::io::SeekFrom;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not stopped at any word yet, or just moved.
    Scanning,
    /// Stopped at a misspelled word.
    AtError,
    /// No misspelled words left after the cursor.
    Exhausted,
}

pub struct SpellChecker<T: TextUnit = char> {
    lang: String,
    text: SharedText<T>,
    tokenize: TokenizerFn<T>,
    tokens: BoxedTokenizer<T>,
    dict: Box<dyn Dictionary>,
    ignore_words: HashSet<String>,
    replace_words: HashMap<String, String>,
    current: Option<Token<T>>,
    // token whose dictionary lookup failed, retried by the next advance
    pending: Option<Token<T>>,
    exhausted: bool,
    replacements: usize,
}

impl SpellChecker<char> {
    /// Session for `lang` over an empty text, using the default dictionary.
    pub fn new(lang: &str) -> Result<Self> {
        Self::builder(lang).build()
    }
}

impl<T: TextUnit> SpellChecker<T> {
    pub fn builder(lang: &str) -> SpellCheckerBuilder<T> {
        SpellCheckerBuilder::new(lang)
    }

    /// Session using `dict`, with word rules picked by its tag.
    pub fn for_dictionary(dict: Box<dyn Dictionary>) -> Result<Self> {
        let lang = dict.tag().to_string();
        Self::builder(&lang).dictionary(dict).build()
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn dictionary(&self) -> &dyn Dictionary {
        self.dict.as_ref()
    }

    pub fn dictionary_mut(&mut self) -> &mut dyn Dictionary {
        self.dict.as_mut()
    }

    /// Check a new text from the start.
    pub fn set_text(&mut self, text: impl Into<SharedText<T>>) {
        self.text = text.into();
        self.tokens = (self.tokenize)(self.text.clone());
        self.current = None;
        self.pending = None;
        self.exhausted = false;
    }

    /// A copy of the text with every replacement made so far.
    pub fn get_text(&self) -> Vec<T> {
        self.text.to_vec()
    }

    pub fn text_string(&self) -> String {
        self.text.to_text()
    }

    /// The buffer being checked. Edits made through it must be followed by
    /// [`SpellChecker::set_offset`].
    pub fn text(&self) -> SharedText<T> {
        self.text.clone()
    }

    pub fn state(&self) -> SessionState {
        if self.current.is_some() {
            SessionState::AtError
        } else if self.exhausted {
            SessionState::Exhausted
        } else {
            SessionState::Scanning
        }
    }

    /// Words replaced so far, counting silent replace-always applications.
    pub fn replacements(&self) -> usize {
        self.replacements
    }

    pub fn current(&self) -> Option<&Token<T>> {
        self.current.as_ref()
    }

    /// The misspelled word the session is stopped at.
    pub fn word(&self) -> Option<String> {
        self.current.as_ref().map(Token::text)
    }

    pub fn word_position(&self) -> Option<usize> {
        self.current.as_ref().map(|token| token.pos)
    }

    fn current_word(&self) -> Result<String> {
        self.word().ok_or(Error::NoCurrentWord)
    }

    /// Move to the next misspelled word. Returns `false` once there is none.
    ///
    /// Words ignored for the session and words the dictionary accepts are
    /// passed over. Words with a registered replacement are replaced without
    /// stopping. If the dictionary fails, the error is returned and the next
    /// call starts again from the word it failed on.
    pub fn advance(&mut self) -> Result<bool> {
        self.current = None;
        while let Some(token) = self.pending.take().or_else(|| self.tokens.next()) {
            let word = token.text();
            if self.ignore_words.contains(&word) {
                continue;
            }
            match self.dict.check(&word) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(err) => {
                    self.pending = Some(token);
                    return Err(err.into());
                }
            }
            if let Some(replacement) = self.replace_words.get(&word).cloned() {
                log::trace!("replacing {:?} with {:?} at {}", word, replacement, token.pos);
                self.apply_replacement(&token, &word, &replacement)?;
                continue;
            }
            log::debug!("misspelled {:?} at {}", word, token.pos);
            self.current = Some(token);
            return Ok(true);
        }
        self.exhausted = true;
        Ok(false)
    }

    fn apply_replacement(&mut self, token: &Token<T>, word: &str, replacement: &str) -> Result<()> {
        let units = T::encode(replacement);
        self.text.splice(token.pos..token.end(), &units);
        let offset = (self.tokens.offset() + units.len()).saturating_sub(token.word.len());
        self.tokens.set_offset(offset, true);
        self.replacements += 1;
        self.dict.store_replacement(word, replacement)?;
        Ok(())
    }

    /// Replace the current word and move on to the next error.
    ///
    /// The replacement is trusted: it is neither checked nor split into words.
    pub fn replace(&mut self, replacement: &str) -> Result<bool> {
        let token = self.current.take().ok_or(Error::NoCurrentWord)?;
        let word = token.text();
        self.apply_replacement(&token, &word, replacement)?;
        self.advance()
    }

    /// Replace the current word, here and wherever it appears later.
    pub fn replace_always(&mut self, replacement: &str) -> Result<bool> {
        let word = self.current_word()?;
        self.replace_always_word(&word, replacement)
    }

    /// Replace `word` with `replacement` wherever it appears from now on.
    ///
    /// If `word` is the current error it is replaced at once and the session
    /// moves on. Otherwise nothing moves and the result tells whether the
    /// session is still stopped at an error.
    pub fn replace_always_word(&mut self, word: &str, replacement: &str) -> Result<bool> {
        self.replace_words
            .insert(word.to_string(), replacement.to_string());
        if self.word().as_deref() == Some(word) {
            return self.replace(replacement);
        }
        Ok(self.current.is_some())
    }

    /// Pass over the current word for the rest of the session. Does not move.
    pub fn ignore_always(&mut self) -> Result<()> {
        let word = self.current_word()?;
        self.ignore_always_word(&word);
        Ok(())
    }

    pub fn ignore_always_word(&mut self, word: &str) {
        self.ignore_words.insert(word.to_string());
    }

    /// Add the current word to the dictionary. Does not move.
    pub fn add(&mut self) -> Result<()> {
        let word = self.current_word()?;
        self.add_word(&word)
    }

    pub fn add_word(&mut self, word: &str) -> Result<()> {
        self.dict.add(word)?;
        Ok(())
    }

    /// Suggestions for the current word, best first.
    pub fn suggest(&self) -> Result<Vec<String>> {
        let word = self.current_word()?;
        self.suggest_word(&word)
    }

    pub fn suggest_word(&self, word: &str) -> Result<Vec<String>> {
        Ok(self.dict.suggest(word)?)
    }

    pub fn check(&self, word: &str) -> Result<bool> {
        Ok(self.dict.check(word)?)
    }

    /// Move the cursor, rereading the text from the new position.
    ///
    /// `Current` is relative to where the next scan would start. Positions
    /// outside the text are rejected.
    pub fn set_offset(&mut self, pos: SeekFrom) -> Result<()> {
        let len = self.text.len();
        let target = match pos {
            SeekFrom::Start(n) => i64::try_from(n).unwrap_or(i64::MAX),
            SeekFrom::Current(delta) => (self.tokens.offset() as i64).saturating_add(delta),
            SeekFrom::End(delta) => (len as i64).saturating_add(delta),
        };
        if target < 0 || target > len as i64 {
            return Err(Error::OffsetRange {
                offset: target,
                len,
            });
        }

        log::debug!("cursor moved to {}", target);
        self.tokens.set_offset(target as usize, true);
        self.current = None;
        self.pending = None;
        self.exhausted = false;
        Ok(())
    }

    /// Up to `chars` units of text just before the current word.
    pub fn leading_context(&self, chars: usize) -> Result<String> {
        let token = self.current.as_ref().ok_or(Error::NoCurrentWord)?;
        let start = token.pos.saturating_sub(chars);
        Ok(T::decode(&self.text.slice(start..token.pos)))
    }

    /// Up to `chars` units of text just after the current word.
    pub fn trailing_context(&self, chars: usize) -> Result<String> {
        let token = self.current.as_ref().ok_or(Error::NoCurrentWord)?;
        let end = token.end();
        Ok(T::decode(&self.text.slice(end..end.saturating_add(chars))))
    }
}

/// Configures a [`SpellChecker`].
pub struct SpellCheckerBuilder<T: TextUnit> {
    lang: String,
    text: Option<SharedText<T>>,
    dict: Option<Box<dyn Dictionary>>,
    filters: Vec<FilterRef<T>>,
    chunkers: Vec<ChunkerRef<T>>,
    fallback: Option<String>,
    tokenizer: Option<TokenizerFn<T>>,
    registry: Option<TokenizerRegistry<T>>,
}

impl<T: TextUnit> SpellCheckerBuilder<T> {
    fn new(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            text: None,
            dict: None,
            filters: Vec::new(),
            chunkers: Vec::new(),
            fallback: None,
            tokenizer: None,
            registry: None,
        }
    }

    /// Text to check. Passing a [`SharedText`] lets the caller keep a handle
    /// on the buffer.
    pub fn text(mut self, text: impl Into<SharedText<T>>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Dictionary to check against instead of the default one for the
    /// language.
    pub fn dictionary(mut self, dict: Box<dyn Dictionary>) -> Self {
        self.dict = Some(dict);
        self
    }

    pub fn filter(mut self, filter: FilterRef<T>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = FilterRef<T>>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn chunker(mut self, chunker: ChunkerRef<T>) -> Self {
        self.chunkers.push(chunker);
        self
    }

    pub fn chunkers(mut self, chunkers: impl IntoIterator<Item = ChunkerRef<T>>) -> Self {
        self.chunkers.extend(chunkers);
        self
    }

    /// Word rules to use when none are registered for the language.
    pub fn fallback(mut self, tag: &str) -> Self {
        self.fallback = Some(tag.to_string());
        self
    }

    /// Use `tokenizer` as the whole pipeline. Filters, chunkers and the
    /// language rules are then not applied.
    pub fn tokenizer(mut self, tokenizer: TokenizerFn<T>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn registry(mut self, registry: TokenizerRegistry<T>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<SpellChecker<T>> {
        let tokenize = match self.tokenizer {
            Some(tokenizer) => tokenizer,
            None => self.registry.unwrap_or_default().build(
                &self.lang,
                self.fallback.as_deref(),
                &self.filters,
                &self.chunkers,
            )?,
        };
        let dict = match self.dict {
            Some(dict) => dict,
            None => Box::new(default_dict(&self.lang)?),
        };
        let text = self.text.unwrap_or_else(|| SharedText::new(Vec::new()));
        let tokens = tokenize(text.clone());
        log::debug!("session for {} using dictionary {}", self.lang, dict.tag());

        Ok(SpellChecker {
            lang: self.lang,
            text,
            tokenize: Rc::clone(&tokenize),
            tokens,
            dict,
            ignore_words: HashSet::new(),
            replace_words: HashMap::new(),
            current: None,
            pending: None,
            exhausted: false,
            replacements: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::HtmlChunker;
    use crate::dict::{DictResult, DictionaryError, FstDictionary};
    use crate::tokenize::{BasicTokenizer, UrlFilter};
    use std::cell::{Cell, RefCell};

    const WORDS: &[&str] = &[
        "this", "is", "some", "text", "with", "a", "few", "spelling", "errors", "in", "it", "i",
        "am", "naïve", "string", "and", "an", "be", "will", "stored", "array", "good",
    ];

    fn dict() -> Box<dyn Dictionary> {
        Box::new(FstDictionary::from_words("en_US", WORDS).unwrap())
    }

    fn checker(text: &str) -> SpellChecker {
        SpellChecker::builder("en_US")
            .text(text)
            .dictionary(dict())
            .build()
            .unwrap()
    }

    fn errors(checker: &mut SpellChecker) -> Vec<(String, usize)> {
        let mut found = Vec::new();
        while checker.advance().unwrap() {
            found.push((checker.word().unwrap(), checker.word_position().unwrap()));
        }
        found
    }

    /// Records every stored replacement.
    struct Recording {
        inner: FstDictionary,
        stored: Rc<RefCell<Vec<(String, String)>>>,
    }

    impl Dictionary for Recording {
        fn tag(&self) -> &str {
            self.inner.tag()
        }
        fn check(&self, word: &str) -> DictResult<bool> {
            self.inner.check(word)
        }
        fn suggest(&self, word: &str) -> DictResult<Vec<String>> {
            self.inner.suggest(word)
        }
        fn add(&mut self, word: &str) -> DictResult<()> {
            self.inner.add(word)
        }
        fn add_to_session(&mut self, word: &str) -> DictResult<()> {
            self.inner.add_to_session(word)
        }
        fn is_added(&self, word: &str) -> DictResult<bool> {
            self.inner.is_added(word)
        }
        fn remove(&mut self, word: &str) -> DictResult<()> {
            self.inner.remove(word)
        }
        fn remove_from_session(&mut self, word: &str) -> DictResult<()> {
            self.inner.remove_from_session(word)
        }
        fn is_removed(&self, word: &str) -> DictResult<bool> {
            self.inner.is_removed(word)
        }
        fn store_replacement(&mut self, misspelled: &str, corrected: &str) -> DictResult<()> {
            self.stored
                .borrow_mut()
                .push((misspelled.to_string(), corrected.to_string()));
            self.inner.store_replacement(misspelled, corrected)
        }
    }

    /// A backend that is unreachable.
    struct Offline;

    impl Dictionary for Offline {
        fn tag(&self) -> &str {
            "en_US"
        }
        fn check(&self, _word: &str) -> DictResult<bool> {
            Err(DictionaryError::Backend("connection refused".to_string()))
        }
        fn suggest(&self, _word: &str) -> DictResult<Vec<String>> {
            Err(DictionaryError::Backend("connection refused".to_string()))
        }
        fn add(&mut self, _word: &str) -> DictResult<()> {
            Ok(())
        }
        fn add_to_session(&mut self, _word: &str) -> DictResult<()> {
            Ok(())
        }
        fn is_added(&self, _word: &str) -> DictResult<bool> {
            Ok(false)
        }
        fn remove(&mut self, _word: &str) -> DictResult<()> {
            Ok(())
        }
        fn remove_from_session(&mut self, _word: &str) -> DictResult<()> {
            Ok(())
        }
        fn is_removed(&self, _word: &str) -> DictResult<bool> {
            Ok(false)
        }
    }

    /// Fails the first `outages` lookups, then answers from `inner`.
    struct Flaky {
        inner: FstDictionary,
        outages: Cell<usize>,
    }

    impl Dictionary for Flaky {
        fn tag(&self) -> &str {
            self.inner.tag()
        }
        fn check(&self, word: &str) -> DictResult<bool> {
            if self.outages.get() > 0 {
                self.outages.set(self.outages.get() - 1);
                return Err(DictionaryError::Backend("timed out".to_string()));
            }
            self.inner.check(word)
        }
        fn suggest(&self, word: &str) -> DictResult<Vec<String>> {
            self.inner.suggest(word)
        }
        fn add(&mut self, word: &str) -> DictResult<()> {
            self.inner.add(word)
        }
        fn add_to_session(&mut self, word: &str) -> DictResult<()> {
            self.inner.add_to_session(word)
        }
        fn is_added(&self, word: &str) -> DictResult<bool> {
            self.inner.is_added(word)
        }
        fn remove(&mut self, word: &str) -> DictResult<()> {
            self.inner.remove(word)
        }
        fn remove_from_session(&mut self, word: &str) -> DictResult<()> {
            self.inner.remove_from_session(word)
        }
        fn is_removed(&self, word: &str) -> DictResult<bool> {
            self.inner.is_removed(word)
        }
    }

    #[test]
    fn test_basic() {
        let mut chkr = checker("This is sme text with a few speling erors in it.");
        assert_eq!(chkr.state(), SessionState::Scanning);

        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.state(), SessionState::AtError);
        assert_eq!(chkr.word().as_deref(), Some("sme"));
        assert_eq!(chkr.word_position(), Some(8));
        assert!(chkr.suggest().unwrap().contains(&"some".to_string()));

        assert!(chkr.replace("some").unwrap());
        assert_eq!(chkr.word().as_deref(), Some("speling"));
        assert_eq!(chkr.word_position(), Some(29));

        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("erors"));
        assert_eq!(chkr.leading_context(5).unwrap(), "ling ");
        assert_eq!(chkr.trailing_context(5).unwrap(), " in i");

        assert!(!chkr.advance().unwrap());
        assert_eq!(chkr.state(), SessionState::Exhausted);
        assert_eq!(
            chkr.text_string(),
            "This is some text with a few speling erors in it."
        );
    }

    #[test]
    fn test_context_is_clamped_to_text() {
        let mut chkr = checker("sme");
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.leading_context(10).unwrap(), "");
        assert_eq!(chkr.trailing_context(10).unwrap(), "");
        assert_eq!(chkr.text_string(), "sme");
    }

    #[test]
    fn test_huge_context_lengths() {
        let mut chkr = checker("some sme text");
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.trailing_context(usize::MAX).unwrap(), " text");
        assert_eq!(chkr.leading_context(usize::MAX).unwrap(), "some ");
    }

    #[test]
    fn test_filters() {
        let text = "this text with http://example.com/sme and SomeLinksLike";
        let mut plain = checker(text);
        assert_eq!(
            errors(&mut plain),
            vec![
                ("http".to_string(), 15),
                ("example".to_string(), 22),
                ("com".to_string(), 30),
                ("sme".to_string(), 34),
                ("SomeLinksLike".to_string(), 42),
            ]
        );

        let mut filtered: SpellChecker = SpellChecker::builder("en_US")
            .text(text)
            .dictionary(dict())
            .filter(Rc::new(UrlFilter))
            .build()
            .unwrap();
        assert_eq!(errors(&mut filtered), vec![("SomeLinksLike".to_string(), 42)]);
    }

    #[test]
    fn test_chunkers() {
        let mut chkr: SpellChecker = SpellChecker::builder("en_US")
            .text("<html><body><p>this is <b>sme</b> text</p></body></html>")
            .dictionary(dict())
            .chunker(Rc::new(HtmlChunker))
            .build()
            .unwrap();
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("sme"));
        assert_eq!(chkr.word_position(), Some(26));
        assert!(!chkr.replace("some").unwrap());
        assert_eq!(
            chkr.text_string(),
            "<html><body><p>this is <b>some</b> text</p></body></html>"
        );
    }

    #[test]
    fn test_unicode() {
        let mut chkr = checker("I am a naïve strng wíth unicode erors.");
        let mut n = 0;
        while chkr.advance().unwrap() {
            match n {
                0 => {
                    assert_eq!(chkr.word().as_deref(), Some("strng"));
                    assert_eq!(chkr.word_position(), Some(13));
                    assert!(chkr.replace_always("string").unwrap());
                    assert_eq!(chkr.word().as_deref(), Some("wíth"));
                    assert_eq!(chkr.word_position(), Some(20));
                    assert!(chkr.replace("with").unwrap());
                    assert_eq!(chkr.word().as_deref(), Some("unicode"));
                    chkr.ignore_always().unwrap();
                    assert_eq!(chkr.word().as_deref(), Some("unicode"));
                }
                1 => {
                    assert_eq!(chkr.word().as_deref(), Some("erors"));
                    assert_eq!(chkr.word_position(), Some(33));
                    assert!(!chkr.replace("erros").unwrap());
                    chkr.set_offset(SeekFrom::Current(-6)).unwrap();
                }
                2 => {
                    assert_eq!(chkr.word().as_deref(), Some("erros"));
                    assert!(!chkr.replace("errors").unwrap());
                }
                _ => panic!("unexpected error {:?}", chkr.word()),
            }
            n += 1;
        }
        assert_eq!(n, 3);
        assert_eq!(chkr.text_string(), "I am a naïve string with unicode errors.");
    }

    #[test]
    fn test_byte_text() {
        let mut chkr: SpellChecker<u8> = SpellChecker::builder("en_US")
            .text("naïve strng".as_bytes())
            .dictionary(dict())
            .build()
            .unwrap();
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word_position(), Some(7));
        assert!(!chkr.replace("string").unwrap());
        assert_eq!(chkr.get_text(), "naïve string".as_bytes().to_vec());
    }

    #[test]
    fn test_external_edits() {
        let text = SharedText::from("I wll be stord in an array");
        let mut chkr: SpellChecker = SpellChecker::builder("en_US")
            .text(text.clone())
            .dictionary(dict())
            .build()
            .unwrap();

        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("wll"));

        // fix the word behind the session's back, then point it past the edit
        text.splice(2..5, &"will".chars().collect::<Vec<_>>());
        chkr.set_offset(SeekFrom::Start(6)).unwrap();
        assert_eq!(chkr.state(), SessionState::Scanning);

        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("stord"));
        assert_eq!(chkr.word_position(), Some(10));
        assert!(!chkr.replace("stored").unwrap());
        assert_eq!(text.to_text(), "I will be stored in an array");
    }

    #[test]
    fn test_shorter_and_empty_replacements() {
        let mut chkr = checker("a sme text with speling");
        assert!(chkr.advance().unwrap());
        assert!(chkr.replace("").unwrap());
        assert_eq!(chkr.text_string(), "a  text with speling");
        assert_eq!(chkr.word().as_deref(), Some("speling"));
        assert_eq!(chkr.word_position(), Some(13));
    }

    #[test]
    fn test_equal_length_replacements_keep_positions() {
        let text = "sme text with speling and erors in it";
        let original = errors(&mut checker(text));

        let mut chkr = checker(text);
        let mut seen = Vec::new();
        let mut more = chkr.advance().unwrap();
        while more {
            seen.push((chkr.word().unwrap(), chkr.word_position().unwrap()));
            let filler = "x".repeat(chkr.word().unwrap().chars().count());
            more = chkr.replace(&filler).unwrap();
        }
        assert_eq!(seen, original);
    }

    #[test]
    fn test_revisit_consumed_span() {
        let mut chkr = checker("this sme text has erors");
        assert!(chkr.advance().unwrap());
        let first = (chkr.word(), chkr.word_position());
        assert!(chkr.advance().unwrap());
        assert!(chkr.advance().unwrap());

        chkr.set_offset(SeekFrom::Start(5)).unwrap();
        assert!(chkr.advance().unwrap());
        assert_eq!((chkr.word(), chkr.word_position()), first);
    }

    #[test]
    fn test_preregistered_replacement_is_silent() {
        let stored = Rc::new(RefCell::new(Vec::new()));
        let recording = Recording {
            inner: FstDictionary::from_words("en_US", WORDS).unwrap(),
            stored: Rc::clone(&stored),
        };
        let mut chkr: SpellChecker = SpellChecker::builder("en_US")
            .text("a speling and speling and erors")
            .dictionary(Box::new(recording))
            .build()
            .unwrap();

        assert!(!chkr.replace_always_word("speling", "spelling").unwrap());
        assert_eq!(chkr.state(), SessionState::Scanning);

        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("erors"));
        assert_eq!(chkr.word_position(), Some(28));
        assert_eq!(chkr.text_string(), "a spelling and spelling and erors");
        assert_eq!(
            *stored.borrow(),
            vec![
                ("speling".to_string(), "spelling".to_string()),
                ("speling".to_string(), "spelling".to_string()),
            ]
        );
    }

    #[test]
    fn test_replace_always_for_other_word_does_not_move() {
        let mut chkr = checker("sme text with speling");
        assert!(chkr.advance().unwrap());
        assert!(chkr.replace_always_word("speling", "spelling").unwrap());
        assert_eq!(chkr.word().as_deref(), Some("sme"));
        assert!(!chkr.replace("some").unwrap());
        assert_eq!(chkr.text_string(), "some text with spelling");
    }

    #[test]
    fn test_add_and_ignore_do_not_advance() {
        let mut chkr = checker("Lozz said sme and Lozz left sme");
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("Lozz"));
        chkr.add().unwrap();
        assert_eq!(chkr.word().as_deref(), Some("Lozz"));
        assert!(chkr.check("Lozz").unwrap());

        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("said"));
        chkr.ignore_always().unwrap();
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("sme"));
        chkr.ignore_always().unwrap();
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("left"));
        assert!(!chkr.advance().unwrap());
    }

    #[test]
    fn test_dictionary_errors_propagate() {
        let mut chkr: SpellChecker = SpellChecker::builder("en_US")
            .text("anything")
            .dictionary(Box::new(Offline))
            .build()
            .unwrap();
        assert!(matches!(
            chkr.advance(),
            Err(Error::Dictionary(DictionaryError::Backend(_)))
        ));
        assert!(matches!(
            chkr.suggest_word("anything"),
            Err(Error::Dictionary(DictionaryError::Backend(_)))
        ));
    }

    #[test]
    fn test_failed_lookup_is_retried() {
        let flaky = Flaky {
            inner: FstDictionary::from_words("en_US", WORDS).unwrap(),
            outages: Cell::new(1),
        };
        let mut chkr: SpellChecker = SpellChecker::builder("en_US")
            .text("sme text")
            .dictionary(Box::new(flaky))
            .build()
            .unwrap();

        assert!(matches!(
            chkr.advance(),
            Err(Error::Dictionary(DictionaryError::Backend(_)))
        ));
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("sme"));
        assert_eq!(chkr.word_position(), Some(0));
    }

    #[test]
    fn test_replacements_are_counted() {
        let mut chkr = checker("sme text, sme and speling");
        assert!(chkr.advance().unwrap());
        assert!(chkr.replace_always("some").unwrap());
        assert_eq!(chkr.word().as_deref(), Some("speling"));
        assert_eq!(chkr.replacements(), 2);
        assert!(!chkr.replace("spelling").unwrap());
        assert_eq!(chkr.replacements(), 3);
    }

    #[test]
    fn test_offset_out_of_range() {
        let mut chkr = checker("sme text");
        assert!(matches!(
            chkr.set_offset(SeekFrom::Start(9)),
            Err(Error::OffsetRange { offset: 9, len: 8 })
        ));
        assert!(matches!(
            chkr.set_offset(SeekFrom::End(1)),
            Err(Error::OffsetRange { offset: 9, .. })
        ));
        assert!(matches!(
            chkr.set_offset(SeekFrom::Current(-1)),
            Err(Error::OffsetRange { offset: -1, .. })
        ));
        chkr.set_offset(SeekFrom::End(0)).unwrap();
        assert!(!chkr.advance().unwrap());
        chkr.set_offset(SeekFrom::End(-8)).unwrap();
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word_position(), Some(0));
    }

    #[test]
    fn test_operations_need_a_current_word() {
        let mut chkr = checker("sme");
        assert!(matches!(chkr.replace("some"), Err(Error::NoCurrentWord)));
        assert!(matches!(chkr.suggest(), Err(Error::NoCurrentWord)));
        assert!(matches!(chkr.leading_context(3), Err(Error::NoCurrentWord)));
        assert!(matches!(chkr.ignore_always(), Err(Error::NoCurrentWord)));
        assert!(matches!(chkr.add(), Err(Error::NoCurrentWord)));
    }

    #[test]
    fn test_empty_words_are_invalid() {
        let chkr = checker("");
        assert!(matches!(
            chkr.check(""),
            Err(Error::Dictionary(DictionaryError::InvalidWord))
        ));
    }

    #[test]
    fn test_set_text_restarts() {
        let mut chkr = checker("sme");
        assert!(chkr.advance().unwrap());
        assert!(!chkr.advance().unwrap());
        chkr.set_text("good erors");
        assert_eq!(chkr.state(), SessionState::Scanning);
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word_position(), Some(5));
    }

    #[test]
    fn test_unknown_language() {
        let built = SpellChecker::<char>::builder("tlh").dictionary(dict()).build();
        assert!(matches!(built, Err(Error::LanguageNotFound(_))));

        let fallback = SpellChecker::<char>::builder("tlh")
            .fallback("en")
            .dictionary(dict())
            .build();
        assert!(fallback.is_ok());
    }

    #[test]
    fn test_custom_tokenizer() {
        let mut chkr: SpellChecker = SpellChecker::builder("en_US")
            .text("some (sme) text")
            .dictionary(dict())
            .tokenizer(BasicTokenizer::factory())
            .build()
            .unwrap();
        assert!(chkr.advance().unwrap());
        assert_eq!(chkr.word().as_deref(), Some("sme"));
        assert_eq!(chkr.word_position(), Some(6));
    }

    #[test]
    fn test_for_dictionary_uses_its_tag() {
        let chkr = SpellChecker::<char>::for_dictionary(dict()).unwrap();
        assert_eq!(chkr.lang(), "en_US");
        assert_eq!(chkr.dictionary().tag(), "en_US");
    }
}
