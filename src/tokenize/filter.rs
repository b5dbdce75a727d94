use super::{BoxedTokenizer, SharedText, TextUnit, Token, Tokenizer, TokenizerFn, UnitTokenizer};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(r"^[a-zA-Z]+://[^\s].*").unwrap();
    static ref WIKI_WORD_PATTERN: Regex = Regex::new(r"^([A-Z]\w+[A-Z]+\w+)").unwrap();
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^.+@[^.].*\.[a-z]{2,}$").unwrap();
}

/// What a [`Filter`] does with each token of the tokenizer it wraps.
pub trait FilterRule<T: TextUnit> {
    /// Drop the token entirely.
    fn skip(&self, _word: &[T]) -> bool {
        false
    }

    /// Break a kept token into smaller ones. Positions of the sub-tokens are
    /// relative to the start of `word`.
    fn split(&self, word: SharedText<T>) -> BoxedTokenizer<T> {
        Box::new(UnitTokenizer::new(word))
    }
}

pub type FilterRef<T> = Rc<dyn FilterRule<T>>;

/// Skips tokens that look like `scheme://...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlFilter;

impl<T: TextUnit> FilterRule<T> for UrlFilter {
    fn skip(&self, word: &[T]) -> bool {
        URL_PATTERN.is_match(&T::decode(word))
    }
}

/// Skips CamelCase words with at least two capitals.
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiWordFilter;

impl<T: TextUnit> FilterRule<T> for WikiWordFilter {
    fn skip(&self, word: &[T]) -> bool {
        WIKI_WORD_PATTERN.is_match(&T::decode(word))
    }
}

/// Skips tokens shaped like `local@domain.tld`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailFilter;

impl<T: TextUnit> FilterRule<T> for EmailFilter {
    fn skip(&self, word: &[T]) -> bool {
        EMAIL_PATTERN.is_match(&T::decode(word))
    }
}

/// Skips tokens matching a user-supplied regular expression.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    pattern: Regex,
}

impl PatternFilter {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl<T: TextUnit> FilterRule<T> for PatternFilter {
    fn skip(&self, word: &[T]) -> bool {
        self.pattern.is_match(&T::decode(word))
    }
}

/// Splits every token with another tokenizer.
struct SplitWith<T>(TokenizerFn<T>);

impl<T: TextUnit> FilterRule<T> for SplitWith<T> {
    fn split(&self, word: SharedText<T>) -> BoxedTokenizer<T> {
        (self.0)(word)
    }
}

/// Names of the predefined filters, as used in configuration files and on
/// the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Url,
    WikiWord,
    Email,
}

impl FilterKind {
    pub fn rule<T: TextUnit>(self) -> FilterRef<T> {
        match self {
            FilterKind::Url => Rc::new(UrlFilter),
            FilterKind::WikiWord => Rc::new(WikiWordFilter),
            FilterKind::Email => Rc::new(EmailFilter),
        }
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "url" => Ok(FilterKind::Url),
            "wikiword" => Ok(FilterKind::WikiWord),
            "email" => Ok(FilterKind::Email),
            _ => Err(format!("Unknown filter: {}", s)),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Url => write!(f, "url"),
            FilterKind::WikiWord => write!(f, "wikiword"),
            FilterKind::Email => write!(f, "email"),
        }
    }
}

/// Wraps a tokenizer so that its tokens pass through a [`FilterRule`].
///
/// Filters nest: the wrapped tokenizer may itself be a filter.
#[derive(Clone)]
pub struct Filter<T> {
    inner: TokenizerFn<T>,
    rule: FilterRef<T>,
}

impl<T: TextUnit> Filter<T> {
    pub fn new(inner: TokenizerFn<T>, rule: FilterRef<T>) -> Self {
        Self { inner, rule }
    }

    pub fn tokenize(&self, text: SharedText<T>) -> FilteredTokenizer<T> {
        FilteredTokenizer {
            inner: (self.inner)(text),
            rule: Rc::clone(&self.rule),
            active: None,
        }
    }

    pub fn into_fn(self) -> TokenizerFn<T> {
        Rc::new(move |text| Box::new(self.tokenize(text)))
    }
}

/// Feed every token of `outer` through `inner` and flatten the result.
///
/// Positions from `inner` are shifted by the start of the `outer` token, so
/// the combined stream reports positions in `outer`'s text.
pub fn wrap_tokenizer<T: TextUnit>(outer: TokenizerFn<T>, inner: TokenizerFn<T>) -> TokenizerFn<T> {
    Filter::new(outer, Rc::new(SplitWith(inner))).into_fn()
}

/// The base token currently being split.
struct ActiveSplit<T> {
    tokenizer: BoxedTokenizer<T>,
    start: usize,
    len: usize,
}

impl<T> ActiveSplit<T> {
    fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.start + self.len
    }
}

/// Token stream produced by a [`Filter`].
pub struct FilteredTokenizer<T> {
    inner: BoxedTokenizer<T>,
    rule: FilterRef<T>,
    active: Option<ActiveSplit<T>>,
}

impl<T: TextUnit> Iterator for FilteredTokenizer<T> {
    type Item = Token<T>;

    fn next(&mut self) -> Option<Token<T>> {
        loop {
            if let Some(active) = self.active.as_mut() {
                if let Some(token) = active.tokenizer.next() {
                    return Some(Token::new(token.word, token.pos + active.start));
                }
                self.active = None;
            }

            let base = loop {
                let candidate = self.inner.next()?;
                if !self.rule.skip(&candidate.word) {
                    break candidate;
                }
            };
            let len = base.word.len();
            self.active = Some(ActiveSplit {
                tokenizer: self.rule.split(SharedText::new(base.word)),
                start: base.pos,
                len,
            });
        }
    }
}

impl<T: TextUnit> Tokenizer<T> for FilteredTokenizer<T> {
    fn offset(&self) -> usize {
        match &self.active {
            Some(active) => active.start + active.tokenizer.offset(),
            None => self.inner.offset(),
        }
    }

    fn set_offset(&mut self, offset: usize, replaced: bool) {
        // Moving within the word being split only repositions the split; the
        // inner tokenizer already sits past that word.
        if !replaced {
            if let Some(active) = self.active.as_mut().filter(|a| a.contains(offset)) {
                active.tokenizer.set_offset(offset - active.start, false);
                return;
            }
        }
        self.active = None;
        self.inner.set_offset(offset, replaced);
    }
}
