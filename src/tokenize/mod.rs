//! Splitting text into positioned word tokens.
//!
//! A tokenizer walks a shared text buffer and yields [`Token`]s whose `pos`
//! is an index into that buffer. Tokenizers compose: a [`Filter`] wraps an
//! inner tokenizer to skip some of its tokens and split the rest, and the
//! [`TokenizerRegistry`] stacks chunkers, filters and language rules into one
//! pipeline. Every layer reports positions in the coordinates of the text it
//! was originally handed.

pub mod basic;
pub mod filter;
pub mod registry;
pub mod word;

use std::cell::{Ref, RefCell};
use std::fmt;
use std::ops::Range;
use std::rc::Rc;
use unicode_segmentation::UnicodeSegmentation;

pub use basic::BasicTokenizer;
pub use filter::{
    wrap_tokenizer, EmailFilter, Filter, FilterKind, FilterRef, FilterRule, FilteredTokenizer,
    PatternFilter, UrlFilter, WikiWordFilter,
};
pub use registry::{get_tokenizer, TokenizerRegistry};
pub use word::{WordTokenizer, ENGLISH_VALID_CHARS, GERMAN_VALID_CHARS};

/// A unit of a text buffer: a decoded `char` or a raw UTF-8 byte.
///
/// Positions reported by tokenizers count units, so a `char` buffer yields
/// character indices and a byte buffer yields byte indices.
pub trait TextUnit: Copy + Eq + fmt::Debug + 'static {
    /// Width, in units, of the letter starting at `offset` including any
    /// combining marks attached to it. Zero if no letter starts there.
    fn letter_width(text: &[Self], offset: usize) -> usize;

    fn is_space(self) -> bool;

    /// Whether this unit is exactly the character `c`.
    fn is_char(self, c: char) -> bool;

    /// Number of UTF-8 bytes this unit occupies.
    fn byte_len(self) -> usize;

    fn encode(s: &str) -> Vec<Self>;

    fn decode(units: &[Self]) -> String;

    /// Decode without loss, or `None` if the units are not valid text.
    fn decode_exact(units: &[Self]) -> Option<String>;
}

/// True for characters that attach to the preceding grapheme, such as
/// combining accents.
fn extends_grapheme(c: char) -> bool {
    let mut pair = String::with_capacity(8);
    pair.push('a');
    pair.push(c);
    pair.graphemes(true).count() == 1
}

impl TextUnit for char {
    fn letter_width(text: &[char], offset: usize) -> usize {
        if !text[offset].is_alphabetic() {
            return 0;
        }
        let mut width = 1;
        while offset + width < text.len() && extends_grapheme(text[offset + width]) {
            width += 1;
        }
        width
    }

    fn is_space(self) -> bool {
        self.is_whitespace()
    }

    fn is_char(self, c: char) -> bool {
        self == c
    }

    fn byte_len(self) -> usize {
        self.len_utf8()
    }

    fn encode(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn decode(units: &[char]) -> String {
        units.iter().collect()
    }

    fn decode_exact(units: &[char]) -> Option<String> {
        Some(units.iter().collect())
    }
}

/// Decode the UTF-8 sequence starting at `offset`, returning the character
/// and its length in bytes.
fn decode_utf8_at(text: &[u8], offset: usize) -> Option<(char, usize)> {
    let width = match text[offset] {
        b if b < 0x80 => 1,
        b if b >> 5 == 0b110 => 2,
        b if b >> 4 == 0b1110 => 3,
        b if b >> 3 == 0b11110 => 4,
        _ => return None,
    };
    let bytes = text.get(offset..offset + width)?;
    let c = std::str::from_utf8(bytes).ok()?.chars().next()?;
    Some((c, width))
}

impl TextUnit for u8 {
    fn letter_width(text: &[u8], offset: usize) -> usize {
        match decode_utf8_at(text, offset) {
            Some((c, mut width)) if c.is_alphabetic() => {
                while offset + width < text.len() {
                    match decode_utf8_at(text, offset + width) {
                        Some((mark, len)) if extends_grapheme(mark) => width += len,
                        _ => break,
                    }
                }
                width
            }
            _ => 0,
        }
    }

    fn is_space(self) -> bool {
        self.is_ascii_whitespace()
    }

    fn is_char(self, c: char) -> bool {
        c.is_ascii() && self == c as u8
    }

    fn byte_len(self) -> usize {
        1
    }

    fn encode(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    fn decode(units: &[u8]) -> String {
        String::from_utf8_lossy(units).into_owned()
    }

    fn decode_exact(units: &[u8]) -> Option<String> {
        std::str::from_utf8(units).ok().map(str::to_string)
    }
}

/// A text buffer shared between a session and the tokenizers reading it.
///
/// Edits made through one handle are visible through every clone. Whoever
/// edits the buffer behind a running tokenizer must reposition it with
/// `set_offset` afterwards; no change detection happens.
pub struct SharedText<T>(Rc<RefCell<Vec<T>>>);

impl<T> Clone for SharedText<T> {
    fn clone(&self) -> Self {
        SharedText(Rc::clone(&self.0))
    }
}

impl<T: TextUnit> fmt::Debug for SharedText<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedText").field(&self.to_text()).finish()
    }
}

impl<T: TextUnit> SharedText<T> {
    pub fn new(units: Vec<T>) -> Self {
        SharedText(Rc::new(RefCell::new(units)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn borrow(&self) -> Ref<'_, Vec<T>> {
        self.0.borrow()
    }

    /// Copy out `range`, clamped to the buffer.
    pub fn slice(&self, range: Range<usize>) -> Vec<T> {
        let units = self.0.borrow();
        let end = range.end.min(units.len());
        let start = range.start.min(end);
        units[start..end].to_vec()
    }

    /// Overwrite `range` with `replacement`, which may differ in length.
    pub fn splice(&self, range: Range<usize>, replacement: &[T]) {
        self.0.borrow_mut().splice(range, replacement.iter().copied());
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.0.borrow().clone()
    }

    pub fn to_text(&self) -> String {
        T::decode(&self.0.borrow())
    }
}

impl From<&str> for SharedText<char> {
    fn from(s: &str) -> Self {
        SharedText::new(s.chars().collect())
    }
}

impl From<String> for SharedText<char> {
    fn from(s: String) -> Self {
        SharedText::from(s.as_str())
    }
}

impl From<&[u8]> for SharedText<u8> {
    fn from(bytes: &[u8]) -> Self {
        SharedText::new(bytes.to_vec())
    }
}

impl<T: TextUnit> From<Vec<T>> for SharedText<T> {
    fn from(units: Vec<T>) -> Self {
        SharedText::new(units)
    }
}

/// A word and the position of its first unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T> {
    pub word: Vec<T>,
    pub pos: usize,
}

impl<T: TextUnit> Token<T> {
    pub fn new(word: Vec<T>, pos: usize) -> Self {
        Self { word, pos }
    }

    /// Position just past the end of the word.
    pub fn end(&self) -> usize {
        self.pos + self.word.len()
    }

    pub fn text(&self) -> String {
        T::decode(&self.word)
    }
}

/// A restartable stream of tokens with a settable cursor.
///
/// Exhaustion is not permanent: moving the cursor with `set_offset` makes
/// the tokenizer scan again from the new position.
pub trait Tokenizer<T: TextUnit>: Iterator<Item = Token<T>> {
    /// Where the next scan starts.
    fn offset(&self) -> usize;

    /// Move the cursor. `replaced` tells the tokenizer that the text around
    /// the cursor was rewritten, so any buffered state is stale.
    fn set_offset(&mut self, offset: usize, replaced: bool);
}

pub type BoxedTokenizer<T> = Box<dyn Tokenizer<T>>;

/// Something that starts a tokenizer over a text buffer.
pub type TokenizerFn<T> = Rc<dyn Fn(SharedText<T>) -> BoxedTokenizer<T>>;

/// Yields the whole remaining text as a single token.
pub struct UnitTokenizer<T> {
    text: SharedText<T>,
    offset: usize,
}

impl<T: TextUnit> UnitTokenizer<T> {
    pub fn new(text: SharedText<T>) -> Self {
        Self { text, offset: 0 }
    }
}

impl<T: TextUnit> Iterator for UnitTokenizer<T> {
    type Item = Token<T>;

    fn next(&mut self) -> Option<Token<T>> {
        let text = self.text.borrow();
        if self.offset >= text.len() {
            return None;
        }
        let token = Token::new(text[self.offset..].to_vec(), self.offset);
        self.offset = text.len();
        Some(token)
    }
}

impl<T: TextUnit> Tokenizer<T> for UnitTokenizer<T> {
    fn offset(&self) -> usize {
        self.offset
    }

    fn set_offset(&mut self, offset: usize, _replaced: bool) {
        self.offset = offset;
    }
}

#[cfg(test)]
pub(crate) fn collect_tokens<T: TextUnit>(
    tokenizer: impl Iterator<Item = Token<T>>,
) -> Vec<(String, usize)> {
    tokenizer.map(|t| (t.text(), t.pos)).collect()
}
