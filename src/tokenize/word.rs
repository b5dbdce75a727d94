use super::{SharedText, TextUnit, Token, Tokenizer, TokenizerFn};
use std::rc::Rc;

/// Characters allowed inside, but never at either end of, an English word.
pub const ENGLISH_VALID_CHARS: &[char] = &['\''];

/// Characters allowed inside, but never at either end of, a German word.
pub const GERMAN_VALID_CHARS: &[char] = &['-', '.'];

/// Language tokenizer: yields maximal runs of letters.
///
/// A letter absorbs the combining marks that follow it, so composed and
/// decomposed spellings produce the same word boundaries. Characters in
/// `valid_chars` may join letters into one word but are trimmed from the
/// end; a word always starts on a letter. Digits and punctuation separate
/// words and are never returned.
pub struct WordTokenizer<T> {
    text: SharedText<T>,
    offset: usize,
    valid_chars: Rc<[char]>,
}

impl<T: TextUnit> WordTokenizer<T> {
    pub fn new(text: SharedText<T>, valid_chars: &[char]) -> Self {
        Self {
            text,
            offset: 0,
            valid_chars: Rc::from(valid_chars),
        }
    }

    pub fn english(text: SharedText<T>) -> Self {
        Self::new(text, ENGLISH_VALID_CHARS)
    }

    pub fn factory(valid_chars: &[char]) -> TokenizerFn<T> {
        let valid_chars: Rc<[char]> = Rc::from(valid_chars);
        Rc::new(move |text| {
            Box::new(WordTokenizer {
                text,
                offset: 0,
                valid_chars: Rc::clone(&valid_chars),
            })
        })
    }

    fn is_valid(&self, unit: T) -> bool {
        self.valid_chars.iter().any(|&c| unit.is_char(c))
    }
}

impl<T: TextUnit> Iterator for WordTokenizer<T> {
    type Item = Token<T>;

    fn next(&mut self) -> Option<Token<T>> {
        let text = self.text.borrow();
        let mut offset = self.offset;
        while offset < text.len() {
            while offset < text.len() && T::letter_width(&text, offset) == 0 {
                offset += 1;
            }
            let start = offset;
            while offset < text.len() {
                let width = match T::letter_width(&text, offset) {
                    0 if self.is_valid(text[offset]) => 1,
                    0 => break,
                    width => width,
                };
                offset += width;
            }
            if start != offset {
                // text[start] is a letter, so this stops before reaching it
                while self.is_valid(text[offset - 1]) {
                    offset -= 1;
                }
                self.offset = offset;
                return Some(Token::new(text[start..offset].to_vec(), start));
            }
        }
        self.offset = offset;
        None
    }
}

impl<T: TextUnit> Tokenizer<T> for WordTokenizer<T> {
    fn offset(&self) -> usize {
        self.offset
    }

    fn set_offset(&mut self, offset: usize, _replaced: bool) {
        self.offset = offset;
    }
}
