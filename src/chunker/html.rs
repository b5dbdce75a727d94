use super::Chunker;
use crate::tokenize::{BoxedTokenizer, SharedText, TextUnit, Token, Tokenizer};

/// Yields the text between HTML tags.
///
/// A `<` starts a tag only when a letter or `/` follows it; the tag runs to
/// the next `>`. A `<` that starts no tag, or a tag that is never closed, is
/// dropped and the text after it forms the next chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlChunker;

impl<T: TextUnit> Chunker<T> for HtmlChunker {
    fn chunks(&self, text: SharedText<T>) -> BoxedTokenizer<T> {
        Box::new(HtmlChunks { text, offset: 0 })
    }
}

struct HtmlChunks<T> {
    text: SharedText<T>,
    offset: usize,
}

fn is_tag<T: TextUnit>(text: &[T], offset: usize) -> bool {
    offset + 1 < text.len()
        && (T::letter_width(text, offset + 1) > 0 || text[offset + 1].is_char('/'))
}

impl<T: TextUnit> Iterator for HtmlChunks<T> {
    type Item = Token<T>;

    fn next(&mut self) -> Option<Token<T>> {
        let text = self.text.borrow();
        let mut offset = self.offset;
        while offset < text.len() {
            if text[offset].is_char('<') {
                let tag_start = offset;
                offset += 1;
                if is_tag(&text, tag_start) {
                    match text[offset..].iter().position(|unit| unit.is_char('>')) {
                        Some(close) => offset += close + 1,
                        None => offset = tag_start + 1,
                    }
                }
            }
            let start = offset;
            while offset < text.len() && !text[offset].is_char('<') {
                offset += 1;
            }
            self.offset = offset;
            if start < offset {
                return Some(Token::new(text[start..offset].to_vec(), start));
            }
        }
        self.offset = offset;
        None
    }
}

impl<T: TextUnit> Tokenizer<T> for HtmlChunks<T> {
    fn offset(&self) -> usize {
        self.offset
    }

    fn set_offset(&mut self, offset: usize, _replaced: bool) {
        self.offset = offset;
    }
}
