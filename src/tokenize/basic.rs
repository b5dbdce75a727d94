use super::{SharedText, TextUnit, Token, Tokenizer, TokenizerFn};
use std::rc::Rc;

const STRIP_FROM_START: &[char] = &['"', '\'', '`', '(', '['];
const STRIP_FROM_END: &[char] = &['"', '\'', '`', ']', ')', '.', '!', ',', '?', ';', ':'];

fn is_any<T: TextUnit>(unit: T, set: &[char]) -> bool {
    set.iter().any(|&c| unit.is_char(c))
}

/// Whitespace tokenizer that trims quotes, brackets and sentence punctuation
/// from each run.
///
/// This is the outer layer of every language pipeline: language rules are
/// applied to the words it produces.
pub struct BasicTokenizer<T> {
    text: SharedText<T>,
    offset: usize,
}

impl<T: TextUnit> BasicTokenizer<T> {
    pub fn new(text: SharedText<T>) -> Self {
        Self { text, offset: 0 }
    }

    pub fn factory() -> TokenizerFn<T> {
        Rc::new(|text| Box::new(BasicTokenizer::new(text)))
    }
}

impl<T: TextUnit> Iterator for BasicTokenizer<T> {
    type Item = Token<T>;

    fn next(&mut self) -> Option<Token<T>> {
        let text = self.text.borrow();
        let mut offset = self.offset;
        while offset < text.len() {
            while offset < text.len() && text[offset].is_space() {
                offset += 1;
            }
            let mut start = offset;
            while offset < text.len() && !text[offset].is_space() {
                offset += 1;
            }
            let mut end = offset;
            self.offset = offset;

            while start < end && is_any(text[start], STRIP_FROM_START) {
                start += 1;
            }
            while end > start && is_any(text[end - 1], STRIP_FROM_END) {
                end -= 1;
            }
            if start < end {
                return Some(Token::new(text[start..end].to_vec(), start));
            }
        }
        self.offset = offset;
        None
    }
}

impl<T: TextUnit> Tokenizer<T> for BasicTokenizer<T> {
    fn offset(&self) -> usize {
        self.offset
    }

    fn set_offset(&mut self, offset: usize, _replaced: bool) {
        self.offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::collect_tokens;

    fn tokens(text: &str) -> Vec<(String, usize)> {
        collect_tokens(BasicTokenizer::new(SharedText::from(text)))
    }

    fn expected(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
        pairs.iter().map(|(w, p)| (w.to_string(), *p)).collect()
    }

    #[test]
    fn test_whitespace_runs() {
        let input = "This is a paragraph.  It's not very special, but it's designed\n\
2 show how the splitter works with many-different combos\n\
of words. Also need to \"test\" the (handling) of 'quoted' words.";
        assert_eq!(
            tokens(input),
            expected(&[
                ("This", 0),
                ("is", 5),
                ("a", 8),
                ("paragraph", 10),
                ("It's", 22),
                ("not", 27),
                ("very", 31),
                ("special", 36),
                ("but", 45),
                ("it's", 49),
                ("designed", 54),
                ("2", 63),
                ("show", 65),
                ("how", 70),
                ("the", 74),
                ("splitter", 78),
                ("works", 87),
                ("with", 93),
                ("many-different", 98),
                ("combos", 113),
                ("of", 120),
                ("words", 123),
                ("Also", 130),
                ("need", 135),
                ("to", 140),
                ("test", 144),
                ("the", 150),
                ("handling", 155),
                ("of", 165),
                ("quoted", 169),
                ("words", 177),
            ])
        );
    }

    #[test]
    fn test_strip_edge_cases() {
        let input = "((' <this> \"\" 'text' has (lots) of (special chars} >>]";
        assert_eq!(
            tokens(input),
            expected(&[
                ("<this>", 4),
                ("text", 15),
                ("has", 21),
                ("lots", 26),
                ("of", 32),
                ("special", 36),
                ("chars}", 44),
                (">>", 51),
            ])
        );
    }

    #[test]
    fn test_empty_and_blank_text() {
        assert!(tokens("").is_empty());
        assert!(tokens("   \n\t ").is_empty());
        assert!(tokens("\"\" () ...").is_empty());
    }

    #[test]
    fn test_restart_from_offset() {
        let mut tk = BasicTokenizer::new(SharedText::from("one two three"));
        assert_eq!(tk.next().unwrap().pos, 0);
        assert_eq!(tk.offset(), 3);
        tk.set_offset(5, false);
        let resumed = tk.next().unwrap();
        assert_eq!((resumed.text(), resumed.pos), ("wo".to_string(), 5));
    }

    #[test]
    fn test_byte_buffer() {
        let found = collect_tokens(BasicTokenizer::new(SharedText::from(&b"(hi) there."[..])));
        assert_eq!(found, expected(&[("hi", 1), ("there", 5)]));
    }
}
