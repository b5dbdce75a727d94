//! Pre-segmenting text into checkable chunks.
//!
//! A chunker hands the tokenizer pipeline only the parts of a document that
//! hold prose: the text between HTML tags, the paragraphs of a Markdown file,
//! the comments of a source file. Chunks are ordinary tokens, so their
//! positions are offsets into the full document and the rest of the pipeline
//! keeps reporting positions in document coordinates.

pub mod comments;
pub mod html;
pub mod markdown;

use crate::tokenize::{BoxedTokenizer, SharedText, TextUnit, Token, Tokenizer, TokenizerFn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

pub use comments::{CommentChunker, CommentStyle};
pub use html::HtmlChunker;
pub use markdown::MarkdownChunker;

/// Splits a text buffer into chunks.
pub trait Chunker<T: TextUnit> {
    fn chunks(&self, text: SharedText<T>) -> BoxedTokenizer<T>;
}

pub type ChunkerRef<T> = Rc<dyn Chunker<T>>;

/// Use a chunker as the first stage of a tokenizer pipeline.
pub fn chunker_fn<T: TextUnit>(chunker: ChunkerRef<T>) -> TokenizerFn<T> {
    Rc::new(move |text| chunker.chunks(text))
}

/// Names of the predefined chunkers, as used in configuration files and on
/// the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkerKind {
    Html,
    Markdown,
    Comments,
}

impl ChunkerKind {
    pub fn chunker<T: TextUnit>(self) -> ChunkerRef<T> {
        match self {
            ChunkerKind::Html => Rc::new(HtmlChunker),
            ChunkerKind::Markdown => Rc::new(MarkdownChunker),
            ChunkerKind::Comments => Rc::new(CommentChunker::new(CommentStyle::CLike)),
        }
    }
}

impl FromStr for ChunkerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(ChunkerKind::Html),
            "markdown" | "md" => Ok(ChunkerKind::Markdown),
            "comments" => Ok(ChunkerKind::Comments),
            _ => Err(format!("Unknown chunker: {}", s)),
        }
    }
}

impl fmt::Display for ChunkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkerKind::Html => write!(f, "html"),
            ChunkerKind::Markdown => write!(f, "markdown"),
            ChunkerKind::Comments => write!(f, "comments"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Markdown,
    Html,
    SourceCode(CommentStyle),
    PlainText,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "md" | "mdx" | "markdown" => FileType::Markdown,
            "html" | "htm" | "xhtml" | "xml" => FileType::Html,
            "rs" | "js" | "mjs" | "cjs" | "ts" | "mts" | "cts" | "jsx" | "tsx" | "go" | "java"
            | "c" | "h" | "cpp" | "cc" | "cxx" | "hpp" | "hh" => {
                FileType::SourceCode(CommentStyle::CLike)
            }
            "py" | "pyw" | "sh" | "bash" | "rb" | "toml" | "yaml" | "yml" => {
                FileType::SourceCode(CommentStyle::Hash)
            }
            _ => FileType::PlainText,
        }
    }

    /// Chunkers that pick the prose out of this kind of file.
    pub fn chunkers<T: TextUnit>(self) -> Vec<ChunkerRef<T>> {
        match self {
            FileType::Markdown => vec![Rc::new(MarkdownChunker)],
            FileType::Html => vec![Rc::new(HtmlChunker)],
            FileType::SourceCode(style) => vec![Rc::new(CommentChunker::new(style))],
            FileType::PlainText => Vec::new(),
        }
    }
}

/// Finds chunk ranges in a whole buffer at once.
pub(crate) type SpanScanner<T> = Rc<dyn Fn(&[T]) -> Vec<Range<usize>>>;

/// Chunk stream over ranges computed up front by a scanner.
///
/// The ranges are recomputed from the live text whenever the cursor is moved
/// with `replaced` set, so edits made by a session keep the chunks aligned.
pub(crate) struct SpanChunks<T> {
    text: SharedText<T>,
    scanner: SpanScanner<T>,
    spans: Vec<Range<usize>>,
    offset: usize,
}

impl<T: TextUnit> SpanChunks<T> {
    pub(crate) fn new(text: SharedText<T>, scanner: SpanScanner<T>) -> Self {
        let spans = scanner(&text.borrow());
        Self {
            text,
            scanner,
            spans,
            offset: 0,
        }
    }
}

impl<T: TextUnit> Iterator for SpanChunks<T> {
    type Item = Token<T>;

    fn next(&mut self) -> Option<Token<T>> {
        let text = self.text.borrow();
        let span = self.spans.iter().find(|span| span.end > self.offset)?;
        let start = span.start.max(self.offset);
        let end = span.end.min(text.len());
        self.offset = span.end;
        if start >= end {
            return None;
        }
        Some(Token::new(text[start..end].to_vec(), start))
    }
}

impl<T: TextUnit> Tokenizer<T> for SpanChunks<T> {
    fn offset(&self) -> usize {
        self.offset
    }

    fn set_offset(&mut self, offset: usize, replaced: bool) {
        if replaced {
            self.spans = (self.scanner)(&self.text.borrow());
        }
        self.offset = offset;
    }
}

/// Map byte offsets of `units` decoded as UTF-8 back to unit indices.
///
/// Returns the decoded text and the byte offset at which each unit starts,
/// with one extra entry for the end of the text.
pub(crate) fn decode_with_offsets<T: TextUnit>(units: &[T]) -> Option<(String, Vec<usize>)> {
    let decoded = T::decode_exact(units)?;
    let mut starts = Vec::with_capacity(units.len() + 1);
    let mut byte = 0;
    for unit in units {
        starts.push(byte);
        byte += unit.byte_len();
    }
    starts.push(byte);
    Some((decoded, starts))
}

/// Unit index holding the byte at `byte_offset`.
pub(crate) fn unit_index(starts: &[usize], byte_offset: usize) -> usize {
    match starts.binary_search(&byte_offset) {
        Ok(index) => index,
        Err(index) => index.saturating_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_type_detection() {
        assert_eq!(
            FileType::from_path(&PathBuf::from("test.md")),
            FileType::Markdown
        );
        assert_eq!(
            FileType::from_path(&PathBuf::from("main.rs")),
            FileType::SourceCode(CommentStyle::CLike)
        );
        assert_eq!(
            FileType::from_path(&PathBuf::from("setup.py")),
            FileType::SourceCode(CommentStyle::Hash)
        );
        assert_eq!(
            FileType::from_path(&PathBuf::from("index.HTML")),
            FileType::Html
        );
        assert_eq!(
            FileType::from_path(&PathBuf::from("notes.txt")),
            FileType::PlainText
        );
    }

    #[test]
    fn test_chunker_kind_names() {
        assert_eq!("md".parse::<ChunkerKind>(), Ok(ChunkerKind::Markdown));
        assert_eq!(ChunkerKind::Comments.to_string(), "comments");
        assert!("xml".parse::<ChunkerKind>().is_err());
    }

    #[test]
    fn test_span_chunks_rescan_after_replacement() {
        let scanner: SpanScanner<char> = Rc::new(|units: &[char]| {
            let mut spans = Vec::new();
            let mut start = None;
            for (i, c) in units.iter().enumerate() {
                match (c.is_lowercase(), start) {
                    (true, None) => start = Some(i),
                    (false, Some(s)) => {
                        spans.push(s..i);
                        start = None;
                    }
                    _ => {}
                }
            }
            if let Some(s) = start {
                spans.push(s..units.len());
            }
            spans
        });
        let text = SharedText::from("ab|cd|ef");
        let mut chunks = SpanChunks::new(text.clone(), scanner);
        assert_eq!(chunks.next().map(|t| t.pos), Some(0));

        text.splice(0..2, &['x', 'y', 'z']);
        chunks.set_offset(3, true);
        let rest: Vec<_> = chunks.map(|t| (t.text(), t.pos)).collect();
        assert_eq!(rest, vec![("cd".to_string(), 4), ("ef".to_string(), 7)]);
    }

    #[test]
    fn test_decode_with_offsets() {
        let units: Vec<char> = "aé b".chars().collect();
        let (decoded, starts) = decode_with_offsets(&units).unwrap();
        assert_eq!(decoded, "aé b");
        assert_eq!(starts, vec![0, 1, 3, 4, 5]);
        assert_eq!(unit_index(&starts, 3), 2);
        assert!(decode_with_offsets(&[0xffu8]).is_none());
    }
}
