use super::{decode_with_offsets, unit_index, Chunker, SpanChunks};
use crate::tokenize::{BoxedTokenizer, SharedText, TextUnit};
use lazy_static::lazy_static;
use regex::{Captures, Match, Regex};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::rc::Rc;

lazy_static! {
    // Alternatives are tried left to right, so a comment marker inside a
    // string literal belongs to the string.
    static ref C_LIKE_SOURCE: Regex = Regex::new(
        r#"//(?P<line>[^\n]*)|/\*(?P<block>(?s:.*?))(?:\*/|\z)|"(?P<dq>(?:[^"\\\n]|\\.)*)"?"#
    )
    .unwrap();
    static ref HASH_SOURCE: Regex = Regex::new(
        r#"#(?P<line>[^\n]*)|'''(?P<sq3>(?s:.*?))(?:'''|\z)|"""(?P<dq3>(?s:.*?))(?:"""|\z)|"(?P<dq>(?:[^"\\\n]|\\.)*)"?|'(?P<sq>(?:[^'\\\n]|\\.)*)'?"#
    )
    .unwrap();
    static ref ESCAPE: Regex = Regex::new(r"(?s)\\.?").unwrap();
}

const COMMENT_GROUPS: &[&str] = &["line", "block"];
const STRING_GROUPS: &[&str] = &["dq3", "sq3", "dq", "sq"];

/// Comment syntax of a source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStyle {
    /// `// line` and `/* block */` comments, `"double quoted"` strings.
    CLike,
    /// `# line` comments, single, double and triple quoted strings.
    Hash,
}

impl CommentStyle {
    fn pattern(self) -> &'static Regex {
        match self {
            CommentStyle::CLike => &C_LIKE_SOURCE,
            CommentStyle::Hash => &HASH_SOURCE,
        }
    }
}

/// Yields the comments and string literal bodies of a source file.
///
/// Escape sequences inside strings break the literal into separate chunks so
/// that `"one\ntwo"` never produces the word `ntwo`.
#[derive(Debug, Clone, Copy)]
pub struct CommentChunker {
    style: CommentStyle,
}

impl CommentChunker {
    pub fn new(style: CommentStyle) -> Self {
        Self { style }
    }
}

impl<T: TextUnit> Chunker<T> for CommentChunker {
    fn chunks(&self, text: SharedText<T>) -> BoxedTokenizer<T> {
        let style = self.style;
        Box::new(SpanChunks::new(
            text,
            Rc::new(move |units: &[T]| comment_spans(units, style)),
        ))
    }
}

fn first_group<'h>(caps: &Captures<'h>, groups: &[&str]) -> Option<Match<'h>> {
    groups.iter().find_map(|name| caps.name(name))
}

/// Byte ranges of a string body between its escape sequences.
fn unescaped(body: Match<'_>) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = body.start();
    for escape in ESCAPE.find_iter(body.as_str()) {
        ranges.push(start..body.start() + escape.start());
        start = body.start() + escape.end();
    }
    ranges.push(start..body.end());
    ranges
}

fn comment_spans<T: TextUnit>(units: &[T], style: CommentStyle) -> Vec<Range<usize>> {
    let Some((content, starts)) = decode_with_offsets(units) else {
        // not valid UTF-8, check everything
        return vec![0..units.len()];
    };

    let mut bytes = Vec::new();
    for caps in style.pattern().captures_iter(&content) {
        if let Some(comment) = first_group(&caps, COMMENT_GROUPS) {
            bytes.push(comment.range());
        } else if let Some(string) = first_group(&caps, STRING_GROUPS) {
            bytes.extend(unescaped(string));
        }
    }

    bytes
        .into_iter()
        .map(|range| unit_index(&starts, range.start)..unit_index(&starts, range.end))
        .filter(|range| range.start < range.end)
        .collect()
}
