use super::{decode_with_offsets, unit_index, Chunker, SpanChunks};
use crate::tokenize::{BoxedTokenizer, SharedText, TextUnit};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::ops::Range;
use std::rc::Rc;

/// Yields the prose of a CommonMark document: paragraphs, headings, list
/// items and link text. Code blocks, inline code and raw HTML are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownChunker;

impl<T: TextUnit> Chunker<T> for MarkdownChunker {
    fn chunks(&self, text: SharedText<T>) -> BoxedTokenizer<T> {
        Box::new(SpanChunks::new(text, Rc::new(markdown_spans::<T>)))
    }
}

fn markdown_spans<T: TextUnit>(units: &[T]) -> Vec<Range<usize>> {
    let Some((content, starts)) = decode_with_offsets(units) else {
        // not valid UTF-8, nothing markdown-aware can be done
        return vec![0..units.len()];
    };

    let mut spans: Vec<Range<usize>> = Vec::new();
    let mut in_code_block = false;

    for (event, range) in Parser::new(&content).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(_) if !in_code_block => {
                let start = unit_index(&starts, range.start);
                let end = unit_index(&starts, range.end);
                match spans.last_mut() {
                    // the parser splits text at some punctuation; glue it back
                    Some(last) if last.end == start => last.end = end,
                    _ if start < end => spans.push(start..end),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::collect_tokens;

    fn chunks(text: &str) -> Vec<(String, usize)> {
        collect_tokens(Chunker::<char>::chunks(&MarkdownChunker, SharedText::from(text)))
    }

    #[test]
    fn test_markdown_parsing() {
        let content = r#"
# Title

This is a test paragraph with some words.

```rust
fn main() {
    println!("This should be ignored");
}
```

More text with `inline_code` here.
"#;

        let found = chunks(content);
        assert!(found.iter().any(|(c, _)| c == "Title"));
        assert!(found.iter().all(|(c, _)| !c.contains("println")));
        assert!(found.iter().all(|(c, _)| !c.contains("inline_code")));

        let chars: Vec<char> = content.chars().collect();
        for (chunk, pos) in found {
            let len = chunk.chars().count();
            assert_eq!(chars[pos..pos + len].iter().collect::<String>(), chunk);
        }
    }

    #[test]
    fn test_link_text_kept_destination_dropped() {
        let found = chunks("See [the guide](https://example.com/guide) now.");
        let joined: String = found.iter().map(|(c, _)| c.as_str()).collect();
        assert!(joined.contains("the guide"));
        assert!(!joined.contains("example"));
    }

    #[test]
    fn test_positions_count_characters() {
        let found = chunks("Ünïcödé *wörds*");
        assert_eq!(found.last().map(|(c, p)| (c.as_str(), *p)), Some(("wörds", 9)));
    }
}
