use super::{
    wrap_tokenizer, BasicTokenizer, Filter, FilterRef, TextUnit, TokenizerFn, WordTokenizer,
    ENGLISH_VALID_CHARS, GERMAN_VALID_CHARS,
};
use crate::chunker::{chunker_fn, ChunkerRef};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::rc::Rc;

/// Language tags mapped to the tokenizer that applies their word rules.
pub struct TokenizerRegistry<T> {
    languages: HashMap<String, TokenizerFn<T>>,
}

impl<T: TextUnit> Default for TokenizerRegistry<T> {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("en", WordTokenizer::factory(ENGLISH_VALID_CHARS));
        registry.register("de", WordTokenizer::factory(GERMAN_VALID_CHARS));
        registry
    }
}

impl<T: TextUnit> TokenizerRegistry<T> {
    /// A registry without any language.
    pub fn empty() -> Self {
        Self {
            languages: HashMap::new(),
        }
    }

    pub fn register(&mut self, tag: &str, tokenizer: TokenizerFn<T>) {
        self.languages.insert(normalize_tag(tag), tokenizer);
    }

    pub fn languages(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.languages.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Language tokenizer for `tag`, trying the full tag, its base subtag and
    /// then `fallback`.
    pub fn lookup(&self, tag: &str, fallback: Option<&str>) -> Result<TokenizerFn<T>> {
        candidates(tag, fallback)
            .iter()
            .find_map(|candidate| self.languages.get(candidate))
            .cloned()
            .ok_or_else(|| Error::LanguageNotFound(tag.to_string()))
    }

    /// Compose the full pipeline for a language.
    ///
    /// Chunkers split the text first, the first one listed being outermost.
    /// Each chunk is split on whitespace, every filter is applied in order
    /// and the language rules split what is left into words.
    pub fn build(
        &self,
        tag: &str,
        fallback: Option<&str>,
        filters: &[FilterRef<T>],
        chunkers: &[ChunkerRef<T>],
    ) -> Result<TokenizerFn<T>> {
        let language = self.lookup(tag, fallback)?;

        let mut tokenizer = BasicTokenizer::factory();
        for chunker in chunkers.iter().rev() {
            tokenizer = wrap_tokenizer(chunker_fn(Rc::clone(chunker)), tokenizer);
        }
        for rule in filters {
            tokenizer = Filter::new(tokenizer, Rc::clone(rule)).into_fn();
        }

        log::debug!(
            "built tokenizer for {} with {} filter(s) and {} chunker(s)",
            tag,
            filters.len(),
            chunkers.len()
        );
        Ok(wrap_tokenizer(tokenizer, language))
    }
}

/// `en-US` and `en_US` name the same language.
pub fn normalize_tag(tag: &str) -> String {
    tag.replace('-', "_")
}

/// Tags to try, in order, when resolving `tag`.
pub fn candidates(tag: &str, fallback: Option<&str>) -> Vec<String> {
    let full = normalize_tag(tag);
    let mut tags = vec![full.clone()];
    if let Some((base, _)) = full.split_once('_') {
        tags.push(base.to_string());
    }
    if let Some(fallback) = fallback {
        let fallback = normalize_tag(fallback);
        if !tags.contains(&fallback) {
            tags.push(fallback);
        }
    }
    tags
}

/// Pipeline for `tag` from the default registry.
pub fn get_tokenizer<T: TextUnit>(
    tag: &str,
    filters: &[FilterRef<T>],
    chunkers: &[ChunkerRef<T>],
) -> Result<TokenizerFn<T>> {
    TokenizerRegistry::default().build(tag, None, filters, chunkers)
}
