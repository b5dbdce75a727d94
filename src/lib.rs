pub mod checker;
pub mod chunker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod error;
pub mod tokenize;

pub use checker::{SessionState, SpellChecker, SpellCheckerBuilder};
pub use chunker::{Chunker, ChunkerKind, FileType};
pub use config::Config;
pub use dict::{Broker, DictHandle, Dictionary, DictionaryError, FstDictionary, PwlDictionary};
pub use error::{Error, Result};
pub use tokenize::{get_tokenizer, FilterKind, SharedText, Token, Tokenizer, TokenizerRegistry};

#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    pub error_count: usize,
    pub fixed_count: usize,
    pub errors: Vec<SpellError>,
}

/// A misspelling found in a file, located for reporting.
#[derive(Debug, Clone)]
pub struct SpellError {
    pub word: String,
    pub line: usize,
    pub column: usize,
    pub context: String,
    pub suggestions: Vec<String>,
}
