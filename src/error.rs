use crate::dict::DictionaryError;
use thiserror::Error;

/// Errors raised while building or driving a spellchecking session.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no tokenizer found for language: {0}")]
    LanguageNotFound(String),

    #[error("no dictionary found for language: {0}")]
    DictionaryNotFound(String),

    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error("offset {offset} is outside the text (length {len})")]
    OffsetRange { offset: i64, len: usize },

    #[error("no word is currently being checked")]
    NoCurrentWord,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
