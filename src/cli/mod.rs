//! Checking files on disk with a [`SpellChecker`] session per file.

pub mod interactive;
pub mod output;

use crate::chunker::{ChunkerRef, FileType};
use crate::dict::{Broker, DictHandle, DictWithPwl, Dictionary, PwlDictionary};
use crate::tokenize::{FilterRef, PatternFilter};
use crate::{CheckResult, Config, SpellChecker, SpellError};
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use interactive::{CmdLineChecker, Outcome};
use regex::Regex;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Expand directories into the files below them, honouring `.gitignore`.
/// Plain file arguments are kept as given.
pub fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkBuilder::new(path).build() {
            match entry {
                Ok(entry) if entry.file_type().map_or(false, |ft| ft.is_file()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => log::warn!("skipping entry under {}: {}", path.display(), e),
            }
        }
    }
    files
}

/// Line and column (both 1-based) of `pos` in `text`, plus that line.
fn locate(text: &[char], pos: usize) -> (usize, usize, String) {
    let before = &text[..pos.min(text.len())];
    let line = before.iter().filter(|&&c| c == '\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&c| c == '\n')
        .map_or(0, |i| i + 1);
    let line_end = text[line_start..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(text.len(), |i| line_start + i);
    let context: String = text[line_start..line_end].iter().collect();
    (line, pos - line_start + 1, context.trim().to_string())
}

/// Runs spellchecking sessions over files using one configuration.
pub struct FileChecker {
    config: Config,
    broker: Broker,
    patterns: Vec<Regex>,
    // Keeps the word list loaded between files
    _base: DictHandle,
}

impl FileChecker {
    pub fn new(config: Config) -> Result<Self> {
        let mut broker = Broker::empty();
        if let Some(dir) = config.dictionary_dir() {
            broker = broker.with_data_dir(dir);
        }
        let base = broker.request_dict(&config.language).with_context(|| {
            format!(
                "Run `spellwalk dict download {}` to install a dictionary",
                config.language
            )
        })?;

        let mut patterns = Vec::new();
        for pattern in &config.ignore_patterns {
            match Regex::new(pattern) {
                Ok(re) => patterns.push(re),
                Err(e) => log::warn!("invalid ignore pattern '{}': {}", pattern, e),
            }
        }

        Ok(Self {
            config,
            broker,
            patterns,
            _base: base,
        })
    }

    fn dictionary(&self) -> Result<Box<dyn Dictionary>> {
        let base = self.broker.request_dict(&self.config.language)?;
        match &self.config.personal_dictionary {
            Some(path) => {
                let pwl = PwlDictionary::open(path).with_context(|| {
                    format!("Failed to open personal dictionary: {}", path.display())
                })?;
                Ok(Box::new(DictWithPwl::new(Box::new(base), pwl)))
            }
            None => Ok(Box::new(base)),
        }
    }

    fn chunkers(&self, path: &Path) -> Vec<ChunkerRef<char>> {
        if self.config.chunkers.is_empty() {
            FileType::from_path(path).chunkers()
        } else {
            self.config.chunkers.iter().map(|kind| kind.chunker()).collect()
        }
    }

    fn filters(&self) -> Vec<FilterRef<char>> {
        let mut filters: Vec<FilterRef<char>> =
            self.config.filters.iter().map(|kind| kind.rule()).collect();
        filters.extend(
            self.patterns
                .iter()
                .map(|re| Rc::new(PatternFilter::new(re.clone())) as FilterRef<char>),
        );
        filters
    }

    /// A session over `text`, set up for the kind of file at `path`.
    pub fn session(&self, path: &Path, text: &str) -> Result<SpellChecker> {
        let checker = SpellChecker::builder(&self.config.language)
            .dictionary(self.dictionary()?)
            .filters(self.filters())
            .chunkers(self.chunkers(path))
            .text(text)
            .build()?;
        Ok(checker)
    }

    /// Add words to the personal dictionary.
    pub fn add_words(&self, words: &[String]) -> Result<()> {
        let mut dict = self.dictionary()?;
        for word in words {
            dict.add(word)
                .with_context(|| format!("Failed to add '{}' to the dictionary", word))?;
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }

    fn write(path: &Path, text: &str) -> Result<()> {
        fs::write(path, text).with_context(|| format!("Failed to write file: {}", path.display()))
    }

    pub fn check(&self, path: &Path) -> Result<CheckResult> {
        let content = Self::read(path)?;
        let mut checker = self.session(path, &content)?;
        let text: Vec<char> = content.chars().collect();

        let mut errors = Vec::new();
        while checker.advance()? {
            let (Some(word), Some(pos)) = (checker.word(), checker.word_position()) else {
                break;
            };
            let (line, column, context) = locate(&text, pos);
            let mut suggestions = checker.suggest()?;
            suggestions.truncate(self.config.max_suggestions);
            errors.push(SpellError {
                word,
                line,
                column,
                context,
                suggestions,
            });
        }
        log::debug!("{}: {} misspellings", path.display(), errors.len());

        Ok(CheckResult {
            error_count: errors.len(),
            fixed_count: 0,
            errors,
        })
    }

    /// Replace every misspelling that has a suggestion with the best one.
    pub fn fix_auto(&self, path: &Path) -> Result<CheckResult> {
        let content = Self::read(path)?;
        let mut checker = self.session(path, &content)?;

        let mut fixed_count = 0;
        let mut error_count = 0;
        let mut more = checker.advance()?;
        while more {
            more = match checker.suggest()?.first() {
                Some(best) => {
                    log::info!(
                        "{}: {:?} -> {:?}",
                        path.display(),
                        checker.word().unwrap_or_default(),
                        best
                    );
                    fixed_count += 1;
                    checker.replace(best)?
                }
                None => {
                    error_count += 1;
                    checker.advance()?
                }
            };
        }

        if fixed_count > 0 {
            Self::write(path, &checker.text_string())?;
        }

        Ok(CheckResult {
            error_count,
            fixed_count,
            errors: Vec::new(),
        })
    }

    /// Walk the misspellings of `path` with the command loop.
    pub fn fix_interactive<R: BufRead, W: Write>(
        &self,
        path: &Path,
        input: R,
        mut output: W,
        colored: bool,
    ) -> Result<(CheckResult, Outcome)> {
        let content = Self::read(path)?;
        let mut checker = self.session(path, &content)?;
        writeln!(output, "\n{}", path.display())?;

        let mut commands = CmdLineChecker::new(input, output, colored, self.config.max_suggestions);
        let outcome = commands.run(&mut checker)?;
        let mut fixed_count = commands.corrections();

        let text = checker.text_string();
        if outcome.keeps_changes() && text != content {
            Self::write(path, &text)?;
        } else if !outcome.keeps_changes() {
            fixed_count = 0;
        }

        Ok((
            CheckResult {
                error_count: 0,
                fixed_count,
                errors: Vec::new(),
            },
            outcome,
        ))
    }
}
