use crate::chunker::ChunkerKind;
use crate::tokenize::FilterKind;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const LOCAL_CONFIG_FILE: &str = ".spellwalk.toml";
const FALLBACK_LANGUAGE: &str = "en_US";
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_MESSAGES", "LANG"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub personal_dictionary: Option<PathBuf>,

    /// Directory holding `<tag>.dict` files, ahead of the default data dir.
    #[serde(default)]
    pub dictionary_dir: Option<PathBuf>,

    #[serde(default)]
    pub filters: Vec<FilterKind>,

    /// Chunkers for every file. Empty picks them by file type.
    #[serde(default)]
    pub chunkers: Vec<ChunkerKind>,

    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

/// The language of the user's locale, or `en_US` when none is set.
pub fn default_language() -> String {
    LOCALE_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| locale_language(&value))
        .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
}

/// Language tag of a locale name: `de_DE.UTF-8@euro` is `de_DE`. The `C` and
/// `POSIX` locales name no language.
pub fn locale_language(locale: &str) -> Option<String> {
    let tag = locale.split(['.', '@']).next().unwrap_or_default().trim();
    match tag {
        "" | "C" | "POSIX" => None,
        tag => Some(tag.to_string()),
    }
}

fn default_max_suggestions() -> usize {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            personal_dictionary: None,
            dictionary_dir: None,
            filters: vec![FilterKind::Url, FilterKind::Email],
            chunkers: Vec::new(),
            ignore_patterns: vec![
                r"^[A-Z0-9_]{2,}[.,;:!?]*$".to_string(), // ALL_CAPS
                r"^[a-fA-F0-9]{32,}$".to_string(),       // Hashes
            ],
            max_suggestions: default_max_suggestions(),
        }
    }
}

/// Settings given on the command line. `None` and empty lists leave the
/// file configuration alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub language: Option<String>,
    pub personal_dictionary: Option<PathBuf>,
    pub dictionary_dir: Option<PathBuf>,
    pub filters: Vec<FilterKind>,
    pub chunkers: Vec<ChunkerKind>,
    pub ignore_patterns: Vec<String>,
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(overrides: Overrides) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                log::debug!("reading global config {}", global_path.display());
                config = config.merge(Self::from_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            log::debug!("reading local config {}", local_path.display());
            config = config.merge(Self::from_file(&local_path)?);
        }

        config.apply(overrides);

        if config.personal_dictionary.is_none() {
            config.personal_dictionary = Self::default_personal_dict_path();
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Values equal to the defaults are treated as unset
        if other.language != default_language() {
            self.language = other.language;
        }
        if other.personal_dictionary.is_some() {
            self.personal_dictionary = other.personal_dictionary;
        }
        if other.dictionary_dir.is_some() {
            self.dictionary_dir = other.dictionary_dir;
        }
        if !other.filters.is_empty() {
            self.filters = other.filters;
        }
        if !other.chunkers.is_empty() {
            self.chunkers = other.chunkers;
        }
        if !other.ignore_patterns.is_empty() {
            self.ignore_patterns = other.ignore_patterns;
        }
        if other.max_suggestions != default_max_suggestions() {
            self.max_suggestions = other.max_suggestions;
        }
        self
    }

    fn apply(&mut self, overrides: Overrides) {
        if let Some(language) = overrides.language {
            self.language = language;
        }
        if let Some(dict) = overrides.personal_dictionary {
            self.personal_dictionary = Some(dict);
        }
        if let Some(dir) = overrides.dictionary_dir {
            self.dictionary_dir = Some(dir);
        }
        if !overrides.filters.is_empty() {
            self.filters = overrides.filters;
        }
        if !overrides.chunkers.is_empty() {
            self.chunkers = overrides.chunkers;
        }
        self.ignore_patterns.extend(overrides.ignore_patterns);
    }

    /// Where `.dict` files are looked up and installed.
    pub fn dictionary_dir(&self) -> Option<PathBuf> {
        self.dictionary_dir.clone().or_else(Self::data_dir)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellwalk").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn default_personal_dict_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellwalk").map(|dirs| dirs.config_dir().join("personal.txt"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellwalk").map(|dirs| dirs.data_dir().to_path_buf())
    }
}
