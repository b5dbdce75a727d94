use super::FstDictionary;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

// Pinned to a commit so the word list never changes under an installed tag
const WORDLIST_BASE_URL: &str =
    "https://raw.githubusercontent.com/dwyl/english-words/6e4bc58ad764c3e6df8b5be4048671962c9d6a23";
const WORDLIST_VERSION: &str = "2023.12";

#[derive(Debug, Clone)]
pub struct DictionaryInfo {
    pub language: String,
    pub path: PathBuf,
    pub word_count: usize,
    pub size_bytes: u64,
}

/// Installed `.dict` files in `data_dir`, sorted by language.
pub fn installed(data_dir: &Path) -> Result<Vec<DictionaryInfo>> {
    let mut found = Vec::new();
    if !data_dir.exists() {
        return Ok(found);
    }

    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("dict") {
            continue;
        }
        if let Some(language) = path.file_stem().and_then(|s| s.to_str()) {
            found.push(info(language, &path)?);
        }
    }

    found.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(found)
}

fn info(language: &str, path: &Path) -> Result<DictionaryInfo> {
    let size_bytes = fs::metadata(path)?.len();
    let word_count = FstDictionary::open(language, path)
        .map(|dict| dict.len())
        .with_context(|| format!("Failed to load dictionary: {}", path.display()))?;
    Ok(DictionaryInfo {
        language: language.to_string(),
        path: path.to_path_buf(),
        word_count,
        size_bytes,
    })
}

pub fn list_dictionaries(data_dir: &Path) -> Result<()> {
    let dictionaries = installed(data_dir)?;

    if dictionaries.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to download a dictionary.",
            "spellwalk dict download en_US".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();
    for dict in &dictionaries {
        println!(
            "  {} {} ({}, {})",
            "✓".green(),
            dict.language.cyan().bold(),
            format!("{} words", dict.word_count).dimmed(),
            format!("{}KB", dict.size_bytes / 1024).dimmed()
        );
    }
    println!();
    println!("Data directory: {}", data_dir.display().to_string().dimmed());

    Ok(())
}

/// Normalise a downloaded word list: one lower-case word per line.
pub fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

pub fn download_dictionary(language: &str, data_dir: &Path) -> Result<()> {
    let wordlist_url = match language {
        "en" | "en_US" | "en_GB" => format!("{}/words_alpha.txt", WORDLIST_BASE_URL),
        other => {
            anyhow::bail!(
                "Language '{}' is not supported. Only 'en_US' and 'en_GB' are currently available.",
                other
            );
        }
    };

    println!(
        "{} dictionary for {} (version: {})...",
        "Downloading".cyan().bold(),
        language.yellow(),
        WORDLIST_VERSION.dimmed()
    );
    println!("Source: {}", wordlist_url.dimmed());

    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid progress template")?,
    );
    pb.set_message("Downloading...");

    let response =
        reqwest::blocking::get(&wordlist_url).context("Failed to download dictionary")?;
    if !response.status().is_success() {
        pb.finish_and_clear();
        anyhow::bail!("Failed to download dictionary: HTTP {}", response.status());
    }
    let content = response.text()?;
    pb.finish_with_message("Download complete");

    println!("{}", "Building dictionary...".cyan());
    let words = parse_wordlist(&content);
    println!("Found {} words", words.len().to_string().yellow());

    let dict_path = data_dir.join(format!("{}.dict", language));
    FstDictionary::build_from_words(&words, &dict_path)
        .with_context(|| format!("Failed to build dictionary: {}", dict_path.display()))?;
    log::info!("installed {} words at {}", words.len(), dict_path.display());

    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dict_path.display().to_string().cyan()
    );

    Ok(())
}

pub fn show_info(language: &str, data_dir: &Path) -> Result<()> {
    let dict_path = data_dir.join(format!("{}.dict", language));

    if !dict_path.exists() {
        println!(
            "{} Dictionary for {} not found.",
            "✗".red().bold(),
            language.yellow()
        );
        println!(
            "Run {} to download it.",
            format!("spellwalk dict download {}", language).cyan()
        );
        return Ok(());
    }

    println!("{}", format!("Dictionary: {}", language).bold());
    println!("  Path: {}", dict_path.display());

    match info(language, &dict_path) {
        Ok(info) => {
            println!("  Size: {} KB", info.size_bytes / 1024);
            println!("  Words: {}", info.word_count);
        }
        Err(e) => {
            println!("  {}: {:#}", "Error loading dictionary".red(), e);
        }
    }
    println!("  Format: FST (Finite State Transducer)");

    Ok(())
}
