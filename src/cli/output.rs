use crate::CheckResult;
use anyhow::{Context, Result};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub word: String,
    pub suggestions: Vec<String>,
    pub context: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput {
    pub files_checked: usize,
    pub total_errors: usize,
    pub total_fixed: usize,
    pub errors: Vec<JsonError>,
}

/// Collects per-file results and prints them in the chosen format.
///
/// Text reports are printed as each file comes in. JSON is a single document
/// written by [`Report::finish`].
pub struct Report {
    format: OutputFormat,
    colored: bool,
    files_checked: usize,
    total_errors: usize,
    total_fixed: usize,
    json_errors: Vec<JsonError>,
}

impl Report {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self {
            format,
            colored,
            files_checked: 0,
            total_errors: 0,
            total_fixed: 0,
            json_errors: Vec::new(),
        }
    }

    pub fn total_errors(&self) -> usize {
        self.total_errors
    }

    pub fn total_fixed(&self) -> usize {
        self.total_fixed
    }

    pub fn add(&mut self, file_path: &Path, result: &CheckResult) {
        self.files_checked += 1;
        self.total_errors += result.error_count;
        self.total_fixed += result.fixed_count;

        match self.format {
            OutputFormat::Text => print_text_errors(file_path, result, self.colored),
            OutputFormat::Json => {
                let file = file_path.display().to_string();
                self.json_errors
                    .extend(result.errors.iter().map(|e| JsonError {
                        file: file.clone(),
                        line: e.line,
                        column: e.column,
                        word: e.word.clone(),
                        suggestions: e.suggestions.clone(),
                        context: e.context.clone(),
                    }));
            }
        }
    }

    /// Print the summary, or the JSON document.
    pub fn finish(self, fixing: bool) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let output = JsonOutput {
                    files_checked: self.files_checked,
                    total_errors: self.total_errors,
                    total_fixed: self.total_fixed,
                    errors: self.json_errors,
                };
                let json =
                    serde_json::to_string_pretty(&output).context("Failed to serialize report")?;
                println!("{}", json);
            }
            OutputFormat::Text if fixing => {
                print_fix_summary(self.total_fixed, self.files_checked, self.colored)
            }
            OutputFormat::Text => {
                print_check_summary(self.total_errors, self.files_checked, self.colored)
            }
        }
        Ok(())
    }
}

fn print_text_errors(file_path: &Path, result: &CheckResult, colored_output: bool) {
    if result.errors.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for error in &result.errors {
        let line_info = format!("{}:{}", error.line, error.column);

        if colored_output {
            println!(
                "  {} {} {}",
                line_info.blue().bold(),
                error.word.red().bold(),
                format_context(&error.context, &error.word, colored_output)
            );

            if !error.suggestions.is_empty() {
                let suggestions = error
                    .suggestions
                    .iter()
                    .map(|s| s.green().to_string())
                    .collect::<Vec<_>>()
                    .join(&", ".dimmed().to_string());
                println!("    {} {}", "→".dimmed(), suggestions);
            }
        } else {
            println!("  {} {} {}", line_info, error.word, &error.context);

            if !error.suggestions.is_empty() {
                println!("    → {}", error.suggestions.join(", "));
            }
        }
    }
}

/// Highlight `word` within `context`.
pub fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored && !word.is_empty() {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

fn print_check_summary(total_errors: usize, files: usize, colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No spelling errors found!".green().bold());
        } else {
            println!("✓ No spelling errors found!");
        }
    } else {
        let error_word = plural(total_errors, "error", "errors");
        let file_word = plural(files, "file", "files");
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files,
                file_word
            );
        } else {
            println!("✗ {} {} found in {} {}", total_errors, error_word, files, file_word);
        }
    }
}

fn print_fix_summary(total_fixed: usize, files: usize, colored: bool) {
    println!();
    if total_fixed == 0 {
        if colored {
            println!("{}", "No corrections made.".green().bold());
        } else {
            println!("No corrections made.");
        }
    } else {
        let fix_word = plural(total_fixed, "correction", "corrections");
        let file_word = plural(files, "file", "files");
        if colored {
            println!(
                "{} {} {} applied to {} {}",
                "✓".green().bold(),
                total_fixed.to_string().green().bold(),
                fix_word,
                files,
                file_word
            );
        } else {
            println!("✓ {} {} applied to {} {}", total_fixed, fix_word, files, file_word);
        }
    }
}
