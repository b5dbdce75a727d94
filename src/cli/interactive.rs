//! Command loop for correcting one text interactively.
//!
//! Each misspelling is shown with its suggestions and a command is read:
//!
//! | command | action |
//! |---|---|
//! | `0..N` | replace with the numbered suggestion |
//! | `R0..RN` | always replace with the numbered suggestion |
//! | `i` | ignore this word |
//! | `I` | always ignore this word |
//! | `a` | add the word to the personal dictionary |
//! | `e` | type a replacement |
//! | `s` | stop checking and keep the changes |
//! | `q` | quit, discarding all changes |
//! | `h` | help |

use super::output::format_context;
use crate::tokenize::TextUnit;
use crate::SpellChecker;
use anyhow::Result;
use colored::*;
use std::io::{BufRead, Write};

const CONTEXT_CHARS: usize = 30;

/// How a run of the command loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every misspelling was handled.
    Finished,
    /// The user asked to stop early and keep what was changed.
    Stopped,
    /// The user asked to throw the changes away.
    Quit,
}

impl Outcome {
    pub fn keeps_changes(self) -> bool {
        self != Outcome::Quit
    }
}

enum Step {
    /// The session moved; `true` if it stopped at another error.
    Moved(bool),
    Again,
    Stop,
    Quit,
}

pub struct CmdLineChecker<R, W> {
    input: R,
    output: W,
    colored: bool,
    max_suggestions: usize,
    corrections: usize,
}

impl<R: BufRead, W: Write> CmdLineChecker<R, W> {
    pub fn new(input: R, output: W, colored: bool, max_suggestions: usize) -> Self {
        Self {
            input,
            output,
            colored,
            max_suggestions,
            corrections: 0,
        }
    }

    /// Words replaced so far, including the ones replaced automatically
    /// after an `R` command.
    pub fn corrections(&self) -> usize {
        self.corrections
    }

    pub fn run<T: TextUnit>(&mut self, checker: &mut SpellChecker<T>) -> Result<Outcome> {
        let before = checker.replacements();
        let outcome = self.walk(checker);
        self.corrections += checker.replacements() - before;
        outcome
    }

    fn walk<T: TextUnit>(&mut self, checker: &mut SpellChecker<T>) -> Result<Outcome> {
        let mut more = checker.advance()?;
        while more {
            self.show_error(checker)?;
            more = loop {
                match self.read_command(checker)? {
                    Step::Moved(more) => break more,
                    Step::Again => continue,
                    Step::Stop => return Ok(Outcome::Stopped),
                    Step::Quit => return Ok(Outcome::Quit),
                }
            };
        }
        Ok(Outcome::Finished)
    }

    fn suggestions<T: TextUnit>(&self, checker: &SpellChecker<T>) -> Result<Vec<String>> {
        let mut suggestions = checker.suggest()?;
        suggestions.truncate(self.max_suggestions);
        Ok(suggestions)
    }

    fn show_error<T: TextUnit>(&mut self, checker: &SpellChecker<T>) -> Result<()> {
        let word = checker.word().unwrap_or_default();
        let context = format!(
            "{}{}{}",
            checker.leading_context(CONTEXT_CHARS)?,
            word,
            checker.trailing_context(CONTEXT_CHARS)?
        )
        .replace(['\n', '\r', '\t'], " ");

        if self.colored {
            writeln!(self.output, "\n{} {}", "ERROR:".yellow().bold(), word.red().bold())?;
        } else {
            writeln!(self.output, "\nERROR: {}", word)?;
        }
        writeln!(
            self.output,
            "  {}",
            format_context(context.trim(), &word, self.colored)
        )?;
        self.show_suggestions(checker)
    }

    fn show_suggestions<T: TextUnit>(&mut self, checker: &SpellChecker<T>) -> Result<()> {
        let suggestions = self.suggestions(checker)?;
        let listed = suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if self.colored {
                    format!("[{}] {}", i, s.green())
                } else {
                    format!("[{}] {}", i, s)
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(self.output, "HOW ABOUT: {}", listed)?;
        Ok(())
    }

    fn print_help<T: TextUnit>(&mut self, checker: &SpellChecker<T>) -> Result<()> {
        writeln!(self.output, "0..N:    replace with the numbered suggestion")?;
        writeln!(self.output, "R0..RN:  always replace with the numbered suggestion")?;
        writeln!(self.output, "i:       ignore this word")?;
        writeln!(self.output, "I:       always ignore this word")?;
        writeln!(self.output, "a:       add word to personal dictionary")?;
        writeln!(self.output, "e:       edit the word")?;
        writeln!(self.output, "s:       stop checking and write out changes")?;
        writeln!(self.output, "q:       quit, discarding all changes")?;
        writeln!(self.output, "h:       print this help message")?;
        writeln!(self.output, "{}", "-".repeat(52))?;
        self.show_suggestions(checker)
    }

    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// The numbered suggestion, or a complaint written to the output.
    fn pick<T: TextUnit>(&mut self, checker: &SpellChecker<T>, num: &str) -> Result<Option<String>> {
        let Ok(index) = num.parse::<usize>() else {
            writeln!(self.output, "Badly formatted command")?;
            return Ok(None);
        };
        let suggestions = self.suggestions(checker)?;
        match suggestions.into_iter().nth(index) {
            Some(replacement) => Ok(Some(replacement)),
            None => {
                writeln!(self.output, "No suggestion number {}", index)?;
                Ok(None)
            }
        }
    }

    fn read_command<T: TextUnit>(&mut self, checker: &mut SpellChecker<T>) -> Result<Step> {
        let Some(cmd) = self.prompt(">> ")? else {
            log::debug!("input closed, discarding changes");
            return Ok(Step::Quit);
        };

        if !cmd.is_empty() && cmd.chars().all(|c| c.is_ascii_digit()) {
            let Some(replacement) = self.pick(checker, &cmd)? else {
                return Ok(Step::Again);
            };
            let word = checker.word().unwrap_or_default();
            writeln!(self.output, "Replacing '{}' with '{}'", word, replacement)?;
            return Ok(Step::Moved(checker.replace(&replacement)?));
        }

        if let Some(num) = cmd.strip_prefix('R') {
            let Some(replacement) = self.pick(checker, num)? else {
                return Ok(Step::Again);
            };
            return Ok(Step::Moved(checker.replace_always(&replacement)?));
        }

        match cmd.as_str() {
            "i" => Ok(Step::Moved(checker.advance()?)),
            "I" => {
                checker.ignore_always()?;
                Ok(Step::Moved(checker.advance()?))
            }
            "a" => {
                checker.add()?;
                Ok(Step::Moved(checker.advance()?))
            }
            "e" => match self.prompt("New Word: ")? {
                Some(replacement) => Ok(Step::Moved(checker.replace(&replacement)?)),
                None => Ok(Step::Quit),
            },
            "s" => Ok(Step::Stop),
            "q" => Ok(Step::Quit),
            other if "help".starts_with(&other.to_lowercase()) => {
                self.print_help(checker)?;
                Ok(Step::Again)
            }
            _ => {
                writeln!(self.output, "Badly formatted command")?;
                Ok(Step::Again)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::FstDictionary;
    use std::io::Cursor;

    fn checker(text: &str) -> SpellChecker {
        let dict =
            FstDictionary::from_words("en_US", ["this", "is", "some", "text", "the", "end"])
                .unwrap();
        SpellChecker::builder("en_US")
            .text(text)
            .dictionary(Box::new(dict))
            .build()
            .unwrap()
    }

    fn run(text: &str, input: &str) -> (Outcome, String, String, usize) {
        let mut chkr = checker(text);
        let mut output = Vec::new();
        let mut cmd = CmdLineChecker::new(Cursor::new(input.as_bytes()), &mut output, false, 5);
        let outcome = cmd.run(&mut chkr).unwrap();
        let corrections = cmd.corrections();
        (
            outcome,
            chkr.text_string(),
            String::from_utf8(output).unwrap(),
            corrections,
        )
    }

    #[test]
    fn test_replace_with_suggestion() {
        let (outcome, text, output, corrections) = run("this is sme text", "0\n");
        assert_eq!(outcome, Outcome::Finished);
        assert_eq!(text, "this is some text");
        assert!(output.contains("ERROR: sme"));
        assert!(output.contains("[0] some"));
        assert!(output.contains("Replacing 'sme' with 'some'"));
        assert_eq!(corrections, 1);
    }

    #[test]
    fn test_replace_always() {
        let (outcome, text, _, corrections) = run("sme text, sme end", "R0\n");
        assert_eq!(outcome, Outcome::Finished);
        assert_eq!(text, "some text, some end");
        assert_eq!(corrections, 2);
    }

    #[test]
    fn test_ignore_and_ignore_always() {
        let (_, text, output, _) = run("qqq sme qqq", "I\ni\n");
        assert_eq!(text, "qqq sme qqq");
        assert_eq!(output.matches("ERROR:").count(), 2);
    }

    #[test]
    fn test_edit() {
        let (_, text, _, _) = run("this is sme text", "e\nthe\n");
        assert_eq!(text, "this is the text");
    }

    #[test]
    fn test_bad_commands_reprompt() {
        let (outcome, text, output, _) = run("this is sme text", "x\n9\nRx\nh\n0\n");
        assert_eq!(outcome, Outcome::Finished);
        assert_eq!(text, "this is some text");
        assert_eq!(output.matches("Badly formatted command").count(), 2);
        assert!(output.contains("No suggestion number 9"));
        assert!(output.contains("always ignore this word"));
    }

    #[test]
    fn test_stop_and_quit() {
        let (outcome, text, _, _) = run("sme qqq", "0\ns\n");
        assert_eq!(outcome, Outcome::Stopped);
        assert!(outcome.keeps_changes());
        assert_eq!(text, "some qqq");

        let (outcome, _, _, _) = run("sme qqq", "q\n");
        assert_eq!(outcome, Outcome::Quit);
        assert!(!outcome.keeps_changes());
    }

    #[test]
    fn test_end_of_input_quits() {
        let (outcome, _, _, _) = run("sme", "");
        assert_eq!(outcome, Outcome::Quit);
    }

    #[test]
    fn test_add_word() {
        let mut chkr = checker("qqq then qqq");
        let mut output = Vec::new();
        let outcome = CmdLineChecker::new(Cursor::new("a\ni\n".as_bytes()), &mut output, false, 5)
            .run(&mut chkr)
            .unwrap();
        assert_eq!(outcome, Outcome::Finished);
        assert!(chkr.check("qqq").unwrap());
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("ERROR:").count(), 2);
    }
}
