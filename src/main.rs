use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use spellwalk::cli::output::{OutputFormat, Report};
use spellwalk::cli::{collect_files, FileChecker};
use spellwalk::config::Overrides;
use spellwalk::{dict, ChunkerKind, Config, FilterKind};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spellwalk")]
#[command(version, about = "Walk through the misspellings of your files", long_about = None)]
struct Cli {
    /// Files or directories to check
    #[arg(value_name = "PATHS")]
    files: Vec<PathBuf>,

    /// Fix misspellings in place (auto-apply top suggestion)
    #[arg(short, long)]
    fix: bool,

    /// Interactive mode for selecting corrections
    #[arg(short, long, requires = "fix")]
    interactive: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if errors are found
    #[arg(long)]
    no_fail: bool,

    /// Show debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    /// Language/dictionary to use (e.g., en_US, en_GB)
    #[arg(short, long)]
    language: Option<String>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Skip tokens such as URLs (url, wikiword, email)
    #[arg(long, value_delimiter = ',')]
    filter: Vec<FilterKind>,

    /// Only check the prose of these formats (html, markdown, comments)
    #[arg(long, value_delimiter = ',')]
    chunker: Vec<ChunkerKind>,

    /// Add words to personal dictionary
    #[arg(long)]
    add_to_dict: Vec<String>,

    /// Pattern to ignore (regex)
    #[arg(long)]
    ignore_pattern: Vec<String>,

    /// Personal dictionary file
    #[arg(long)]
    personal_dict: Option<PathBuf>,

    /// Directory holding installed dictionaries
    #[arg(long, env = "SPELLWALK_DICT_DIR")]
    dict_dir: Option<PathBuf>,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Download a dictionary
    Download {
        /// Language code (e.g., en_US, en_GB)
        language: String,
    },
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spellwalk", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load(Overrides {
        language: cli.language.clone(),
        personal_dictionary: cli.personal_dict.clone(),
        dictionary_dir: cli.dict_dir.clone(),
        filters: cli.filter.clone(),
        chunkers: cli.chunker.clone(),
        ignore_patterns: cli.ignore_pattern.clone(),
    })?;

    if cli.no_color {
        colored::control::set_override(false);
    }
    let colored = !cli.no_color;

    if let Some(command) = cli.command {
        return handle_command(command, &config);
    }

    let checker = FileChecker::new(config)?;

    if !cli.add_to_dict.is_empty() {
        checker.add_words(&cli.add_to_dict)?;
        if cli.files.is_empty() {
            println!("Added {} word(s) to the personal dictionary", cli.add_to_dict.len());
            return Ok(());
        }
    }

    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    let mut report = Report::new(cli.format, colored);
    for file_path in collect_files(&cli.files) {
        if !file_path.exists() {
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }

        if cli.interactive {
            let (result, outcome) =
                checker.fix_interactive(&file_path, io::stdin().lock(), io::stdout(), colored)?;
            report.add(&file_path, &result);
            if !outcome.keeps_changes() {
                log::info!("quit during {}, remaining files skipped", file_path.display());
                break;
            }
            continue;
        }

        let result = if cli.fix {
            checker.fix_auto(&file_path)?
        } else {
            checker.check(&file_path)?
        };
        report.add(&file_path, &result);
    }

    let total_errors = report.total_errors();
    report.finish(cli.fix)?;

    if total_errors > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let data_dir = config
        .dictionary_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory"))?;

    match command {
        Commands::Dict { action } => match action {
            DictCommands::List => dict::manager::list_dictionaries(&data_dir)?,
            DictCommands::Download { language } => {
                dict::manager::download_dictionary(&language, &data_dir)?
            }
            DictCommands::Info { language } => dict::manager::show_info(&language, &data_dir)?,
        },
    }
    Ok(())
}
