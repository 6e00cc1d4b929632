use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use thiserror::Error;

use swete_backend::logger;
use swete_backend::settings::ConvertSettings;
use swete_backend::{convert_file, dispatch, DocumentTitle, OutputTarget, Task, TitleLookup, TitleTable};

#[derive(Error, Debug)]
enum CliError {
    #[error("No input file given, use --file <file.xml>")]
    MissingInput,
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert Swete TEI to one line per token", long_about = None)]
struct Cli {
    /// Volume to process.
    #[arg(long, value_name = "FILE.xml")]
    file: Option<PathBuf>,

    /// Output to file under the data directory instead of stdout.
    #[arg(long, default_value_t = false)]
    outfile: bool,

    /// Directory for output files. Overrides SWETE_DATA_DIR and the settings file.
    #[arg(long, value_name = "DIRECTORY_PATH")]
    data_dir: Option<PathBuf>,

    /// JSON table of book number to title, used instead of the document title.
    #[arg(long, value_name = "FILE.json")]
    titles: Option<PathBuf>,

    /// JSON settings file.
    #[arg(long, value_name = "FILE.json", env = "SWETE_SETTINGS")]
    settings: Option<PathBuf>,

    /// One of: silent, error, warn, info, debug
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// compare: print normalized comparison text, convert: print converted text
    #[arg(value_name = "compare|convert")]
    task: Task,
}

fn load_settings(cli: &Cli) -> Result<ConvertSettings> {
    // Precedence:
    // - command line arguments
    // - SWETE_DATA_DIR, SWETE_TITLES_FILE
    // - settings file
    // - defaults
    let mut settings = match &cli.settings {
        Some(path) => {
            let mut settings = ConvertSettings::from_json_file(path)
                .with_context(|| format!("Failed to load settings from {:?}", path))?;
            settings.apply_env();
            settings
        }
        None => ConvertSettings::from_env(),
    };

    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    if let Some(titles) = &cli.titles {
        settings.titles_file = Some(titles.clone());
    }

    Ok(settings)
}

fn run(cli: Cli) -> Result<()> {
    if let Some(level) = &cli.log_level {
        if !logger::set_log_level_str(level) {
            return Err(CliError::InvalidLogLevel(level.clone()).into());
        }
    }

    let settings = load_settings(&cli)?;
    let input = cli.file.clone().ok_or(CliError::MissingInput)?;
    let task = cli.task;

    logger::info(&format!("Processing {:?} ({})", input, task.as_str()));

    let document = convert_file(&input, task)
        .with_context(|| format!("Failed to convert {:?}", input))?;

    let target = if cli.outfile {
        OutputTarget::Directory(settings.data_dir.clone())
    } else {
        OutputTarget::Console
    };

    let table = match &settings.titles_file {
        Some(path) => Some(TitleTable::from_json_file(path)?),
        None => None,
    };
    let document_title = DocumentTitle(&document);
    let titles: &dyn TitleLookup = match &table {
        Some(t) => t,
        None => &document_title,
    };

    if let Some(path) = dispatch(&document, &target, titles)? {
        logger::info(&format!("Output written to {:?}", path));
    }

    Ok(())
}

fn main() {
    // Attempt to load .env file. This might define SWETE_DATA_DIR or LOG_LEVEL.
    if dotenv().is_err() {
        logger::debug("No .env file found or failed to load.");
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        logger::error(&format!("{:#}", e));
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}
