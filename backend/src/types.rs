use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Which token stream the tracker produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Normalized tokens with trailing punctuation as separate entries.
    Compare,
    /// One `book.chapter.verse token` line per source token.
    Convert,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Compare => "compare",
            Task::Convert => "convert",
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid Task value: {0}")]
pub struct ParseTaskError(String);

impl FromStr for Task {
    type Err = ParseTaskError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "compare" => Ok(Task::Compare),
            "convert" => Ok(Task::Convert),
            _ => Err(ParseTaskError(s.to_string())),
        }
    }
}

/// The finished output of one document parse, handed to the output dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub task: Task,
    /// Convert lines end in `\n`, compare entries carry no separator.
    pub lines: Vec<String>,
    pub book: u32,
    pub title: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Malformed identifier field, no book number at characters 11..14: {text:?}")]
    MalformedIdentifier { text: String },

    #[error("Failed to open input {path:?}: {source}")]
    UnopenedInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parse error at position {position}: {message}")]
    Xml { position: usize, message: String },

    #[error("No title found for book {book}")]
    MissingTitle { book: u32 },

    #[error("Failed to write output {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Settings(String),
}
