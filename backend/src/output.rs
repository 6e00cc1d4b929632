//! Output dispatch
//!
//! Receives the finished buffer of a parse and either prints it or writes it
//! as one file named after the book number and title.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::logger;
use crate::types::{ConvertError, ParsedDocument, Task};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Console,
    Directory(PathBuf),
}

/// Resolves a book number to the title used in the output file name.
pub trait TitleLookup {
    fn title_for(&self, book: u32) -> Option<String>;
}

/// Uses the title found in the document's own title statement.
pub struct DocumentTitle<'a>(pub &'a ParsedDocument);

impl TitleLookup for DocumentTitle<'_> {
    fn title_for(&self, book: u32) -> Option<String> {
        if book == self.0.book {
            self.0.title.clone()
        } else {
            None
        }
    }
}

/// Book number to title table, for headers without a usable title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleTable {
    titles: HashMap<u32, String>,
}

impl TitleTable {
    pub fn new(titles: HashMap<u32, String>) -> Self {
        TitleTable { titles }
    }

    /// Load a JSON object keyed by book number, e.g. `{"1": "Genesis"}`.
    pub fn from_json_str(json: &str) -> Result<Self, ConvertError> {
        let raw: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| ConvertError::Settings(format!("Invalid titles table: {}", e)))?;

        let mut titles = HashMap::new();
        for (key, title) in raw {
            let book = key.trim().parse::<u32>().map_err(|_| {
                ConvertError::Settings(format!("Invalid book number in titles table: {:?}", key))
            })?;
            titles.insert(book, title);
        }

        Ok(TitleTable { titles })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConvertError> {
        let json = fs::read_to_string(path).map_err(|source| ConvertError::UnopenedInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

impl TitleLookup for TitleTable {
    fn title_for(&self, book: u32) -> Option<String> {
        self.titles.get(&book).cloned()
    }
}

/// Return a file name from the given book number and title
pub fn get_filename(number: u32, title: &str) -> String {
    let title = title.replace(' ', "_").replace(['(', ')'], "");
    format!("{:02}.{}.txt", number, title.trim())
}

/// Render the whole buffer as the text that gets printed or written.
pub fn render(document: &ParsedDocument) -> String {
    match document.task {
        Task::Convert => document.lines.concat(),
        Task::Compare => {
            let mut text = document.lines.join("\n");
            if !document.lines.is_empty() {
                text.push('\n');
            }
            text
        }
    }
}

/// Write a finished document to its target.
///
/// # Returns
/// The path of the written file, or None for console output.
///
/// # Errors
/// - `MissingTitle` if the lookup has no title for the book, nothing is written
/// - `Output` if the directory or file cannot be written
pub fn dispatch(
    document: &ParsedDocument,
    target: &OutputTarget,
    titles: &dyn TitleLookup,
) -> Result<Option<PathBuf>, ConvertError> {
    match target {
        OutputTarget::Console => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(render(document).as_bytes())
                .and_then(|_| handle.flush())
                .map_err(|source| ConvertError::Output {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
            Ok(None)
        }
        OutputTarget::Directory(dir) => {
            let title = titles
                .title_for(document.book)
                .ok_or(ConvertError::MissingTitle { book: document.book })?;

            let dest = dir.join(get_filename(document.book, &title));
            fs::create_dir_all(dir).map_err(|source| ConvertError::Output {
                path: dir.clone(),
                source,
            })?;
            fs::write(&dest, render(document)).map_err(|source| ConvertError::Output {
                path: dest.clone(),
                source,
            })?;

            logger::info(&format!("Wrote {} entries to {:?}", document.lines.len(), dest));
            Ok(Some(dest))
        }
    }
}
