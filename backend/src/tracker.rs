//! Structural tracker for Swete LXX TEI documents
//!
//! Consumes a depth-first stream of open/close/text events and keeps the
//! parse context (book membership, header and note suppression, chapter and
//! verse coordinates, header metadata). Text runs inside the book body are
//! tokenized, repaired across line-break hyphens, filtered, split and
//! normalized into an ordered output buffer.

use crate::logger;
use crate::text_helpers::{shim_ano_teleia, split_trailing_punctuation, strip_filter_chars, unicode_normalize};
use crate::types::{ConvertError, ParsedDocument, Task};

/// Character range of the book number inside the `idno` text,
/// e.g. `tlg0527.tlg027.1st1K-grc1` carries book `027`.
const IDNO_BOOK_START: usize = 11;
const IDNO_BOOK_END: usize = 14;

/// Structural role of an element, resolved from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Division,
    BodyText,
    Header,
    Identifier,
    TitleStatement,
    Title,
    Note,
    Other,
}

impl MarkerKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "div" => MarkerKind::Division,
            "text" => MarkerKind::BodyText,
            "head" => MarkerKind::Header,
            "idno" => MarkerKind::Identifier,
            "titleStmt" => MarkerKind::TitleStatement,
            "title" => MarkerKind::Title,
            "note" => MarkerKind::Note,
            _ => MarkerKind::Other,
        }
    }
}

/// Attributes of an open marker that the tracker cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerAttrs {
    pub subtype: Option<String>,
    pub n: Option<String>,
}

impl MarkerAttrs {
    pub fn division(subtype: &str, n: &str) -> Self {
        MarkerAttrs {
            subtype: Some(subtype.to_string()),
            n: Some(n.to_string()),
        }
    }
}

/// Mutable state for one document parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContext {
    pub in_book: bool,
    pub in_header: bool,
    pub in_idno: bool,
    pub in_title: bool,
    pub in_titlestmt: bool,
    /// Signed so that unmatched closes stay visible instead of being clamped.
    pub note_depth: i32,
    pub current_chapter: String,
    pub current_verse: String,
    pub current_book: u32,
    pub book_title: Option<String>,
}

impl Default for ParseContext {
    fn default() -> Self {
        ParseContext {
            in_book: false,
            in_header: false,
            in_idno: false,
            in_title: false,
            in_titlestmt: false,
            note_depth: 0,
            current_chapter: "0".to_string(),
            current_verse: "0".to_string(),
            current_book: 0,
            book_title: None,
        }
    }
}

impl ParseContext {
    pub fn in_note(&self) -> bool {
        self.note_depth >= 1
    }

    /// Text runs are tokenized only inside the body, outside headers and notes.
    pub fn emits_tokens(&self) -> bool {
        self.in_book && !self.in_header && !self.in_note()
    }
}

/// Extract the book number from fixed-width identifier text.
///
/// # Errors
/// `MalformedIdentifier` when the text is shorter than 14 characters or the
/// three characters at 11..14 are not all ASCII digits.
pub fn parse_book_number(idno: &str) -> Result<u32, ConvertError> {
    let malformed = || ConvertError::MalformedIdentifier { text: idno.to_string() };

    let digits: String = idno
        .chars()
        .skip(IDNO_BOOK_START)
        .take(IDNO_BOOK_END - IDNO_BOOK_START)
        .collect();

    if digits.chars().count() != IDNO_BOOK_END - IDNO_BOOK_START
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return Err(malformed());
    }

    digits.parse::<u32>().map_err(|_| malformed())
}

/// Event handlers turning one document's markup into the output buffer.
pub struct StructuralTracker {
    task: Task,
    ctx: ParseContext,
    /// Word fragment that ended a run with a hyphen, glued to the next token.
    lb_token: Option<String>,
    idno_text: String,
    title_text: String,
    out_lines: Vec<String>,
}

impl StructuralTracker {
    pub fn new(task: Task) -> Self {
        StructuralTracker {
            task,
            ctx: ParseContext::default(),
            lb_token: None,
            idno_text: String::new(),
            title_text: String::new(),
            out_lines: Vec::new(),
        }
    }

    pub fn context(&self) -> &ParseContext {
        &self.ctx
    }

    pub fn pending_fragment(&self) -> Option<&str> {
        self.lb_token.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        &self.out_lines
    }

    /// Handle an open marker.
    pub fn open(&mut self, name: &str, attrs: &MarkerAttrs) {
        match MarkerKind::from_name(name) {
            MarkerKind::Division => {
                let Some(n) = attrs.n.as_ref() else {
                    return;
                };
                match attrs.subtype.as_deref() {
                    Some("chapter") => {
                        logger::debug(&format!("Chapter {}", n));
                        self.ctx.current_chapter = n.clone();
                    }
                    Some("verse") => {
                        self.ctx.current_verse = n.clone();
                    }
                    _ => {}
                }
            }
            MarkerKind::BodyText => self.ctx.in_book = true,
            MarkerKind::Header => self.ctx.in_header = true,
            MarkerKind::Identifier => {
                self.ctx.in_idno = true;
                self.idno_text.clear();
            }
            MarkerKind::TitleStatement => self.ctx.in_titlestmt = true,
            MarkerKind::Title => {
                self.ctx.in_title = true;
                self.title_text.clear();
            }
            MarkerKind::Note => self.ctx.note_depth += 1,
            MarkerKind::Other => {}
        }
    }

    /// Handle a close marker.
    ///
    /// # Errors
    /// `MalformedIdentifier` when an `idno` element closes without a readable
    /// book number.
    pub fn close(&mut self, name: &str) -> Result<(), ConvertError> {
        match MarkerKind::from_name(name) {
            MarkerKind::BodyText => self.ctx.in_book = false,
            MarkerKind::Header => self.ctx.in_header = false,
            MarkerKind::Identifier => {
                self.ctx.in_idno = false;
                self.ctx.current_book = parse_book_number(&self.idno_text)?;
                logger::debug(&format!("Book number {}", self.ctx.current_book));
            }
            MarkerKind::TitleStatement => self.ctx.in_titlestmt = false,
            MarkerKind::Title => {
                if self.ctx.in_titlestmt && self.ctx.in_title {
                    self.ctx.book_title = Some(std::mem::take(&mut self.title_text));
                }
                self.ctx.in_title = false;
            }
            MarkerKind::Note => self.ctx.note_depth -= 1,
            MarkerKind::Division | MarkerKind::Other => {}
        }
        Ok(())
    }

    /// Handle one contiguous raw text run.
    pub fn text(&mut self, data: &str) {
        if self.ctx.in_idno {
            self.idno_text.push_str(data);
        }

        if self.ctx.in_titlestmt && self.ctx.in_title {
            self.title_text.push_str(data);
        }

        if !self.ctx.emits_tokens() {
            return;
        }

        for raw in data.split_whitespace() {
            if let Some(fragment) = raw.strip_suffix('-') {
                self.lb_token = Some(fragment.to_string());
                continue;
            }

            let joined = match self.lb_token.take() {
                Some(fragment) => fragment + raw,
                None => raw.to_string(),
            };

            let filtered = strip_filter_chars(&joined);
            if filtered.is_empty() {
                continue;
            }

            let token = shim_ano_teleia(&filtered);
            self.emit(&token);
        }
    }

    fn emit(&mut self, token: &str) {
        match self.task {
            Task::Compare => {
                let (end_token, punct_token) = split_trailing_punctuation(token);
                self.out_lines.push(unicode_normalize(&end_token));
                if let Some(p) = punct_token {
                    self.out_lines.push(p.to_string());
                }
            }
            Task::Convert => {
                self.out_lines.push(format!(
                    "{}.{}.{} {}\n",
                    self.ctx.current_book,
                    self.ctx.current_chapter,
                    self.ctx.current_verse,
                    unicode_normalize(token),
                ));
            }
        }
    }

    /// Finish the parse and hand over the output buffer.
    ///
    /// # Errors
    /// `MalformedIdentifier` if the document ended inside an `idno` element.
    pub fn finish(self) -> Result<ParsedDocument, ConvertError> {
        if self.ctx.in_idno {
            return Err(ConvertError::MalformedIdentifier { text: self.idno_text });
        }
        if self.ctx.note_depth != 0 {
            logger::warn(&format!("Document ended with note depth {}", self.ctx.note_depth));
        }

        logger::info(&format!(
            "Parsed book {} ({}): {} {} entries",
            self.ctx.current_book,
            self.ctx.book_title.as_deref().unwrap_or("untitled"),
            self.out_lines.len(),
            self.task.as_str(),
        ));

        Ok(ParsedDocument {
            task: self.task,
            lines: self.out_lines,
            book: self.ctx.current_book,
            title: self.ctx.book_title,
        })
    }
}
