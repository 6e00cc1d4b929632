//! End-to-end tests converting a Swete TEI document
//!
//! Uses `tests/data/tlg0527.tlg027.1st1K-grc1.xml`, a two-verse excerpt of
//! Daniel (Theodotion) exercising headers, nested notes, line-break hyphens,
//! editorial metacharacters and the Greek ano teleia.

use std::path::PathBuf;

use swete_backend::output::{get_filename, render};
use swete_backend::text_helpers::unicode_normalize;
use swete_backend::{convert_file, convert_str, dispatch, ConvertError, DocumentTitle, OutputTarget, Task, TitleTable};

const VERSE_1: [&str; 17] = [
    "Ἐν", "ἔτει", "τρίτῳ", "τῆς", "βασιλείας", "Ἰωακεὶμ", "βασιλέως", "Ἰούδα", "ἦλθεν",
    "Ναβουχοδονοσὸρ", "βασιλεὺς", "Βαβυλῶνος", "εἰς", "Ἰερουσαλὴμ", "καὶ", "ἐπολιόρκει", "αὐτήν.",
];

const VERSE_2: [&str; 16] = [
    "καὶ", "ἔδωκεν", "Κύριος", "ἐν", "χειρὶ", "αὐτοῦ", "τὸν", "Ἰωακεὶμ", "βασιλέα", "Ἰούδα\u{00B7}",
    "καὶ", "ἤνεγκεν", "αὐτὰ", "εἰς", "γῆν", "Σεννάαρ.",
];

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data/tlg0527.tlg027.1st1K-grc1.xml")
}

fn minimal_document(idno: &str, body_text: &str) -> String {
    format!(
        r#"<TEI>
  <teiHeader><fileDesc>
    <titleStmt><title>Daniel</title></titleStmt>
    <publicationStmt><idno>{}</idno></publicationStmt>
  </fileDesc></teiHeader>
  <text><body>
    <div subtype="chapter" n="1"><div subtype="verse" n="1"><p>{}</p></div></div>
  </body></text>
</TEI>"#,
        idno, body_text
    )
}

#[test]
fn test_convert_fixture_lines() {
    let doc = convert_file(&fixture_path(), Task::Convert).unwrap();

    let expected: Vec<String> = VERSE_1
        .iter()
        .map(|t| format!("27.1.1 {}\n", t))
        .chain(VERSE_2.iter().map(|t| format!("27.1.2 {}\n", t)))
        .collect();

    assert_eq!(doc.book, 27);
    assert_eq!(doc.title.as_deref(), Some("Daniel (Theodotion)"));
    assert_eq!(doc.lines, expected);
}

#[test]
fn test_compare_fixture_entries() {
    let doc = convert_file(&fixture_path(), Task::Compare).unwrap();

    assert_eq!(&doc.lines[..5], ["Ἐν", "ἔτει", "τρίτῳ", "τῆς", "βασιλείας"]);
    assert_eq!(&doc.lines[16..18], ["αὐτήν", "."]);
    assert_eq!(&doc.lines[27..29], ["Ἰούδα", "\u{00B7}"]);
    assert_eq!(&doc.lines[doc.lines.len() - 2..], ["Σεννάαρ", "."]);
    // one entry per token plus three detached marks
    assert_eq!(doc.lines.len(), VERSE_1.len() + VERSE_2.len() + 3);
}

#[test]
fn test_no_filter_chars_or_note_text_survive() {
    let doc = convert_file(&fixture_path(), Task::Compare).unwrap();
    for line in &doc.lines {
        assert!(!line.contains(['¶', '[', ']', '§']), "unfiltered entry {:?}", line);
        assert!(!line.is_empty());
    }
    assert!(!doc.lines.iter().any(|l| l == "om." || l == "κυριος" || l == "ΔΑΝΙΗΛ"));
}

#[test]
fn test_minimal_document_convert() {
    let xml = minimal_document("tlg0527.tlg027", "λόγος.");
    let doc = convert_str(&xml, Task::Convert).unwrap();
    assert_eq!(render(&doc), "27.1.1 λόγος.\n");
}

#[test]
fn test_minimal_document_compare() {
    let xml = minimal_document("tlg0527.tlg027", "λόγος.");
    let doc = convert_str(&xml, Task::Compare).unwrap();
    assert_eq!(doc.lines, vec!["λόγος", "."]);
}

#[test]
fn test_decomposed_input_matches_composed() {
    let decomposed = minimal_document("tlg0527.tlg027", "λο\u{0301}γος ἀρχῇ");
    let composed = minimal_document("tlg0527.tlg027", &unicode_normalize("λο\u{0301}γος ἀρχῇ"));

    for task in [Task::Compare, Task::Convert] {
        let a = convert_str(&decomposed, task).unwrap();
        let b = convert_str(&composed, task).unwrap();
        assert_eq!(a.lines, b.lines);
    }
}

#[test]
fn test_whitespace_body_produces_nothing() {
    let xml = minimal_document("tlg0527.tlg027", "  \n\t ");
    let doc = convert_str(&xml, Task::Convert).unwrap();
    assert!(doc.lines.is_empty());
}

#[test]
fn test_short_idno_is_malformed() {
    let xml = minimal_document("tlg0527", "λόγος.");
    let result = convert_str(&xml, Task::Convert);
    assert!(matches!(result, Err(ConvertError::MalformedIdentifier { .. })));
}

#[test]
fn test_missing_input_is_unopened() {
    let result = convert_file(&PathBuf::from("tests/data/missing.xml"), Task::Convert);
    assert!(matches!(result, Err(ConvertError::UnopenedInput { .. })));
}

#[test]
fn test_write_fixture_to_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let doc = convert_file(&fixture_path(), Task::Convert).unwrap();

    let path = dispatch(&doc, &OutputTarget::Directory(dir.path().to_path_buf()), &DocumentTitle(&doc))
        .unwrap()
        .unwrap();

    assert_eq!(path.file_name().unwrap(), get_filename(27, "Daniel (Theodotion)").as_str());
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), VERSE_1.len() + VERSE_2.len());
    assert!(content.starts_with("27.1.1 Ἐν\n"));
}

#[test]
fn test_write_with_titles_table() {
    let dir = tempfile::tempdir().unwrap();
    let doc = convert_file(&fixture_path(), Task::Compare).unwrap();
    let table = TitleTable::from_json_str(r#"{"27": "Daniel Th"}"#).unwrap();

    let path = dispatch(&doc, &OutputTarget::Directory(dir.path().to_path_buf()), &table)
        .unwrap()
        .unwrap();

    assert_eq!(path, dir.path().join("27.Daniel_Th.txt"));
}
