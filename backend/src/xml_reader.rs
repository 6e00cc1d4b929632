//! XML event driver
//!
//! Walks a TEI document with quick-xml and feeds open, close and text events
//! to the structural tracker in document order.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::encoding::read_xml_file;
use crate::tracker::{MarkerAttrs, StructuralTracker};
use crate::types::{ConvertError, ParsedDocument, Task};

/// Read and convert a TEI file.
///
/// # Errors
/// `UnopenedInput` before any parsing if the file cannot be read, otherwise
/// see `convert_str`.
pub fn convert_file(path: &Path, task: Task) -> Result<ParsedDocument, ConvertError> {
    let content = read_xml_file(path)?;
    convert_str(&content, task)
}

/// Convert TEI content into the token stream for the given task.
///
/// # Errors
/// - `Xml` for syntax errors, with the byte position of the reader
/// - `MalformedIdentifier` when the book number cannot be read from `idno`
pub fn convert_str(content: &str, task: Task) -> Result<ParsedDocument, ConvertError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(false); // Whitespace separates tokens across elements
    reader.expand_empty_elements(true); // <note/> must close what it opens

    let mut tracker = StructuralTracker::new(task);

    loop {
        let event = reader.read_event().map_err(|e| ConvertError::Xml {
            position: reader.buffer_position(),
            message: e.to_string(),
        })?;

        match event {
            Event::Start(ref e) => {
                let name = tag_name(e.name().as_ref(), &reader)?;
                let attrs = marker_attrs(e, &reader)?;
                tracker.open(&name, &attrs);
            }
            Event::End(ref e) => {
                let name = tag_name(e.name().as_ref(), &reader)?;
                tracker.close(&name)?;
            }
            Event::Text(ref e) => {
                let text = e.unescape().map_err(|err| xml_error(&reader, err))?;
                tracker.text(&text);
            }
            Event::CData(ref e) => {
                let text = std::str::from_utf8(e).map_err(|err| xml_error(&reader, err))?;
                tracker.text(text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    tracker.finish()
}

fn xml_error(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> ConvertError {
    ConvertError::Xml {
        position: reader.buffer_position(),
        message: err.to_string(),
    }
}

fn tag_name(bytes: &[u8], reader: &Reader<&[u8]>) -> Result<String, ConvertError> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|err| xml_error(reader, err))
}

/// Collect the `subtype` and `n` attributes of an open tag
fn marker_attrs(element: &BytesStart, reader: &Reader<&[u8]>) -> Result<MarkerAttrs, ConvertError> {
    let mut attrs = MarkerAttrs::default();

    for attr in element.attributes() {
        let attr = attr.map_err(|err| xml_error(reader, err))?;
        let value = || -> Result<String, ConvertError> {
            Ok(attr.unescape_value().map_err(|err| xml_error(reader, err))?.into_owned())
        };
        match attr.key.as_ref() {
            b"subtype" => attrs.subtype = Some(value()?),
            b"n" => attrs.n = Some(value()?),
            _ => {}
        }
    }

    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tei(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader>
    <fileDesc>
      <titleStmt>
        <title>Genesis</title>
      </titleStmt>
      <publicationStmt>
        <idno type="filename">tlg0527.tlg001.1st1K-grc1.xml</idno>
      </publicationStmt>
    </fileDesc>
  </teiHeader>
  <text>
    <body>
      <div type="edition">
{}
      </div>
    </body>
  </text>
</TEI>"#,
            body
        )
    }

    #[test]
    fn test_convert_chapter_and_verse() {
        let xml = tei(r#"<div type="textpart" subtype="chapter" n="1">
            <head>ΓΕΝΕΣΙΣ</head>
            <div type="textpart" subtype="verse" n="1"><p>Ἐν ἀρχῇ ἐποίησεν</p></div>
            <div type="textpart" subtype="verse" n="2"><p>ἡ δὲ γῆ</p></div>
        </div>"#);

        let doc = convert_str(&xml, Task::Convert).unwrap();
        assert_eq!(doc.book, 1);
        assert_eq!(doc.title.as_deref(), Some("Genesis"));
        assert_eq!(
            doc.lines,
            vec![
                "1.1.1 Ἐν\n",
                "1.1.1 ἀρχῇ\n",
                "1.1.1 ἐποίησεν\n",
                "1.1.2 ἡ\n",
                "1.1.2 δὲ\n",
                "1.1.2 γῆ\n",
            ]
        );
    }

    #[test]
    fn test_self_closing_note_does_not_suppress() {
        let xml = tei(r#"<div subtype="chapter" n="1"><div subtype="verse" n="1">
            <p>ἐν <note/> ἀρχῇ</p></div></div>"#);

        let doc = convert_str(&xml, Task::Compare).unwrap();
        assert_eq!(doc.lines, vec!["ἐν", "ἀρχῇ"]);
    }

    #[test]
    fn test_entities_and_cdata_are_text() {
        let xml = tei(r#"<div subtype="chapter" n="1"><div subtype="verse" n="1">
            <p>&#955;&#972;&#947;&#959;&#962; <![CDATA[θεός]]></p></div></div>"#);

        let doc = convert_str(&xml, Task::Compare).unwrap();
        assert_eq!(doc.lines, vec!["λόγος", "θεός"]);
    }

    #[test]
    fn test_hyphen_across_line_break_element() {
        let xml = tei(r#"<div subtype="chapter" n="1"><div subtype="verse" n="1">
            <p>ἐποί-<lb/>ησεν</p></div></div>"#);

        let doc = convert_str(&xml, Task::Convert).unwrap();
        assert_eq!(doc.lines, vec!["1.1.1 ἐποίησεν\n"]);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let result = convert_str("<TEI><text><p>λόγος</text></TEI>", Task::Compare);
        assert!(matches!(result, Err(ConvertError::Xml { .. })));
    }

    #[test]
    fn test_malformed_idno_aborts() {
        let xml = tei("").replace("tlg0527.tlg001.1st1K-grc1.xml", "swete-genesis");
        let result = convert_str(&xml, Task::Convert);
        assert!(matches!(result, Err(ConvertError::MalformedIdentifier { .. })));
    }
}
