// Character encoding detection and conversion for TEI input files
// Decodes UTF-16 or UTF-8 (with or without BOM) to UTF-8 and normalizes CRLF to LF

use encoding_rs::{Encoding, UTF_16LE, UTF_16BE, UTF_8};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::logger;
use crate::types::ConvertError;

/// Reads an XML file, detects encoding, and converts to UTF-8 with Unix line endings
pub fn read_xml_file(path: &Path) -> Result<String, ConvertError> {
    let unopened = |source| ConvertError::UnopenedInput {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(unopened)?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(unopened)?;

    Ok(decode_xml_bytes(&bytes, path))
}

/// Decodes raw bytes to a UTF-8 string, the path is only used for log messages
pub fn decode_xml_bytes(bytes: &[u8], path: &Path) -> String {
    let (encoding, bom_len) = detect_encoding(bytes);

    logger::debug(&format!(
        "File: {:?}, Encoding: {}, BOM: {}",
        path.file_name().unwrap_or_default(),
        encoding.name(),
        bom_len > 0
    ));

    let (decoded, _encoding_used, had_errors) = encoding.decode(&bytes[bom_len..]);

    if had_errors {
        logger::warn(&format!("Encoding errors detected while decoding {:?}", path));
    }

    decoded.replace("\r\n", "\n")
}

/// Detects file encoding by examining the BOM, returns the encoding and BOM length
fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    // UTF-16LE BOM: 0xFF 0xFE
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return (UTF_16LE, 2);
    }

    // UTF-16BE BOM: 0xFE 0xFF
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return (UTF_16BE, 2);
    }

    // UTF-8 BOM: 0xEF 0xBB 0xBF
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return (UTF_8, 3);
    }

    (UTF_8, 0)
}
