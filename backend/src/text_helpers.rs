//! Token-level text primitives used by the structural tracker.

use regex::Regex;
use lazy_static::lazy_static;
use unicode_normalization::UnicodeNormalization;

/// Editorial marks removed from every token, in this order.
pub const FILTER_CHARS: [char; 4] = ['¶', '[', ']', '§'];

pub const GREEK_ANO_TELEIA: char = '\u{0387}';
pub const MIDDLE_DOT: char = '\u{00B7}';

lazy_static! {
    // Any character in the Unicode punctuation categories (Pc, Pd, Ps, Pe, Pi, Pf, Po).
    static ref RE_PUNCT: Regex = Regex::new(r"\p{P}").unwrap();
}

/// Return the given text normalized to Unicode NFC.
pub fn unicode_normalize(text: &str) -> String {
    text.nfc().collect()
}

/// Remove every punctuation character from the text.
pub fn remove_punctuation(text: &str) -> String {
    RE_PUNCT.replace_all(text, "").into_owned()
}

/// Remove all occurrences of the filter metacharacters.
pub fn strip_filter_chars(token: &str) -> String {
    let mut token = token.to_string();
    for c in FILTER_CHARS {
        token = token.replace(c, "");
    }
    token
}

/// Replace GREEK ANO TELEIA with its canonical equivalent MIDDLE DOT.
pub fn shim_ano_teleia(token: &str) -> String {
    token.replace(GREEK_ANO_TELEIA, &MIDDLE_DOT.to_string())
}

/// Split a single detachable punctuation mark off the end of a token.
///
/// The last character is detached only when removing punctuation from the
/// whole token leaves exactly the token minus that character, i.e. the last
/// character is punctuation and nothing before it is. Otherwise the token is
/// returned whole.
///
/// # Returns
/// `(end_token, Some(punct))` on a split, `(token, None)` otherwise.
/// `end_token` followed by `punct` always reconstructs the input.
pub fn split_trailing_punctuation(token: &str) -> (String, Option<char>) {
    let Some((last_idx, last)) = token.char_indices().next_back() else {
        return (String::new(), None);
    };
    let head = &token[..last_idx];

    if remove_punctuation(token) == head {
        (head.to_string(), Some(last))
    } else {
        (token.to_string(), None)
    }
}
