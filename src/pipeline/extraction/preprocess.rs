//! Narrative text cleanup ahead of pattern matching.
//!
//! Output is always a single line: whitespace runs collapse to one space,
//! footnote markers like "(1)" disappear, and punctuation spacing is made
//! regular so the extraction templates only need to handle one layout.

use std::sync::LazyLock;

use regex::Regex;

/// Footnote markers: "(1)", "(12)", "( 3 )".
static FOOTNOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\d{1,3}\s*\)").unwrap());

/// Whitespace before clause punctuation: "Machinery ;" → "Machinery;".
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,;:.!?])").unwrap());

/// Missing space after semicolon/colon: "are:Apparel;Machinery".
static TIGHT_CLAUSE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([;:])([^\s\d])").unwrap());

/// Missing space after a comma followed by a word (numbers like 1,000 are left alone).
static TIGHT_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",([A-Za-z&])").unwrap());

/// Normalize one index paragraph into a single trimmed line.
///
/// Never fails; empty input yields empty output.
pub fn preprocess_index_text(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let folded = fold_characters(raw);
    let no_footnotes = FOOTNOTE_MARKER.replace_all(&folded, " ");
    let collapsed = collapse_whitespace(&no_footnotes);
    let tightened = SPACE_BEFORE_PUNCT.replace_all(&collapsed, "$1");
    let spaced = TIGHT_CLAUSE_PUNCT.replace_all(&tightened, "$1 $2");
    let spaced = TIGHT_COMMA.replace_all(&spaced, ", $1");

    collapse_whitespace(&spaced)
}

/// Fold typographic quotes and invisible characters; tabs and line breaks
/// become plain spaces.
fn fold_characters(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' => Some('\''),
            '\u{201C}' | '\u{201D}' => Some('"'),
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => Some(' '),
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}' => None,
            c if c.is_whitespace() => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
