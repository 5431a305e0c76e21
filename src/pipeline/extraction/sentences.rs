/// A sentence extracted from report text with its byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub text: &'a str,
    pub offset: usize,
}

/// Abbreviations that end with a period but are NOT sentence boundaries.
const ABBREVIATIONS: &[&str] = &[
    "U.S.", "Inc.", "Co.", "Corp.", "No.", "vs.", "etc.", "e.g.", "i.e.", "approx.", "Jan.",
    "Feb.", "Mar.", "Apr.", "Aug.", "Sept.", "Oct.", "Nov.", "Dec.", "Misc.",
];

/// Check if the text ending at `period_pos` ends with a known abbreviation.
fn ends_with_abbreviation(text: &str, period_pos: usize) -> bool {
    let prefix = &text[..=period_pos];
    ABBREVIATIONS.iter().any(|abbr| {
        let Some(start) = prefix.len().checked_sub(abbr.len()) else {
            return false;
        };
        prefix.is_char_boundary(start)
            && prefix[start..].eq_ignore_ascii_case(abbr)
            // whole word only: "Mexico." must not read as "Co."
            && !prefix[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric)
    })
}

/// Split text into sentences, tracking byte offsets.
///
/// A boundary is `.`, `!` or `?` followed by whitespace and an uppercase
/// letter or digit, or a line break. Known abbreviations never split.
pub fn split_into_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if c == b'\n' {
            push_sentence(text, start, i, &mut sentences);
            start = i + 1;
        } else if matches!(c, b'.' | b'!' | b'?') {
            let end = i + 1;
            let is_abbreviation = c == b'.' && ends_with_abbreviation(text, i);
            if !is_abbreviation && starts_new_sentence(&text[end..]) {
                push_sentence(text, start, end, &mut sentences);
                start = end;
            }
        }

        i += 1;
    }

    push_sentence(text, start, text.len(), &mut sentences);
    sentences
}

/// True when `rest` is whitespace followed by an uppercase letter or digit.
fn starts_new_sentence(rest: &str) -> bool {
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        return false;
    }
    trimmed
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
}

fn push_sentence<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<Sentence<'a>>) {
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = slice.len() - slice.trim_start().len();
    out.push(Sentence {
        text: trimmed,
        offset: start + lead,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_period_and_capital() {
        let sentences = split_into_sentences("Demand grew. The six industries are: Apparel.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Demand grew.");
        assert_eq!(sentences[1].text, "The six industries are: Apparel.");
        assert_eq!(sentences[1].offset, 13);
    }

    #[test]
    fn abbreviations_do_not_split() {
        let sentences =
            split_into_sentences("U.S. manufacturing grew. Misc. Manufacturing reported growth.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "U.S. manufacturing grew.");
    }

    #[test]
    fn abbreviation_suffix_inside_word_still_splits() {
        let sentences = split_into_sentences("Imports rose from Mexico. Exports fell.");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn lowercase_continuation_does_not_split() {
        let sentences = split_into_sentences("Growth was 5.2 percent. in order, are: Apparel.");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn newline_splits_without_punctuation() {
        let sentences = split_into_sentences("First line\nSecond line");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].text, "Second line");
        assert_eq!(sentences[1].offset, 11);
    }

    #[test]
    fn empty_text_yields_no_sentences() {
        assert!(split_into_sentences("").is_empty());
        assert!(split_into_sentences("   ").is_empty());
    }

    #[test]
    fn trailing_fragment_kept() {
        let sentences = split_into_sentences("Growth continued. Industries including Apparel");
        assert_eq!(sentences.last().unwrap().text, "Industries including Apparel");
    }
}
