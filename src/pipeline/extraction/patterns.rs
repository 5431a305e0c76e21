//! Category phrasing table and the template specifications built from it.
//!
//! Templates carry a `{P}` placeholder for the category phrase (a regex
//! alternation) and `{L}` for the list body, and name the capture group holding the industry list. One
//! generic matcher in `extractor` walks them in order, so supporting a new
//! index or report flavor means adding a table row, not code.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::schema::labels_match;

/// A regex template and the capture group holding the list.
#[derive(Debug, Clone, Copy)]
pub struct PatternSpec {
    pub template: &'static str,
    pub group: usize,
}

const fn spec(template: &'static str, group: usize) -> PatternSpec {
    PatternSpec { template, group }
}

/// Report wording for one category. `index: None` applies to every index
/// using that category label.
#[derive(Debug, Clone, Copy)]
pub struct CategoryPhrasing {
    pub index: Option<&'static str>,
    pub category: &'static str,
    pub phrase: &'static str,
    pub keywords: &'static [&'static str],
}

// ═══════════════════════════════════════════════════════════
// Templates
// ═══════════════════════════════════════════════════════════

/// Full report sentences, tried first.
pub const STRICT_TEMPLATES: &[PatternSpec] = &[
    // "The six industries reporting growth in February, in order, are: ..."
    spec(
        r"(?i)\bindustr(?:y|ies)\b[^.:;]*?\breport(?:ing|ed|s)?\b[^.:;]*?\b(?:{P})\b[^.:;]*?\b(?:are|were)\b\s*:?\s*({L})",
        1,
    ),
    // "... three reported employment growth in February, in the following order: ..."
    spec(
        r"(?i)\breport(?:ing|ed|s)?\b[^.:;]*?\b(?:{P})\b[^.:;]*?\b(?:in\s+(?:the\s+following\s+)?order|listed\s+in\s+order)\b[^.:;]*?:\s*({L})",
        1,
    ),
    // "Industries with slower deliveries were: ..."
    spec(r"(?i)\b(?:{P})\b[^.:;]*?\b(?:are|were)\s*:\s*({L})", 1),
];

/// One-industry sentences. The capture is a single name and is never split.
pub const SINGLE_TEMPLATES: &[PatternSpec] = &[
    // "The only industry that reported a decrease in February is Textile Mills."
    spec(
        r"(?i)\b(?:the\s+)?only\s+industry\b[^.:;]*?\b(?:{P})\b[^.;]*?\b(?:is|was)\b\s*:?\s*({L})",
        1,
    ),
    // "Textile Mills was the only industry reporting a decrease ..."
    spec(
        r"(?i)\b((?:{A}|(?-i:[A-Z]))(?:{A}|[^.,;])*?)\s+(?:is|was)\s+the\s+only\s+industry\b[^.:;]*?\b(?:{P})\b",
        1,
    ),
];

/// Shorter fallbacks when no full sentence matched.
pub const LOOSE_TEMPLATES: &[PatternSpec] = &[
    spec(r"(?i)\b(?:{P})\b[^.]*?:\s*({L})", 1),
    spec(
        r"(?i)\b(?:{P})\b[^.:;]*?\b(?:are|were|include|includes|included)\s+((?:{A}|(?-i:[A-Z]))(?:{A}|\.\S|[^.])*)",
        1,
    ),
];

/// "No industry reported a decrease in ..." states an empty list outright.
pub const NONE_REPORTED_TEMPLATES: &[PatternSpec] =
    &[spec(r"(?i)\bno\s+industr(?:y|ies)\b[^.]*?\b(?:{P})\b", 0)];

/// Abbreviations whose period is part of an industry name, not the end of
/// the list.
const ABBREVIATED: &str = r"\b(?:Misc|Inc|Corp|Co|U\.S)\.";

/// List body: runs to the sentence-ending period, stepping over
/// abbreviations and periods not followed by whitespace.
const LIST_BODY: &str = r"(?:{A}|\.\S|[^.])+";

/// Expands the `{L}` and `{A}` placeholders of a template.
fn expand_template(template: &str) -> String {
    template
        .replace("{L}", LIST_BODY)
        .replace("{A}", ABBREVIATED)
}

/// Fragment pulled from a keyword sentence in the last tier.
pub static SENTENCE_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&expand_template(r"(?i)(?::|\bincluding\b)\s*({L})")).unwrap()
});

// ═══════════════════════════════════════════════════════════
// Phrasing table
// ═══════════════════════════════════════════════════════════

const GROWTH: &str = r"growth|growing|grew|increase[sd]?|increasing|expan(?:sion|ded|ding)|higher";
const DECLINE: &str = r"declines?|declined|declining|decrease[sd]?|decreasing|contraction|contracted|contracting|reductions?|lower";

pub const PHRASINGS: &[CategoryPhrasing] = &[
    CategoryPhrasing {
        index: Some("Prices"),
        category: "Increasing",
        phrase: r"paying\s+(?:increased|higher)(?:\s+prices)?|(?:price\s+)?increases|higher\s+prices|increas(?:e|ed|ing)",
        keywords: &["increasing", "increased", "higher prices", "paying higher"],
    },
    CategoryPhrasing {
        index: Some("Prices"),
        category: "Decreasing",
        phrase: r"paying\s+(?:decreased|lower)(?:\s+prices)?|(?:price\s+)?decreases|lower\s+prices|decreas(?:e|ed|ing)",
        keywords: &["decreasing", "decreased", "lower prices", "paying lower"],
    },
    CategoryPhrasing {
        index: None,
        category: "Growing",
        phrase: GROWTH,
        keywords: &["growth", "growing", "grew", "increase", "expansion", "expanding"],
    },
    CategoryPhrasing {
        index: None,
        category: "Declining",
        phrase: DECLINE,
        keywords: &["decline", "declining", "decrease", "contraction", "contracting", "reduction"],
    },
    CategoryPhrasing {
        index: None,
        category: "Slower",
        phrase: r"slower|slowing|slowed",
        keywords: &["slower", "slowing"],
    },
    CategoryPhrasing {
        index: None,
        category: "Faster",
        phrase: r"faster|quicker",
        keywords: &["faster", "quicker"],
    },
    CategoryPhrasing {
        index: None,
        category: "Higher",
        phrase: r"higher|increase[sd]?|growth|increasing",
        keywords: &["higher", "increase", "growth"],
    },
    CategoryPhrasing {
        index: None,
        category: "Lower",
        phrase: r"lower|decrease[sd]?|declines?|decreasing|reduced",
        keywords: &["lower", "decrease", "decline", "reduced"],
    },
    CategoryPhrasing {
        index: None,
        category: "Too High",
        phrase: r"too\s+high",
        keywords: &["too high"],
    },
    CategoryPhrasing {
        index: None,
        category: "Too Low",
        phrase: r"too\s+low",
        keywords: &["too low"],
    },
];

// ═══════════════════════════════════════════════════════════
// Compiled form
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    group: usize,
}

impl CompiledPattern {
    /// The trimmed capture of the first match, if non-empty.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        let caps = self.regex.captures(text)?;
        let raw = caps.get(self.group)?.as_str().trim();
        (!raw.is_empty()).then_some(raw)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Ready-to-run patterns for one category label.
#[derive(Debug)]
pub struct CategoryPatterns {
    pub category: String,
    pub strict: Vec<CompiledPattern>,
    pub single: Vec<CompiledPattern>,
    pub loose: Vec<CompiledPattern>,
    pub none_reported: Vec<CompiledPattern>,
    keywords: Option<Regex>,
}

impl CategoryPatterns {
    /// Compiles every template tier around `phrase`.
    pub fn compile(category: &str, phrase: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            strict: compile_tier(STRICT_TEMPLATES, phrase),
            single: compile_tier(SINGLE_TEMPLATES, phrase),
            loose: compile_tier(LOOSE_TEMPLATES, phrase),
            none_reported: compile_tier(NONE_REPORTED_TEMPLATES, phrase),
            keywords: keyword_regex(keywords),
        }
    }

    /// Patterns for a label missing from the phrasing table: the label
    /// itself is the phrase and the only keyword.
    pub fn for_label(category: &str) -> Self {
        let words: Vec<String> = category
            .split_whitespace()
            .map(|w| regex::escape(&w.to_lowercase()))
            .collect();
        let phrase = words.join(r"\s+");
        let keyword = category.to_lowercase();
        Self::compile(category, &phrase, &[keyword.as_str()])
    }

    /// True when `sentence` contains one of this category's keywords as a
    /// word prefix ("decline" hits "declined", "lower" misses "slower").
    pub fn mentions_keyword(&self, sentence: &str) -> bool {
        self.keywords.as_ref().is_some_and(|re| re.is_match(sentence))
    }
}

fn compile_tier(specs: &[PatternSpec], phrase: &str) -> Vec<CompiledPattern> {
    specs
        .iter()
        .filter_map(|spec| {
            let source = expand_template(spec.template).replace("{P}", phrase);
            match Regex::new(&source) {
                Ok(regex) => Some(CompiledPattern {
                    regex,
                    group: spec.group,
                }),
                Err(e) => {
                    tracing::error!(template = spec.template, error = %e, "Invalid category template");
                    None
                }
            }
        })
        .collect()
}

fn keyword_regex(keywords: &[&str]) -> Option<Regex> {
    if keywords.is_empty() {
        return None;
    }
    let alternation = keywords
        .iter()
        .map(|k| {
            k.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})")).ok()
}

struct BuiltinEntry {
    index: Option<&'static str>,
    patterns: Arc<CategoryPatterns>,
}

static BUILTIN: LazyLock<Vec<BuiltinEntry>> = LazyLock::new(|| {
    PHRASINGS
        .iter()
        .map(|p| BuiltinEntry {
            index: p.index,
            patterns: Arc::new(CategoryPatterns::compile(p.category, p.phrase, p.keywords)),
        })
        .collect()
});

/// Table patterns for (index, category). Index-specific rows win over
/// rows that apply to any index.
pub fn builtin_patterns(index: &str, category: &str) -> Option<Arc<CategoryPatterns>> {
    let category_matches = |e: &&BuiltinEntry| labels_match(&e.patterns.category, category);
    BUILTIN
        .iter()
        .filter(category_matches)
        .find(|e| e.index.is_some_and(|i| labels_match(i, index)))
        .or_else(|| {
            BUILTIN
                .iter()
                .filter(category_matches)
                .find(|e| e.index.is_none())
        })
        .map(|e| Arc::clone(&e.patterns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_compiles_for_every_phrase() {
        for phrasing in PHRASINGS {
            let compiled =
                CategoryPatterns::compile(phrasing.category, phrasing.phrase, phrasing.keywords);
            assert_eq!(compiled.strict.len(), STRICT_TEMPLATES.len(), "{}", phrasing.category);
            assert_eq!(compiled.single.len(), SINGLE_TEMPLATES.len());
            assert_eq!(compiled.loose.len(), LOOSE_TEMPLATES.len());
            assert_eq!(compiled.none_reported.len(), 1);
        }
    }

    #[test]
    fn index_specific_phrasing_wins() {
        let prices = builtin_patterns("Prices", "Increasing").unwrap();
        assert!(prices.mentions_keyword("industries paying higher prices"));
        let generic = builtin_patterns("New Orders", "Growing").unwrap();
        assert!(generic.mentions_keyword("reported growth"));
    }

    #[test]
    fn unknown_category_has_no_builtin() {
        assert!(builtin_patterns("New Orders", "Sideways").is_none());
    }

    #[test]
    fn keyword_matches_word_prefix_only() {
        let lower = builtin_patterns("Inventories", "Lower").unwrap();
        assert!(lower.mentions_keyword("Inventories were lower in March"));
        assert!(!lower.mentions_keyword("deliveries were slower"));
        let decline = builtin_patterns("Employment", "Declining").unwrap();
        assert!(decline.mentions_keyword("employment declined"));
    }

    #[test]
    fn label_patterns_match_literal_wording() {
        let patterns = CategoryPatterns::for_label("Same Level");
        let text = "The industries reporting same level inventories are: Machinery; Paper Products.";
        let hit = patterns.strict.iter().find_map(|p| p.capture(text));
        assert_eq!(hit, Some("Machinery; Paper Products"));
        assert!(patterns.mentions_keyword("inventories at the same  level"));
    }

    #[test]
    fn capture_trims_and_rejects_blank() {
        let p = &builtin_patterns("New Orders", "Growing").unwrap().loose[0];
        assert_eq!(p.capture("growth noted:   Machinery  ."), Some("Machinery"));
        assert_eq!(p.capture("growth noted:   ."), None);
    }
}
