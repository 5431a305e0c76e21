//! Raw list substring → ordered, unique industry names.

use std::sync::LazyLock;

use regex::Regex;

use super::vocabulary::{is_comma_name, is_known_industry};

/// Tokens shorter than this (after cleaning) are noise.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Longest run of comma fragments re-joined into one vocabulary name
/// ("Agriculture, Forestry, Fishing & Hunting" has three commas).
const MAX_REJOIN_FRAGMENTS: usize = 4;

/// Generic list introducer for substrings without any delimiter.
static LIST_FINDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\bare\b|\bin\s+order\b|\bincluding\b|:)\s*:?\s*(.+)$").unwrap()
});

/// Boilerplate ahead of the first item.
static LEAD_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[\s,;:.\-\u{2013}\u{2014}&]+|are\b|in\s+the\s+following\s+order\b|listed\s+in\s+order\b|in\s+order\b|and\b)+",
    )
    .unwrap()
});

/// Footnote markers, digits, asterisks and stray punctuation at the end of a token.
static TRAILING_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\s*\(\s*\d{1,3}\s*\)|[\s\d*\u{2020}.,;:])+$").unwrap()
});

/// Bullets and dashes at the start of a token.
static LEADING_DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\-\u{2013}\u{2014}\u{2022}]+").unwrap());

/// Articles and connectives at the start of a token.
static LEADING_ARTICLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:the|those|that|are|and)\s+|&\s*)+").unwrap()
});

/// Last " and " that directly precedes a capitalized word.
static TRAILING_AND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+and\s+[A-Z]").unwrap());

/// Normalize a raw list capture into industry names, first-seen order,
/// duplicates removed.
pub fn normalize_industry_list(raw: &str) -> Vec<String> {
    let mut text = raw.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if !text.contains([',', ';']) {
        if let Some(list) = LIST_FINDER.captures(text).and_then(|c| c.get(1)) {
            text = list.as_str();
        }
    }

    let text = strip_lead_in(text);
    let delimiter = if text.contains(';') { ';' } else { ',' };

    let mut items: Vec<String> = text.split(delimiter).map(clean_token).collect();
    if delimiter == ',' {
        items = rejoin_comma_names(items);
    }
    if let Some(last) = items.pop() {
        items.extend(split_trailing_and(&last));
    }

    dedup_preserving_order(
        items
            .iter()
            .map(|item| clean_token(item))
            .filter(|item| item.chars().count() >= MIN_TOKEN_CHARS),
    )
}

/// Normalize a one-name capture. Commas are part of the name.
pub fn normalize_single_industry(raw: &str) -> Vec<String> {
    let token = clean_token(strip_lead_in(raw.trim()));
    if token.chars().count() < MIN_TOKEN_CHARS {
        return Vec::new();
    }
    vec![token]
}

fn strip_lead_in(text: &str) -> &str {
    match LEAD_IN.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

fn clean_token(token: &str) -> String {
    let token = TRAILING_NOISE.replace(token.trim(), "");
    let token = LEADING_DASHES.replace(&token, "");
    let token = LEADING_ARTICLE.replace(&token, "");
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '(' | ')'))
        .to_string()
}

/// Greedily merges consecutive comma fragments whose join is a known
/// comma-bearing industry name.
fn rejoin_comma_names(fragments: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(fragments.len());
    let mut i = 0;
    while i < fragments.len() {
        let max = MAX_REJOIN_FRAGMENTS.min(fragments.len() - i);
        let joined = (2..=max).rev().find_map(|k| {
            let candidate = fragments[i..i + k].join(", ");
            is_comma_name(&candidate).then_some((candidate, k))
        });
        match joined {
            Some((name, k)) => {
                out.push(name);
                i += k;
            }
            None => {
                out.push(fragments[i].clone());
                i += 1;
            }
        }
    }
    out
}

/// "Fabricated Metal Products and Furniture & Related Products" → two items.
/// Known names such as "Health Care and Social Assistance" stay whole.
fn split_trailing_and(item: &str) -> Vec<String> {
    if is_known_industry(item) {
        return vec![item.to_string()];
    }
    match TRAILING_AND.find_iter(item).last() {
        Some(m) => {
            // m ends one past the capital letter
            let head = &item[..m.start()];
            let tail = &item[m.end() - 1..];
            vec![head.to_string(), tail.to_string()]
        }
        None => vec![item.to_string()],
    }
}

fn dedup_preserving_order(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
