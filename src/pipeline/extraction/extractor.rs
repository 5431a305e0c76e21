//! Generic category matcher: walks the template tiers for one category and
//! returns the raw list substring, then normalizes it into industry names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::context::ExtractionContext;
use super::normalize::{normalize_industry_list, normalize_single_industry};
use super::patterns::{CategoryPatterns, CompiledPattern, SENTENCE_FRAGMENT};
use super::preprocess::preprocess_index_text;
use super::sentences::split_into_sentences;
use crate::models::industry_list::{CanonicalIndustryList, CategoryMap};
use crate::pipeline::diagnostic::DiagnosticEvent;
use crate::pipeline::reconcile::dedup::deduplicate_categories;
use crate::schema::{CanonicalSchema, IndexSpec};

/// Which tier produced a category's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Template,
    SingleIndustry,
    Loose,
    Sentence,
    NoneReported,
    Miss,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::SingleIndustry => "single_industry",
            Self::Loose => "loose",
            Self::Sentence => "sentence",
            Self::NoneReported => "none_reported",
            Self::Miss => "miss",
        }
    }
}

/// Raw list substring for one category, empty on a miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub raw: String,
    pub tier: MatchTier,
}

impl CategoryMatch {
    fn hit(raw: &str, tier: MatchTier) -> Self {
        Self {
            raw: raw.to_string(),
            tier,
        }
    }

    fn empty(tier: MatchTier) -> Self {
        Self {
            raw: String::new(),
            tier,
        }
    }
}

/// Pattern-path result for one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternExtraction {
    pub industries: CanonicalIndustryList,
    /// index → category → tier that produced the list.
    pub tiers: IndexMap<String, IndexMap<String, MatchTier>>,
}

fn first_capture<'t>(tier: &[CompiledPattern], text: &'t str) -> Option<&'t str> {
    tier.iter().find_map(|pattern| pattern.capture(text))
}

/// Find the raw list substring for one category in preprocessed text.
///
/// Tiers, first hit wins: full templates, single-industry sentences, an
/// explicit "no industry reported", loose templates, then (when enabled)
/// keyword sentences that name `patterns`' category but not `opposing`'s.
pub fn match_category(
    text: &str,
    patterns: &CategoryPatterns,
    opposing: &CategoryPatterns,
    sentence_fallback: bool,
) -> CategoryMatch {
    if text.is_empty() {
        return CategoryMatch::empty(MatchTier::Miss);
    }
    if let Some(raw) = first_capture(&patterns.strict, text) {
        return CategoryMatch::hit(raw, MatchTier::Template);
    }
    if let Some(raw) = first_capture(&patterns.single, text) {
        return CategoryMatch::hit(raw, MatchTier::SingleIndustry);
    }
    if patterns.none_reported.iter().any(|p| p.is_match(text)) {
        return CategoryMatch::empty(MatchTier::NoneReported);
    }
    if let Some(raw) = first_capture(&patterns.loose, text) {
        return CategoryMatch::hit(raw, MatchTier::Loose);
    }
    if sentence_fallback {
        let fragment = split_into_sentences(text)
            .into_iter()
            .filter(|s| patterns.mentions_keyword(s.text) && !opposing.mentions_keyword(s.text))
            .find_map(|s| {
                let caps = SENTENCE_FRAGMENT.captures(s.text)?;
                let raw = caps.get(1)?.as_str().trim();
                (!raw.is_empty()).then_some(raw)
            });
        if let Some(raw) = fragment {
            return CategoryMatch::hit(raw, MatchTier::Sentence);
        }
    }
    CategoryMatch::empty(MatchTier::Miss)
}

/// Extract both categories of one index from its raw paragraph.
///
/// Returns the category map (canonical labels, both keys present) and the
/// tier per category. Misses are logged and recorded; they never fail.
pub fn extract_index(
    raw_text: &str,
    spec: &IndexSpec,
    ctx: &mut ExtractionContext,
) -> (CategoryMap, IndexMap<String, MatchTier>) {
    let text = preprocess_index_text(raw_text);
    let [first, second] = spec.categories.labels();
    let first_patterns = ctx.patterns_for(&spec.name, first);
    let second_patterns = ctx.patterns_for(&spec.name, second);

    let mut categories = CategoryMap::new();
    let mut tiers = IndexMap::new();

    for (label, patterns, opposing) in [
        (first, &first_patterns, &second_patterns),
        (second, &second_patterns, &first_patterns),
    ] {
        let found = match_category(&text, patterns, opposing, ctx.sentence_fallback());
        let names = match found.tier {
            MatchTier::SingleIndustry => normalize_single_industry(&found.raw),
            MatchTier::Template | MatchTier::Loose | MatchTier::Sentence => {
                normalize_industry_list(&found.raw)
            }
            MatchTier::NoneReported | MatchTier::Miss => Vec::new(),
        };
        let names = ctx.canonicalize_list(names);

        if found.tier == MatchTier::Miss {
            tracing::debug!(index = %spec.name, category = %label, "Pattern miss");
            ctx.record(DiagnosticEvent::PatternMiss {
                index: spec.name.clone(),
                category: label.to_string(),
            });
        } else {
            tracing::debug!(
                index = %spec.name,
                category = %label,
                tier = found.tier.as_str(),
                count = names.len(),
                "Category matched"
            );
        }

        categories.insert(label.to_string(), names);
        tiers.insert(label.to_string(), found.tier);
    }

    (categories, tiers)
}

/// Pattern path for a whole report: extract, normalize and de-duplicate
/// every index paragraph. Paragraphs for indices outside the schema are
/// recorded as schema gaps and skipped.
pub fn extract_report(
    index_text: &IndexMap<String, String>,
    schema: &CanonicalSchema,
    ctx: &mut ExtractionContext,
) -> PatternExtraction {
    let mut result = PatternExtraction::default();

    for (name, text) in index_text {
        let Some(spec) = schema.index(name) else {
            tracing::debug!(index = %name, "Index text outside canonical schema");
            ctx.record(DiagnosticEvent::SchemaGap {
                index: name.clone(),
            });
            continue;
        };

        let (categories, tiers) = extract_index(text, spec, ctx);
        let (categories, conflicts) = deduplicate_categories(Some(spec), &categories);
        for conflict in conflicts {
            tracing::debug!(
                index = %spec.name,
                industry = %conflict.industry,
                kept = %conflict.kept,
                "Same-paragraph conflict resolved"
            );
            ctx.record(conflict.into_event(&spec.name));
        }

        result.industries.insert_index(spec.name.clone(), categories);
        result.tiers.insert(spec.name.clone(), tiers);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierConfig;
    use crate::models::enums::ReportFlavor;

    fn ctx() -> ExtractionContext {
        ExtractionContext::new(ReportFlavor::Manufacturing, &ClassifierConfig::default())
    }

    fn spec(name: &str) -> IndexSpec {
        CanonicalSchema::for_flavor(ReportFlavor::Manufacturing)
            .index(name)
            .unwrap()
            .clone()
    }

    #[test]
    fn template_sentence_yields_six_ordered_industries() {
        let text = "The six industries reporting growth in February, in order, are: Chemical Products; \
                    Machinery; Primary Metals; Apparel; Furniture; Textile Mills.";
        let mut context = ctx();
        let (cats, tiers) = extract_index(text, &spec("New Orders"), &mut context);
        assert_eq!(
            cats["Growing"],
            vec![
                "Chemical Products",
                "Machinery",
                "Primary Metals",
                "Apparel",
                "Furniture",
                "Textile Mills"
            ]
        );
        assert_eq!(tiers["Growing"], MatchTier::Template);
        assert!(cats["Declining"].is_empty());
        assert_eq!(tiers["Declining"], MatchTier::Miss);
    }

    #[test]
    fn abbreviated_name_does_not_end_the_list() {
        let text = "The four industries that reported paying increased prices for raw materials \
                    in February, in order, are: Primary Metals; Machinery; Misc. Manufacturing; \
                    Paper Products. Prices rose for a fourth month.";
        let (cats, tiers) = extract_index(text, &spec("Prices"), &mut ctx());
        assert_eq!(
            cats["Increasing"],
            vec![
                "Primary Metals",
                "Machinery",
                "Miscellaneous Manufacturing",
                "Paper Products"
            ]
        );
        assert_eq!(tiers["Increasing"], MatchTier::Template);

        let single = "Misc. Manufacturing was the only industry reporting a decrease in February.";
        let (cats, tiers) = extract_index(single, &spec("Prices"), &mut ctx());
        assert_eq!(cats["Decreasing"], vec!["Miscellaneous Manufacturing"]);
        assert_eq!(tiers["Decreasing"], MatchTier::SingleIndustry);
    }

    #[test]
    fn both_categories_read_from_one_paragraph() {
        let text = "The seven industries reporting growth in new orders in February are: \
                    Machinery; Paper Products.\n\nThe four industries reporting a decline in \
                    new orders in February are: Textile Mills; Wood Products.";
        let (cats, _) = extract_index(text, &spec("New Orders"), &mut ctx());
        assert_eq!(cats["Growing"], vec!["Machinery", "Paper Products"]);
        assert_eq!(cats["Declining"], vec!["Textile Mills", "Wood Products"]);
    }

    #[test]
    fn following_order_wording_matches() {
        let text = "Of the six manufacturing industries, three reported employment growth in \
                    February, in the following order: Primary Metals, Machinery, and Paper Products.";
        let (cats, tiers) = extract_index(text, &spec("Employment"), &mut ctx());
        assert_eq!(
            cats["Growing"],
            vec!["Primary Metals", "Machinery", "Paper Products"]
        );
        assert_eq!(tiers["Growing"], MatchTier::Template);
    }

    #[test]
    fn single_industry_is_not_comma_split() {
        let text = "The only industry reporting a decrease in new orders in February is \
                    Apparel, Leather & Allied Products.";
        let (cats, tiers) = extract_index(text, &spec("New Orders"), &mut ctx());
        assert_eq!(cats["Declining"], vec!["Apparel, Leather & Allied Products"]);
        assert_eq!(tiers["Declining"], MatchTier::SingleIndustry);
    }

    #[test]
    fn explicit_none_is_not_a_miss() {
        let text = "No industry reported a decrease in new orders in February.";
        let mut context = ctx();
        let (cats, tiers) = extract_index(text, &spec("New Orders"), &mut context);
        assert!(cats["Declining"].is_empty());
        assert_eq!(tiers["Declining"], MatchTier::NoneReported);
        let misses: Vec<_> = context
            .events()
            .iter()
            .filter(|e| matches!(e, DiagnosticEvent::PatternMiss { category, .. } if category == "Declining"))
            .collect();
        assert!(misses.is_empty());
    }

    #[test]
    fn prices_use_paying_wording() {
        let text = "The 10 industries that reported paying increased prices for raw materials in \
                    February, in order, are: Primary Metals; Machinery. The only industry that \
                    reported paying decreased prices in February is Wood Products.";
        let (cats, _) = extract_index(text, &spec("Prices"), &mut ctx());
        assert_eq!(cats["Increasing"], vec!["Primary Metals", "Machinery"]);
        assert_eq!(cats["Decreasing"], vec!["Wood Products"]);
    }

    #[test]
    fn customers_inventories_use_too_high_wording() {
        let text = "The two industries reporting customers' inventories as too high in February \
                    are: Paper Products; Textile Mills. The eight industries reporting customers' \
                    inventories as too low in February, in order, are: Machinery; Chemical Products.";
        let (cats, _) = extract_index(text, &spec("Customers' Inventories"), &mut ctx());
        assert_eq!(cats["Too High"], vec!["Paper Products", "Textile Mills"]);
        assert_eq!(cats["Too Low"], vec!["Machinery", "Chemical Products"]);
    }

    #[test]
    fn loose_tier_catches_short_wording() {
        let text = "Slower deliveries noted among: Machinery; Primary Metals.";
        let (cats, tiers) = extract_index(text, &spec("Supplier Deliveries"), &mut ctx());
        assert_eq!(cats["Slower"], vec!["Machinery", "Primary Metals"]);
        assert_eq!(tiers["Slower"], MatchTier::Loose);
    }

    #[test]
    fn sentence_tier_reads_including_fragment() {
        let text = "Growth continued at several manufacturers including Machinery and Paper Products.";
        let (cats, tiers) = extract_index(text, &spec("Production"), &mut ctx());
        assert_eq!(cats["Growing"], vec!["Machinery", "Paper Products"]);
        assert_eq!(tiers["Growing"], MatchTier::Sentence);
    }

    #[test]
    fn sentence_tier_can_be_disabled() {
        let text = "Growth continued at several manufacturers including Machinery and Paper Products.";
        let config = ClassifierConfig {
            sentence_fallback: false,
            ..ClassifierConfig::default()
        };
        let mut context = ExtractionContext::new(ReportFlavor::Manufacturing, &config);
        let (cats, tiers) = extract_index(text, &spec("Production"), &mut context);
        assert!(cats["Growing"].is_empty());
        assert_eq!(tiers["Growing"], MatchTier::Miss);
    }

    #[test]
    fn empty_text_misses_both_categories() {
        let mut context = ctx();
        let (cats, tiers) = extract_index("", &spec("Imports"), &mut context);
        assert_eq!(cats.len(), 2);
        assert!(tiers.values().all(|t| *t == MatchTier::Miss));
        assert_eq!(context.events().len(), 2);
    }

    #[test]
    fn unlisted_category_uses_label_wording() {
        let custom = IndexSpec::new("Order Mix", "Broader", "Narrower");
        let text = "The industries reporting broader order mix are: Machinery; Paper Products.";
        let (cats, _) = extract_index(text, &custom, &mut ctx());
        assert_eq!(cats["Broader"], vec!["Machinery", "Paper Products"]);
        assert!(cats["Narrower"].is_empty());
    }

    #[test]
    fn extracted_names_are_canonicalized() {
        let text = "The industries reporting growth in February are: computer and electronic \
                    products; Machinery.";
        let (cats, _) = extract_index(text, &spec("New Orders"), &mut ctx());
        assert_eq!(
            cats["Growing"],
            vec!["Computer & Electronic Products", "Machinery"]
        );
    }

    #[test]
    fn report_extraction_dedups_and_flags_unknown_indices() {
        let schema = CanonicalSchema::for_flavor(ReportFlavor::Manufacturing);
        let mut index_text = IndexMap::new();
        index_text.insert(
            "new orders".to_string(),
            "The industries reporting growth in February are: Machinery; Paper Products. The \
             industries reporting a decline in February are: Machinery; Wood Products."
                .to_string(),
        );
        index_text.insert("Order Mix".to_string(), "anything".to_string());

        let mut context = ctx();
        let result = extract_report(&index_text, &schema, &mut context);

        let orders = result.industries.index("New Orders").unwrap();
        assert_eq!(orders["Growing"], vec!["Machinery", "Paper Products"]);
        assert_eq!(orders["Declining"], vec!["Wood Products"]);
        assert!(result.industries.index("Order Mix").is_none());
        assert!(context
            .events()
            .iter()
            .any(|e| matches!(e, DiagnosticEvent::SchemaGap { index } if index == "Order Mix")));
        assert!(context
            .events()
            .iter()
            .any(|e| matches!(e, DiagnosticEvent::DedupConflict { .. })));
    }
}
