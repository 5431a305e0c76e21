use serde::{Deserialize, Serialize};

use super::dedup::deduplicate_categories;
use crate::models::enums::Provenance;
use crate::models::industry_list::CanonicalIndustryList;
use crate::models::report::ReportMetadata;
use crate::pipeline::diagnostic::DiagnosticEvent;
use crate::schema::{labels_match, CanonicalSchema};

/// One side of a reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct SourceRef<'a> {
    pub provenance: Provenance,
    pub metadata: &'a ReportMetadata,
    pub industries: &'a CanonicalIndustryList,
}

/// How a merge went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub base: Provenance,
    pub first_count: usize,
    pub second_count: usize,
    pub merged_count: usize,
    /// Items appended from the non-base source.
    pub additions: usize,
    pub conflicts_resolved: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub metadata: ReportMetadata,
    pub industries: CanonicalIndustryList,
    pub summary: ReconciliationSummary,
    pub events: Vec<DiagnosticEvent>,
}

/// Merge two classifications of the same report.
///
/// The source with the strictly larger industry total is the base (ties go
/// to `first`). Each category becomes the base list followed by the other
/// source's unseen items; metadata fields prefer the non-base value when it
/// is non-empty. Cross-category duplicates the merge reintroduces are then
/// resolved. Category keys are left as the sources had them, so merging a
/// de-duplicated source with itself returns it unchanged.
pub fn reconcile_sources(
    first: SourceRef<'_>,
    second: SourceRef<'_>,
    schema: &CanonicalSchema,
) -> Reconciled {
    let first_count = first.industries.total_industry_count();
    let second_count = second.industries.total_industry_count();
    let (base, other) = if second_count > first_count {
        (second, first)
    } else {
        (first, second)
    };

    let metadata = merge_metadata(base.metadata, other.metadata);

    let mut industries = base.industries.clone();
    let mut additions = 0;
    for (index, categories) in other.industries.indices() {
        let target = match industries.find_index(index) {
            Some((key, _)) => key.clone(),
            None => index.clone(),
        };
        let merged = industries.entry(&target);
        for (category, names) in categories {
            let key = merged
                .keys()
                .find(|k| labels_match(k, category))
                .cloned()
                .unwrap_or_else(|| category.clone());
            let list = merged.entry(key).or_default();
            for name in names {
                if !list.contains(name) {
                    list.push(name.clone());
                    additions += 1;
                }
            }
        }
    }

    let mut events = Vec::new();
    for (index, categories) in industries.indices_mut() {
        let (deduped, conflicts) = deduplicate_categories(schema.index(index), categories);
        for conflict in conflicts {
            tracing::warn!(
                index = %index,
                industry = %conflict.industry,
                kept = %conflict.kept,
                "Sources disagree on category; primary kept"
            );
            events.push(conflict.into_event(index));
        }
        *categories = deduped;
    }

    let summary = ReconciliationSummary {
        base: base.provenance,
        first_count,
        second_count,
        merged_count: industries.total_industry_count(),
        additions,
        conflicts_resolved: events.len(),
    };

    Reconciled {
        metadata,
        industries,
        summary,
        events,
    }
}

/// Field-wise: the non-base value when present, else the base value.
fn merge_metadata(base: &ReportMetadata, other: &ReportMetadata) -> ReportMetadata {
    let (period_label, period) = if other.has_period_label() {
        (other.period_label.clone(), other.period.or(base.period))
    } else {
        (base.period_label.clone(), base.period.or(other.period))
    };
    ReportMetadata {
        period_label,
        period,
        summary_table: if other.has_summary_table() {
            other.summary_table.clone()
        } else {
            base.summary_table.clone()
        },
        narrative: if other.has_narrative() {
            other.narrative.clone()
        } else {
            base.narrative.clone()
        },
    }
}
