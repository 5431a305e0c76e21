use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::industry_list::CategoryMap;
use crate::pipeline::diagnostic::DiagnosticEvent;
use crate::schema::{labels_match, IndexSpec};

/// An industry listed under more than one category of the same index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupConflict {
    pub industry: String,
    pub kept: String,
    pub removed_from: String,
}

impl DedupConflict {
    pub fn into_event(self, index: &str) -> DiagnosticEvent {
        DiagnosticEvent::DedupConflict {
            index: index.to_string(),
            industry: self.industry,
            kept: self.kept,
            removed_from: self.removed_from,
        }
    }
}

/// Guarantees each industry sits in exactly one category of an index.
///
/// The primary category (per `spec`, or the first key for indices outside
/// the schema) keeps a contested industry; other lists lose it. Remaining
/// order is untouched and repeats within a list are dropped. Pure and
/// idempotent.
pub fn deduplicate_categories(
    spec: Option<&IndexSpec>,
    categories: &CategoryMap,
) -> (CategoryMap, Vec<DedupConflict>) {
    let primary = match spec {
        Some(spec) => categories
            .keys()
            .find(|key| labels_match(key, spec.primary_category())),
        None => categories.keys().next(),
    };

    // industry → owning category: primary first, then declaration order
    let mut owner: HashMap<&str, &str> = HashMap::new();
    if let Some(primary) = primary {
        for industry in &categories[primary] {
            owner.entry(industry).or_insert(primary);
        }
    }
    for (category, industries) in categories {
        for industry in industries {
            owner.entry(industry).or_insert(category);
        }
    }

    let mut conflicts = Vec::new();
    let mut deduped = CategoryMap::with_capacity(categories.len());
    for (category, industries) in categories {
        let mut kept: Vec<String> = Vec::with_capacity(industries.len());
        for industry in industries {
            if kept.contains(industry) {
                continue;
            }
            match owner.get(industry.as_str()) {
                Some(&owning) if owning != category.as_str() => {
                    conflicts.push(DedupConflict {
                        industry: industry.clone(),
                        kept: owning.to_string(),
                        removed_from: category.clone(),
                    });
                }
                _ => kept.push(industry.clone()),
            }
        }
        deduped.insert(category.clone(), kept);
    }

    (deduped, conflicts)
}
