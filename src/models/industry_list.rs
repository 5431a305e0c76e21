//! Per-report classification: index → category → ordered industry names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::enums::Provenance;
use super::report::IndustryMention;
use crate::schema::{labels_match, CanonicalSchema};

/// Category label → ordered, unique industry names.
pub type CategoryMap = IndexMap<String, Vec<String>>;

/// Ordered mapping from index name to its category lists.
///
/// Insertion order is preserved for both levels; it drives first-seen
/// ordering during reconciliation and the forced-pass choice in validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalIndustryList {
    indices: IndexMap<String, CategoryMap>,
}

impl CanonicalIndustryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Exact-key lookup.
    pub fn index(&self, name: &str) -> Option<&CategoryMap> {
        self.indices.get(name)
    }

    /// Case- and apostrophe-insensitive lookup. Returns the stored key too.
    pub fn find_index(&self, name: &str) -> Option<(&String, &CategoryMap)> {
        self.indices.get_key_value(name).or_else(|| {
            self.indices
                .iter()
                .find(|(key, _)| labels_match(key, name))
        })
    }

    /// Returns the category map for `name`, inserting an empty one if absent.
    pub fn entry(&mut self, name: &str) -> &mut CategoryMap {
        self.indices.entry(name.to_string()).or_default()
    }

    pub fn insert_index(&mut self, name: impl Into<String>, categories: CategoryMap) {
        self.indices.insert(name.into(), categories);
    }

    pub fn set_category(
        &mut self,
        index: &str,
        category: impl Into<String>,
        industries: Vec<String>,
    ) {
        self.entry(index).insert(category.into(), industries);
    }

    /// Industries under (index, category); empty when either is absent.
    pub fn category(&self, index: &str, category: &str) -> &[String] {
        self.indices
            .get(index)
            .and_then(|cats| cats.get(category))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn indices(&self) -> impl Iterator<Item = (&String, &CategoryMap)> {
        self.indices.iter()
    }

    pub fn indices_mut(&mut self) -> impl Iterator<Item = (&String, &mut CategoryMap)> {
        self.indices.iter_mut()
    }

    /// Sum of every category-list length across all indices.
    pub fn total_industry_count(&self) -> usize {
        self.indices
            .values()
            .flat_map(|cats| cats.values())
            .map(Vec::len)
            .sum()
    }

    /// Adds missing canonical category keys (as empty lists) to every present
    /// index the schema knows. Absent indices stay absent.
    pub fn ensure_canonical_categories(&mut self, schema: &CanonicalSchema) {
        for (name, categories) in self.indices.iter_mut() {
            let Some(spec) = schema.index(name) else {
                continue;
            };
            for label in spec.categories.labels() {
                let present = categories.keys().any(|k| labels_match(k, label));
                if !present {
                    categories.insert(label.to_string(), Vec::new());
                }
            }
        }
    }

    /// Flattens into one mention per (index, category, industry).
    pub fn to_mentions(&self, provenance: Provenance) -> Vec<IndustryMention> {
        self.indices
            .iter()
            .flat_map(|(index, cats)| {
                cats.iter().flat_map(move |(category, industries)| {
                    industries.iter().map(move |industry| IndustryMention {
                        index: index.clone(),
                        category: category.clone(),
                        industry: industry.clone(),
                        provenance,
                    })
                })
            })
            .collect()
    }
}
