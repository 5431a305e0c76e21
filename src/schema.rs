//! Canonical index/category schema per report flavor.
//!
//! Each tracked index owns exactly two mutually exclusive category labels.
//! The primary label wins when the same industry lands in both lists.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::enums::{Polarity, ReportFlavor};
use crate::pipeline::PipelineError;

// ═══════════════════════════════════════════════════════════
// Built-in tables: (index, positive label, negative label)
// ═══════════════════════════════════════════════════════════

const MANUFACTURING_INDICES: &[(&str, &str, &str)] = &[
    ("New Orders", "Growing", "Declining"),
    ("Production", "Growing", "Declining"),
    ("Employment", "Growing", "Declining"),
    ("Supplier Deliveries", "Slower", "Faster"),
    ("Inventories", "Higher", "Lower"),
    ("Customers' Inventories", "Too High", "Too Low"),
    ("Prices", "Increasing", "Decreasing"),
    ("Backlog of Orders", "Growing", "Declining"),
    ("New Export Orders", "Growing", "Declining"),
    ("Imports", "Growing", "Declining"),
];

const SERVICES_INDICES: &[(&str, &str, &str)] = &[
    ("Business Activity", "Growing", "Declining"),
    ("New Orders", "Growing", "Declining"),
    ("Employment", "Growing", "Declining"),
    ("Supplier Deliveries", "Slower", "Faster"),
    ("Inventories", "Higher", "Lower"),
    ("Prices", "Increasing", "Decreasing"),
    ("Backlog of Orders", "Growing", "Declining"),
    ("New Export Orders", "Growing", "Declining"),
    ("Imports", "Growing", "Declining"),
    ("Inventory Sentiment", "Too High", "Too Low"),
];

/// Lowercased, trimmed, whitespace-collapsed label with typographic
/// apostrophes folded to `'`.
pub fn normalize_label(label: &str) -> String {
    label
        .replace(['\u{2019}', '\u{2018}', '`'], "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn labels_match(a: &str, b: &str) -> bool {
    a == b || normalize_label(a) == normalize_label(b)
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// The two mutually exclusive status labels of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPair {
    pub positive: String,
    pub negative: String,
}

impl CategoryPair {
    pub fn new(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    /// Labels in declaration order: positive first.
    pub fn labels(&self) -> [&str; 2] {
        [self.positive.as_str(), self.negative.as_str()]
    }

    pub fn label(&self, polarity: Polarity) -> &str {
        match polarity {
            Polarity::Positive => &self.positive,
            Polarity::Negative => &self.negative,
        }
    }

    pub fn polarity_of(&self, label: &str) -> Option<Polarity> {
        if labels_match(&self.positive, label) {
            Some(Polarity::Positive)
        } else if labels_match(&self.negative, label) {
            Some(Polarity::Negative)
        } else {
            None
        }
    }

    /// Canonical spelling for a label given in any case.
    pub fn canonical_label(&self, label: &str) -> Option<&str> {
        self.polarity_of(label).map(|p| self.label(p))
    }
}

fn default_primary() -> Polarity {
    Polarity::Positive
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub categories: CategoryPair,
    /// Category that keeps an industry reported under both labels.
    #[serde(default = "default_primary")]
    pub primary: Polarity,
}

impl IndexSpec {
    pub fn new(name: &str, positive: &str, negative: &str) -> Self {
        Self {
            name: name.to_string(),
            categories: CategoryPair::new(positive, negative),
            primary: Polarity::Positive,
        }
    }

    pub fn primary_category(&self) -> &str {
        self.categories.label(self.primary)
    }

    pub fn secondary_category(&self) -> &str {
        self.categories.label(self.primary.opposite())
    }
}

/// Tracked indices and their category pairs for one report flavor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSchema {
    pub flavor: ReportFlavor,
    indices: Vec<IndexSpec>,
}

impl CanonicalSchema {
    /// Builds a schema, rejecting empty or inconsistent index tables.
    pub fn new(flavor: ReportFlavor, indices: Vec<IndexSpec>) -> Result<Self, PipelineError> {
        validate_indices(flavor, &indices)?;
        Ok(Self { flavor, indices })
    }

    /// Built-in schema for a report flavor.
    pub fn for_flavor(flavor: ReportFlavor) -> Self {
        let table = match flavor {
            ReportFlavor::Manufacturing => MANUFACTURING_INDICES,
            ReportFlavor::Services => SERVICES_INDICES,
        };
        Self {
            flavor,
            indices: table
                .iter()
                .map(|(name, pos, neg)| IndexSpec::new(name, pos, neg))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let raw: CanonicalSchema =
            serde_json::from_str(json).map_err(|e| PipelineError::JsonParsing(e.to_string()))?;
        Self::new(raw.flavor, raw.indices)
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn indices(&self) -> &[IndexSpec] {
        &self.indices
    }

    pub fn index_names(&self) -> impl Iterator<Item = &str> {
        self.indices.iter().map(|spec| spec.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Case- and apostrophe-insensitive index lookup.
    pub fn index(&self, name: &str) -> Option<&IndexSpec> {
        self.indices.iter().find(|spec| labels_match(&spec.name, name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index(name).is_some()
    }
}

fn validate_indices(flavor: ReportFlavor, indices: &[IndexSpec]) -> Result<(), PipelineError> {
    if indices.is_empty() {
        return Err(PipelineError::EmptySchema(flavor));
    }

    let mut seen = HashSet::new();
    for spec in indices {
        if spec.name.trim().is_empty() {
            return Err(PipelineError::InvalidSchema("index with blank name".into()));
        }
        if !seen.insert(normalize_label(&spec.name)) {
            return Err(PipelineError::InvalidSchema(format!(
                "duplicate index '{}'",
                spec.name
            )));
        }
        let [pos, neg] = spec.categories.labels();
        if pos.trim().is_empty() || neg.trim().is_empty() {
            return Err(PipelineError::InvalidSchema(format!(
                "index '{}' has a blank category label",
                spec.name
            )));
        }
        if labels_match(pos, neg) {
            return Err(PipelineError::InvalidSchema(format!(
                "index '{}' uses '{pos}' for both categories",
                spec.name
            )));
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_schemas_have_ten_indices() {
        for flavor in [ReportFlavor::Manufacturing, ReportFlavor::Services] {
            let schema = CanonicalSchema::for_flavor(flavor);
            assert_eq!(schema.len(), 10, "{flavor} schema size");
            assert!(CanonicalSchema::new(flavor, schema.indices().to_vec()).is_ok());
        }
    }

    #[test]
    fn flavors_differ_in_headline_and_sentiment_index() {
        let mfg = CanonicalSchema::for_flavor(ReportFlavor::Manufacturing);
        let svc = CanonicalSchema::for_flavor(ReportFlavor::Services);
        assert!(mfg.contains("Production"));
        assert!(!svc.contains("Production"));
        assert!(svc.contains("Business Activity"));
        assert!(mfg.contains("Customers' Inventories"));
        assert_eq!(
            svc.index("Inventory Sentiment").unwrap().categories,
            CategoryPair::new("Too High", "Too Low")
        );
    }

    #[test]
    fn primary_categories_follow_lookup_table() {
        let schema = CanonicalSchema::for_flavor(ReportFlavor::Manufacturing);
        let primary = |name: &str| schema.index(name).unwrap().primary_category().to_string();
        assert_eq!(primary("New Orders"), "Growing");
        assert_eq!(primary("Supplier Deliveries"), "Slower");
        assert_eq!(primary("Inventories"), "Higher");
        assert_eq!(primary("Customers' Inventories"), "Too High");
        assert_eq!(primary("Prices"), "Increasing");
        assert_eq!(
            schema.index("Prices").unwrap().secondary_category(),
            "Decreasing"
        );
    }

    #[test]
    fn index_lookup_is_case_insensitive() {
        let schema = CanonicalSchema::for_flavor(ReportFlavor::Manufacturing);
        assert_eq!(schema.index("new orders").unwrap().name, "New Orders");
        assert_eq!(
            schema.index("CUSTOMERS’ INVENTORIES").unwrap().name,
            "Customers' Inventories"
        );
        assert!(schema.index("Business Activity").is_none());
    }

    #[test]
    fn category_pair_resolves_polarity() {
        let pair = CategoryPair::new("Too High", "Too Low");
        assert_eq!(pair.polarity_of("too high"), Some(Polarity::Positive));
        assert_eq!(pair.polarity_of("TOO LOW"), Some(Polarity::Negative));
        assert_eq!(pair.polarity_of("Higher"), None);
        assert_eq!(pair.canonical_label("too  low"), Some("Too Low"));
    }

    #[test]
    fn empty_schema_is_configuration_error() {
        let err = CanonicalSchema::new(ReportFlavor::Services, vec![]).unwrap_err();
        assert!(matches!(err, PipelineError::EmptySchema(ReportFlavor::Services)));
    }

    #[test]
    fn duplicate_and_degenerate_indices_rejected() {
        let dup = vec![
            IndexSpec::new("New Orders", "Growing", "Declining"),
            IndexSpec::new("new orders", "Growing", "Declining"),
        ];
        assert!(matches!(
            CanonicalSchema::new(ReportFlavor::Manufacturing, dup),
            Err(PipelineError::InvalidSchema(_))
        ));

        let same_labels = vec![IndexSpec::new("Prices", "Up", "up")];
        assert!(matches!(
            CanonicalSchema::new(ReportFlavor::Manufacturing, same_labels),
            Err(PipelineError::InvalidSchema(_))
        ));
    }

    #[test]
    fn schema_loads_from_json_with_default_primary() {
        let json = r#"{
            "flavor": "manufacturing",
            "indices": [
                {"name": "New Orders", "categories": {"positive": "Growing", "negative": "Declining"}},
                {"name": "Prices", "categories": {"positive": "Increasing", "negative": "Decreasing"}, "primary": "negative"}
            ]
        }"#;
        let schema = CanonicalSchema::from_json(json).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.index("New Orders").unwrap().primary, Polarity::Positive);
        assert_eq!(schema.index("Prices").unwrap().primary_category(), "Decreasing");
    }

    #[test]
    fn schema_json_with_no_indices_is_rejected() {
        let json = r#"{"flavor": "services", "indices": []}"#;
        assert!(matches!(
            CanonicalSchema::from_json(json),
            Err(PipelineError::EmptySchema(_))
        ));
        assert!(matches!(
            CanonicalSchema::from_json("not json"),
            Err(PipelineError::JsonParsing(_))
        ));
    }

    #[test]
    fn schema_loads_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("schema.json");
        let schema = CanonicalSchema::for_flavor(ReportFlavor::Services);
        std::fs::write(&path, serde_json::to_string(&schema).unwrap()).unwrap();

        let loaded = CanonicalSchema::load(&path).unwrap();
        assert_eq!(loaded, schema);
    }
}
