//! Schema gate over a reconciled classification.
//!
//! Only schema indices are scored; extra indices ride along unscored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::industry_list::CanonicalIndustryList;
use crate::pipeline::diagnostic::DiagnosticEvent;
use crate::schema::{labels_match, CanonicalSchema};

/// Why an index failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    MissingIndex,
    MissingCategories,
    NoIndustries,
}

impl ValidationFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingIndex => "missing index",
            Self::MissingCategories => "missing categories",
            Self::NoIndustries => "no industries",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// index → pass, in schema order.
    pub results: IndexMap<String, bool>,
    /// Reason per failing index (a forced pass keeps its reason).
    pub failures: IndexMap<String, ValidationFailure>,
    /// Set when every index failed and this one was passed anyway.
    pub forced_pass: Option<String>,
}

impl ValidationReport {
    pub fn passed(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|(_, ok)| **ok)
            .map(|(name, _)| name.as_str())
    }

    pub fn pass_count(&self) -> usize {
        self.results.values().filter(|ok| **ok).count()
    }

    /// True when at least one index passed on its own merit.
    pub fn has_genuine_pass(&self) -> bool {
        self.forced_pass.is_none() && self.pass_count() > 0
    }
}

/// Check one index against its canonical categories.
fn check_index(
    list: &CanonicalIndustryList,
    name: &str,
    labels: [&str; 2],
) -> Result<(), ValidationFailure> {
    let Some((_, categories)) = list.find_index(name) else {
        return Err(ValidationFailure::MissingIndex);
    };
    let has_canonical_key = categories
        .keys()
        .any(|key| labels.iter().any(|label| labels_match(key, label)));
    if !has_canonical_key {
        return Err(ValidationFailure::MissingCategories);
    }
    if categories.values().all(Vec::is_empty) {
        return Err(ValidationFailure::NoIndustries);
    }
    Ok(())
}

/// Validate every schema index.
///
/// With `forced_pass` on and every index failing, exactly one index is
/// flipped to pass: the first (in schema order) with any non-empty
/// category, else the first schema index. The choice is reported in
/// `ValidationReport::forced_pass` and as a diagnostic event.
pub fn validate_industry_list(
    list: &CanonicalIndustryList,
    schema: &CanonicalSchema,
    forced_pass: bool,
    events: &mut Vec<DiagnosticEvent>,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for spec in schema.indices() {
        match check_index(list, &spec.name, spec.categories.labels()) {
            Ok(()) => {
                report.results.insert(spec.name.clone(), true);
            }
            Err(reason) => {
                tracing::debug!(index = %spec.name, reason = reason.as_str(), "Index failed validation");
                report.results.insert(spec.name.clone(), false);
                report.failures.insert(spec.name.clone(), reason);
            }
        }
    }

    if forced_pass && !report.results.is_empty() && report.pass_count() == 0 {
        let chosen = schema
            .indices()
            .iter()
            .find(|spec| {
                list.find_index(&spec.name)
                    .is_some_and(|(_, cats)| cats.values().any(|v| !v.is_empty()))
            })
            .or_else(|| schema.indices().first())
            .map(|spec| spec.name.clone());

        if let Some(name) = chosen {
            tracing::warn!(index = %name, "All indices failed validation; forcing one to pass");
            report.results.insert(name.clone(), true);
            events.push(DiagnosticEvent::ForcedPass { index: name.clone() });
            report.forced_pass = Some(name);
        }
    }

    report
}
