use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Provenance, ReportFlavor};
use super::industry_list::CanonicalIndustryList;

/// One industry attached to one (index, category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryMention {
    pub index: String,
    pub category: String,
    pub industry: String,
    pub provenance: Provenance,
}

/// Non-industry report fields. Reconciliation picks these per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub period_label: Option<String>,
    /// First day of the reported month, when `period_label` parses.
    pub period: Option<NaiveDate>,
    pub summary_table: Option<serde_json::Value>,
    pub narrative: Option<String>,
}

impl ReportMetadata {
    pub fn has_period_label(&self) -> bool {
        self.period_label
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    pub fn has_summary_table(&self) -> bool {
        match &self.summary_table {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
            Some(serde_json::Value::Array(a)) => !a.is_empty(),
            Some(serde_json::Value::Object(o)) => !o.is_empty(),
            Some(_) => true,
        }
    }

    pub fn has_narrative(&self) -> bool {
        self.narrative.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// One processed report: metadata, the per-index source paragraphs, and the
/// resulting classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportExtraction {
    pub id: Uuid,
    pub flavor: ReportFlavor,
    pub metadata: ReportMetadata,
    pub index_text: IndexMap<String, String>,
    pub industries: CanonicalIndustryList,
}

impl ReportExtraction {
    pub fn mentions(&self, provenance: Provenance) -> Vec<IndustryMention> {
        self.industries.to_mentions(provenance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_metadata_fields_count_as_missing() {
        let meta = ReportMetadata {
            period_label: Some("   ".into()),
            period: None,
            summary_table: Some(serde_json::json!({})),
            narrative: Some(String::new()),
        };
        assert!(!meta.has_period_label());
        assert!(!meta.has_summary_table());
        assert!(!meta.has_narrative());
    }

    #[test]
    fn populated_metadata_fields_are_detected() {
        let meta = ReportMetadata {
            period_label: Some("February 2024".into()),
            period: None,
            summary_table: Some(serde_json::json!([{"index": "New Orders", "value": 49.2}])),
            narrative: Some("Manufacturing contracted.".into()),
        };
        assert!(meta.has_period_label());
        assert!(meta.has_summary_table());
        assert!(meta.has_narrative());
    }
}
