//! Report processing orchestrator.
//!
//! Single entry point that drives one report through the whole pipeline:
//! pattern extraction → model-candidate ingestion → reconciliation →
//! validation, with diagnostics collected along the way.
//!
//! Reports share nothing at runtime: each gets its own `ExtractionContext`,
//! so `process_batch` fans them out across rayon's pool.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ClassifierConfig;
use crate::models::enums::{Provenance, ReportFlavor};
use crate::models::report::{ReportExtraction, ReportMetadata};
use crate::pipeline::diagnostic::{self, DiagnosticEvent};
use crate::pipeline::extraction::{
    detect_report_flavor, extract_report, parse_period_label, ExtractionContext, PatternExtraction,
};
use crate::pipeline::reconcile::{coerce_model_candidate, reconcile_sources, ReconciliationSummary, SourceRef};
use crate::pipeline::validation::{validate_industry_list, ValidationReport};
use crate::pipeline::PipelineError;
use crate::schema::CanonicalSchema;

/// One report as handed to the classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportInput {
    /// "manufacturing", "services", "non-manufacturing", ...; detected when absent.
    #[serde(default)]
    pub flavor: Option<String>,
    #[serde(default)]
    pub period_label: Option<String>,
    #[serde(default)]
    pub summary_table: Option<serde_json::Value>,
    #[serde(default)]
    pub narrative: Option<String>,
    /// index name → raw narrative paragraph.
    #[serde(default)]
    pub index_text: IndexMap<String, String>,
    /// Second classification from an external model, shape unverified.
    #[serde(default)]
    pub model_candidate: Option<serde_json::Value>,
}

impl ReportInput {
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|e| PipelineError::JsonParsing(e.to_string()))
    }

    fn metadata(&self) -> ReportMetadata {
        let period_label = self
            .period_label
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        ReportMetadata {
            period: period_label.as_deref().and_then(parse_period_label),
            period_label,
            summary_table: self.summary_table.clone(),
            narrative: self.narrative.clone(),
        }
    }
}

/// Everything the pipeline produced for one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReport {
    pub extraction: ReportExtraction,
    pub pattern: PatternExtraction,
    pub validation: ValidationReport,
    /// Absent when no model candidate was supplied.
    pub reconciliation: Option<ReconciliationSummary>,
    pub diagnostics: Vec<DiagnosticEvent>,
}

pub struct ReportProcessor {
    config: ClassifierConfig,
    schema_override: Option<CanonicalSchema>,
}

impl ReportProcessor {
    /// Loads the schema override named in `config`, if any.
    pub fn new(config: ClassifierConfig) -> Result<Self, PipelineError> {
        let schema_override = match &config.schema_path {
            Some(path) => {
                let schema = CanonicalSchema::load(path)?;
                tracing::info!(
                    path = %path.display(),
                    flavor = %schema.flavor,
                    indices = schema.len(),
                    "Canonical schema override loaded"
                );
                Some(schema)
            }
            None => None,
        };
        Ok(Self {
            config,
            schema_override,
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Active schema for a flavor: the override when it covers that flavor,
    /// else the built-in table.
    pub fn schema_for(&self, flavor: ReportFlavor) -> CanonicalSchema {
        match &self.schema_override {
            Some(schema) if schema.flavor == flavor => schema.clone(),
            _ => CanonicalSchema::for_flavor(flavor),
        }
    }

    /// Flavor stated by the input, else detected from its content.
    pub fn resolve_flavor(&self, input: &ReportInput) -> ReportFlavor {
        if let Some(label) = input.flavor.as_deref() {
            match ReportFlavor::from_label(label) {
                Ok(flavor) => return flavor,
                Err(e) => tracing::warn!(error = %e, "Unknown report flavor; detecting"),
            }
        }
        detect_report_flavor(
            input.index_text.keys().map(String::as_str),
            input.narrative.as_deref(),
        )
    }

    /// Run one report through the full pipeline. Never fails: data-quality
    /// problems end up in `diagnostics`.
    pub fn process(&self, input: &ReportInput) -> ClassifiedReport {
        let id = Uuid::new_v4();
        let flavor = self.resolve_flavor(input);
        let schema = self.schema_for(flavor);
        let dump_dir = diagnostic::dump_dir_for(self.config.dump_dir.as_deref(), &id);
        if let Some(dir) = &dump_dir {
            diagnostic::dump_json(dir, "00-input.json", input);
        }

        let mut ctx = ExtractionContext::new(flavor, &self.config);

        // Step 1: pattern path
        let pattern = extract_report(&input.index_text, &schema, &mut ctx);
        let pattern_metadata = input.metadata();
        if let Some(dir) = &dump_dir {
            diagnostic::dump_json(dir, "01-pattern-extraction.json", &pattern);
        }

        // Step 2: model candidate + reconciliation
        let (metadata, mut industries, reconciliation, merge_events) = match &input.model_candidate {
            Some(raw) => {
                let candidate = coerce_model_candidate(raw, &schema, &mut ctx);
                if let Some(dir) = &dump_dir {
                    diagnostic::dump_json(dir, "02-model-candidate.json", &candidate);
                }
                let merged = reconcile_sources(
                    SourceRef {
                        provenance: Provenance::Pattern,
                        metadata: &pattern_metadata,
                        industries: &pattern.industries,
                    },
                    SourceRef {
                        provenance: Provenance::Model,
                        metadata: &candidate.metadata,
                        industries: &candidate.industries,
                    },
                    &schema,
                );
                (merged.metadata, merged.industries, Some(merged.summary), merged.events)
            }
            None => (pattern_metadata, pattern.industries.clone(), None, Vec::new()),
        };
        industries.ensure_canonical_categories(&schema);

        let extraction = ReportExtraction {
            id,
            flavor,
            metadata,
            index_text: input.index_text.clone(),
            industries,
        };
        if let Some(dir) = &dump_dir {
            diagnostic::dump_json(dir, "03-reconciled.json", &extraction);
        }

        // Step 3: validation
        let mut diagnostics = ctx.take_events();
        diagnostics.extend(merge_events);
        let validation = validate_industry_list(
            &extraction.industries,
            &schema,
            self.config.forced_pass,
            &mut diagnostics,
        );
        if let Some(dir) = &dump_dir {
            diagnostic::dump_json(dir, "04-validation.json", &validation);
        }

        tracing::info!(
            report_id = %id,
            flavor = %flavor,
            industries = extraction.industries.total_industry_count(),
            passed = validation.pass_count(),
            indices = validation.results.len(),
            forced = validation.forced_pass.is_some(),
            diagnostics = diagnostics.len(),
            "Report classified"
        );

        ClassifiedReport {
            extraction,
            pattern,
            validation,
            reconciliation,
            diagnostics,
        }
    }

    /// Process independent reports in parallel; output order matches input.
    pub fn process_batch(&self, inputs: &[ReportInput]) -> Vec<ClassifiedReport> {
        inputs.par_iter().map(|input| self.process(input)).collect()
    }
}
