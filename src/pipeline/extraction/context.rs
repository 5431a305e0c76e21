//! Per-report state passed explicitly through extraction.
//!
//! Holds the memoised lookups and the diagnostic sink. One context per
//! report keeps parallel processing free of shared mutable state.

use std::collections::HashMap;
use std::sync::Arc;

use super::patterns::{builtin_patterns, CategoryPatterns};
use super::vocabulary::IndustryVocabulary;
use crate::config::ClassifierConfig;
use crate::models::enums::ReportFlavor;
use crate::pipeline::diagnostic::DiagnosticEvent;
use crate::schema::normalize_label;

pub struct ExtractionContext {
    vocabulary: IndustryVocabulary,
    canonicalize: bool,
    sentence_fallback: bool,
    /// Keyed by normalized category label.
    label_patterns: HashMap<String, Arc<CategoryPatterns>>,
    canonical_names: HashMap<String, String>,
    events: Vec<DiagnosticEvent>,
}

impl ExtractionContext {
    pub fn new(flavor: ReportFlavor, config: &ClassifierConfig) -> Self {
        Self {
            vocabulary: IndustryVocabulary::for_flavor(flavor),
            canonicalize: config.canonicalize_industries,
            sentence_fallback: config.sentence_fallback,
            label_patterns: HashMap::new(),
            canonical_names: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn flavor(&self) -> ReportFlavor {
        self.vocabulary.flavor()
    }

    pub fn sentence_fallback(&self) -> bool {
        self.sentence_fallback
    }

    /// Table patterns when the phrasing table knows the category, else
    /// patterns generated from the label and cached for this run.
    pub fn patterns_for(&mut self, index: &str, category: &str) -> Arc<CategoryPatterns> {
        if let Some(patterns) = builtin_patterns(index, category) {
            return patterns;
        }
        let key = normalize_label(category);
        Arc::clone(self.label_patterns.entry(key).or_insert_with(|| {
            tracing::debug!(index, category, "Generating patterns for unlisted category");
            Arc::new(CategoryPatterns::for_label(category))
        }))
    }

    /// Vocabulary spelling of `name`, or `name` itself when unknown or
    /// canonicalization is off.
    pub fn canonical_name(&mut self, name: &str) -> String {
        if !self.canonicalize {
            return name.to_string();
        }
        if let Some(hit) = self.canonical_names.get(name) {
            return hit.clone();
        }
        let canonical = self
            .vocabulary
            .canonicalize(name)
            .map(str::to_string)
            .unwrap_or_else(|| name.to_string());
        self.canonical_names
            .insert(name.to_string(), canonical.clone());
        canonical
    }

    /// Canonicalizes every name, dropping duplicates that collapse together.
    pub fn canonicalize_list(&mut self, names: Vec<String>) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let canonical = self.canonical_name(&name);
            if !out.contains(&canonical) {
                out.push(canonical);
            }
        }
        out
    }

    pub fn record(&mut self, event: DiagnosticEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[DiagnosticEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DiagnosticEvent> {
        std::mem::take(&mut self.events)
    }
}
