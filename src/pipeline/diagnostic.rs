//! Pipeline diagnostics: data-quality events and the on-disk artifact dump.
//!
//! Events are collected per report and returned with the result; they never
//! affect classification.
//!
//! **Dump activation**: `ClassifierConfig::dump_dir`, overridden by the
//! `SECTORSCAN_DUMP_DIR` env var. Disabled when neither is set.
//!
//! **Output structure**:
//! ```text
//! {dump_dir}/{report_id}/
//!   00-input.json
//!   01-pattern-extraction.json
//!   02-model-candidate.json
//!   03-reconciled.json
//!   04-validation.json
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

// ──────────────────────────────────────────────
// Events
// ──────────────────────────────────────────────

/// Recovered data-quality problems, in the order they were hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    /// No template matched; the category is empty.
    PatternMiss { index: String, category: String },
    /// A model candidate leaf had the wrong shape and was coerced.
    MalformedSource { path: String, detail: String },
    /// An index outside the canonical schema, carried through unscored.
    SchemaGap { index: String },
    /// An industry found in both categories, kept in the primary one.
    DedupConflict {
        index: String,
        industry: String,
        kept: String,
        removed_from: String,
    },
    /// Every index failed validation; this one was passed anyway.
    ForcedPass { index: String },
}

impl DiagnosticEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PatternMiss { .. } => "pattern_miss",
            Self::MalformedSource { .. } => "malformed_source",
            Self::SchemaGap { .. } => "schema_gap",
            Self::DedupConflict { .. } => "dedup_conflict",
            Self::ForcedPass { .. } => "forced_pass",
        }
    }
}

// ──────────────────────────────────────────────
// Dump directory resolution
// ──────────────────────────────────────────────

/// Resolve the base dump directory.
///
/// Priority:
/// 1. `SECTORSCAN_DUMP_DIR` env var
/// 2. the configured directory
/// 3. `None` (disabled)
fn resolve_base_dir(configured: Option<&Path>) -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(config::DUMP_ENV_VAR) {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    configured.map(Path::to_path_buf)
}

/// Returns the dump directory for a report, or `None` if dumping is disabled.
///
/// Creates the directory tree on first call. Returns `None` (with a warning)
/// if directory creation fails. Never panics, never blocks the pipeline.
pub fn dump_dir_for(configured: Option<&Path>, report_id: &Uuid) -> Option<PathBuf> {
    let base = resolve_base_dir(configured)?;
    let dir = base.join(report_id.to_string());

    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(
            path = %dir.display(),
            error = %e,
            "Diagnostic dump: failed to create directory"
        );
        return None;
    }

    Some(dir)
}

// ──────────────────────────────────────────────
// Dump writers
// ──────────────────────────────────────────────

/// Write a JSON artifact (any serde-serializable value).
///
/// Uses pretty-printing for human readability. Never panics.
pub fn dump_json<T: Serialize>(dir: &Path, filename: &str, value: &T) {
    let path = dir.join(filename);
    match serde_json::to_string_pretty(value) {
        Ok(json) => match std::fs::write(&path, json.as_bytes()) {
            Ok(()) => tracing::debug!(
                path = %path.display(),
                size = json.len(),
                "Diagnostic dump: JSON written"
            ),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Diagnostic dump: failed to write JSON"
            ),
        },
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Diagnostic dump: failed to serialize JSON"
        ),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
