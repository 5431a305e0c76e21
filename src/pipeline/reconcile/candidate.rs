//! Ingestion boundary for model-produced candidates.
//!
//! Every shape check on the external payload happens here. Anything that
//! leaves this module is a well-formed `CanonicalIndustryList` plus
//! metadata; wrong container types become empty lists and are reported as
//! `MalformedSource` events.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::industry_list::{CanonicalIndustryList, CategoryMap};
use crate::models::report::ReportMetadata;
use crate::pipeline::diagnostic::DiagnosticEvent;
use crate::pipeline::extraction::{normalize_industry_list, parse_period_label, ExtractionContext};
use crate::schema::CanonicalSchema;

/// Keys that may wrap the index → category map.
const INDUSTRY_KEYS: &[&str] = &["industry_data", "industries", "classification"];
const PERIOD_KEYS: &[&str] = &["period_label", "month_year", "report_month"];
const SUMMARY_KEYS: &[&str] = &["summary_table", "pmi_data"];
const NARRATIVE_KEYS: &[&str] = &["narrative", "summary"];

/// A model-produced candidate after validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelCandidate {
    pub metadata: ReportMetadata,
    pub industries: CanonicalIndustryList,
}

/// Parse a raw model response, tolerating a fenced ```json block around it.
///
/// Unparseable text yields an empty candidate and one `MalformedSource`
/// event; it never fails.
pub fn parse_model_candidate(
    response: &str,
    schema: &CanonicalSchema,
    ctx: &mut ExtractionContext,
) -> ModelCandidate {
    match serde_json::from_str::<Value>(extract_json_block(response)) {
        Ok(value) => coerce_model_candidate(&value, schema, ctx),
        Err(e) => {
            malformed(ctx, "$", format!("not JSON: {e}"));
            ModelCandidate::default()
        }
    }
}

/// The body of the first fenced code block, or the whole trimmed text.
fn extract_json_block(response: &str) -> &str {
    let Some(fence) = response.find("```") else {
        return response.trim();
    };
    let body_start = response[fence + 3..]
        .find('\n')
        .map(|nl| fence + 3 + nl + 1)
        .unwrap_or(fence + 3);
    match response[body_start..].find("```") {
        Some(end) => response[body_start..body_start + end].trim(),
        None => response[body_start..].trim(),
    }
}

/// Coerce an already-decoded payload into a candidate.
pub fn coerce_model_candidate(
    value: &Value,
    schema: &CanonicalSchema,
    ctx: &mut ExtractionContext,
) -> ModelCandidate {
    let root = match value {
        Value::Object(root) => root,
        // a JSON string holding the payload
        Value::String(s) => return parse_model_candidate(s, schema, ctx),
        other => {
            malformed(ctx, "$", format!("expected object, got {}", type_name(other)));
            return ModelCandidate::default();
        }
    };

    let metadata = coerce_metadata(root);

    let (container, path) = match INDUSTRY_KEYS.iter().find_map(|k| root.get(*k).map(|v| (v, *k))) {
        Some((Value::Object(map), key)) => (Some(map), key.to_string()),
        Some((Value::Null, _)) => (None, String::new()),
        Some((other, key)) => {
            malformed(ctx, key, format!("expected object, got {}", type_name(other)));
            (None, String::new())
        }
        // no wrapper: the root itself is the index map
        None => (Some(root), String::new()),
    };

    let mut industries = CanonicalIndustryList::new();
    if let Some(container) = container {
        for (index_key, categories) in container {
            if is_metadata_key(index_key) {
                continue;
            }
            let index_path = join_path(&path, index_key);
            coerce_index(index_key, categories, &index_path, schema, ctx, &mut industries);
        }
    }
    industries.ensure_canonical_categories(schema);

    ModelCandidate {
        metadata,
        industries,
    }
}

fn coerce_index(
    index_key: &str,
    categories: &Value,
    path: &str,
    schema: &CanonicalSchema,
    ctx: &mut ExtractionContext,
    out: &mut CanonicalIndustryList,
) {
    let spec = schema.index(index_key);
    let index_name = match spec {
        Some(spec) => spec.name.clone(),
        // stray scalar fields ("confidence", "notes") are not indices
        None if !categories.is_object() => {
            if !categories.is_null() {
                malformed(
                    ctx,
                    path,
                    format!("unknown key with {} value skipped", type_name(categories)),
                );
            }
            return;
        }
        None => {
            ctx.record(DiagnosticEvent::SchemaGap {
                index: index_key.to_string(),
            });
            index_key.trim().to_string()
        }
    };

    let mut map = CategoryMap::new();
    match categories {
        Value::Object(cats) => {
            for (category_key, leaf) in cats {
                let label = spec
                    .and_then(|s| s.categories.canonical_label(category_key))
                    .map(str::to_string)
                    .unwrap_or_else(|| category_key.trim().to_string());
                let names = coerce_leaf(leaf, &join_path(path, category_key), ctx);
                let names = ctx.canonicalize_list(names);
                map.entry(label).or_default().extend(names);
            }
        }
        Value::Null => {}
        other => malformed(ctx, path, format!("expected object, got {}", type_name(other))),
    }

    // merged keys may now hold repeats
    for list in map.values_mut() {
        let mut seen = Vec::with_capacity(list.len());
        list.retain(|name| {
            let fresh = !seen.contains(name);
            if fresh {
                seen.push(name.clone());
            }
            fresh
        });
    }

    let target = out.entry(&index_name);
    for (label, names) in map {
        let list = target.entry(label).or_default();
        for name in names {
            if !list.contains(&name) {
                list.push(name);
            }
        }
    }
}

/// A category leaf: array of strings, a delimited string, or null.
fn coerce_leaf(leaf: &Value, path: &str, ctx: &mut ExtractionContext) -> Vec<String> {
    match leaf {
        Value::Array(items) => {
            let names: Vec<String> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            let dropped = items.iter().filter(|v| !v.is_string()).count();
            if dropped > 0 {
                malformed(ctx, path, format!("dropped {dropped} non-string item(s)"));
            }
            names
        }
        Value::String(s) => normalize_industry_list(s),
        Value::Null => Vec::new(),
        other => {
            malformed(ctx, path, format!("expected array, got {}", type_name(other)));
            Vec::new()
        }
    }
}

fn coerce_metadata(root: &Map<String, Value>) -> ReportMetadata {
    let period_label = first_string(root, PERIOD_KEYS);
    let period = period_label.as_deref().and_then(parse_period_label);
    let summary_table = SUMMARY_KEYS
        .iter()
        .find_map(|k| root.get(*k))
        .filter(|v| !v.is_null())
        .cloned();
    ReportMetadata {
        period_label,
        period,
        summary_table,
        narrative: first_string(root, NARRATIVE_KEYS),
    }
}

fn first_string(root: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| root.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_metadata_key(key: &str) -> bool {
    [PERIOD_KEYS, SUMMARY_KEYS, NARRATIVE_KEYS, INDUSTRY_KEYS]
        .iter()
        .any(|keys| keys.contains(&key))
        || key == "flavor"
}

fn malformed(ctx: &mut ExtractionContext, path: &str, detail: String) {
    tracing::warn!(path, detail = %detail, "Malformed model candidate coerced");
    ctx.record(DiagnosticEvent::MalformedSource {
        path: path.to_string(),
        detail,
    });
}

fn join_path(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
