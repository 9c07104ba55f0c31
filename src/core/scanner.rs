//! Locates the creator record array inside a document of unknown shape.
//! Well-formed exports put it under a known top-level key; everything else
//! goes through a bounded recursive walk that scores every array it finds.

use crate::config::ParserConfig;
use crate::utils::error::{ImportError, Result};
use serde_json::Value;

/// Which route located the record array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPath {
    /// Found under the configured primary key.
    Primary,
    /// Found by the recursive walk, at the given dotted path.
    Discovered { path: String },
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Qualifying elements of the winning array, in document order.
    pub records: Vec<Value>,
    pub path: ScanPath,
}

/// An array met during the walk, with its qualifying elements. Lives only
/// for the duration of one scan.
struct CandidateArray {
    path: String,
    qualifying: Vec<Value>,
    total: usize,
}

// Image metadata rides along in some exports; these two fields together mark
// an element as an image, not a creator.
const IMAGE_FORMAT_FIELD: &str = "format";
const IMAGE_URL_FIELD: &str = "imageUrl";

pub fn find_record_array(root: &Value, config: &ParserConfig) -> Result<ScanOutcome> {
    if !matches!(root, Value::Object(_) | Value::Array(_)) {
        return Err(ImportError::InvalidInput(
            "document root is not an object or array".to_string(),
        ));
    }

    if let Some(items) = root.get(&config.primary_key).and_then(Value::as_array) {
        let qualifying: Vec<Value> = items
            .iter()
            .filter(|item| qualifies(item, config))
            .cloned()
            .collect();
        if !qualifying.is_empty() {
            tracing::debug!(
                count = qualifying.len(),
                total = items.len(),
                "record array found under primary key"
            );
            return Ok(ScanOutcome {
                records: qualifying,
                path: ScanPath::Primary,
            });
        }
    }

    tracing::debug!("no primary record array, walking document structure");
    let mut candidates = Vec::new();
    collect_arrays(root, String::new(), 0, config, &mut candidates);

    for candidate in &candidates {
        tracing::debug!(
            path = %candidate.path,
            qualifying = candidate.qualifying.len(),
            total = candidate.total,
            "candidate array"
        );
    }

    // strict greater-than keeps the first-encountered candidate on ties
    let best = candidates
        .into_iter()
        .reduce(|best, current| {
            if current.qualifying.len() > best.qualifying.len() {
                current
            } else {
                best
            }
        });

    match best {
        Some(candidate) => {
            tracing::info!(
                path = %candidate.path,
                count = candidate.qualifying.len(),
                "best candidate array selected"
            );
            Ok(ScanOutcome {
                records: candidate.qualifying,
                path: ScanPath::Discovered {
                    path: candidate.path,
                },
            })
        }
        None => Err(ImportError::NoRecordsFound),
    }
}

/// Depth-first, insertion-order walk. Arrays are terminal candidates (their
/// elements are records, not containers to descend into); only objects are
/// descended, up to the configured depth.
fn collect_arrays(
    node: &Value,
    path: String,
    depth: usize,
    config: &ParserConfig,
    out: &mut Vec<CandidateArray>,
) {
    if depth > config.max_scan_depth {
        return;
    }

    match node {
        Value::Array(items) => {
            let qualifying: Vec<Value> = items
                .iter()
                .filter(|item| qualifies(item, config))
                .cloned()
                .collect();
            if !qualifying.is_empty() {
                out.push(CandidateArray {
                    path,
                    qualifying,
                    total: items.len(),
                });
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                collect_arrays(value, child_path, depth + 1, config, out);
            }
        }
        _ => {}
    }
}

/// Loose membership test: an element counts as a creator record when any
/// recognized field shows up directly, under the platform-info sub-object,
/// or under the overall-performance statistics. Export shapes vary too much
/// for anything stricter.
pub fn qualifies(element: &Value, config: &ParserConfig) -> bool {
    let Value::Object(map) = element else {
        return false;
    };

    if map.contains_key(IMAGE_FORMAT_FIELD) && map.contains_key(IMAGE_URL_FIELD) {
        return false;
    }

    let info = map.get(&config.info_key);
    let performance = map
        .get(&config.stats_key)
        .and_then(|stats| stats.get(&config.performance_key));

    config.recognized_fields.iter().any(|field| {
        map.contains_key(field.as_str())
            || info.map_or(false, |i| i.get(field).is_some())
            || performance.map_or(false, |p| p.get(field).is_some())
    })
}
