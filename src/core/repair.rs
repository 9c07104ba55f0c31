//! Lenient parsing for corrupted export payloads. The observed corruption is
//! bounded (truncated tails, dangling fields, stray commas), so a staged,
//! increasingly destructive repair converges without a general
//! error-correcting grammar. Each stage rewrites the text and re-attempts a
//! strict parse; the first stage that parses wins.

use crate::utils::error::{ImportError, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Which stage produced the parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStage {
    /// Input was already valid JSON.
    Strict,
    /// Targeted textual rewrites (truncated values, dangling keys, stray
    /// commas, embedded quotes, missing closers).
    Rewritten,
    /// Damaged lines dropped wholesale, remainder rebalanced.
    LineCleanup,
    /// Widest balanced span pulled out of the wreckage and wrapped.
    SpanExtract,
}

/// A successful lenient parse: the tree, the exact text the strict parser
/// accepted, and the stage that got there.
#[derive(Debug, Clone)]
pub struct Repaired {
    pub value: Value,
    pub text: String,
    pub stage: RepairStage,
}

// A string value cut off mid-stream: `"key": "prefix...` with no terminator.
static TRUNCATED_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#":\s*"[^"]*(?:\.\.\.|…)[^,}\]\n]*"#).unwrap());

// `,"key":` left hanging at end of input.
static DANGLING_KEY_EOF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#",\s*"[^"]*"\s*:\s*$"#).unwrap());

// `,"key":` with no value before the next delimiter.
static DANGLING_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#",\s*"[^"]*"\s*:\s*([,}\]])"#).unwrap());

static TRAILING_COMMA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*([}\]])").unwrap());

pub fn repair(text: &str) -> Result<Repaired> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(Repaired {
            value,
            text: text.to_string(),
            stage: RepairStage::Strict,
        });
    }

    tracing::debug!("strict parse failed, attempting textual rewrites");
    let rewritten = rewrite_pass(text);
    if let Ok(value) = serde_json::from_str::<Value>(&rewritten) {
        return Ok(Repaired {
            value,
            text: rewritten,
            stage: RepairStage::Rewritten,
        });
    }

    tracing::debug!("rewrites insufficient, dropping damaged lines");
    let cleaned = line_cleanup(&rewritten);
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(Repaired {
            value,
            text: cleaned,
            stage: RepairStage::LineCleanup,
        });
    }

    tracing::debug!("line cleanup failed, extracting widest balanced span");
    if let Some(wrapped) = extract_span(text) {
        if let Ok(value) = serde_json::from_str::<Value>(&wrapped) {
            return Ok(Repaired {
                value,
                text: wrapped,
                stage: RepairStage::SpanExtract,
            });
        }
    }

    Err(ImportError::UnrecoverableInput(
        "no repair stage produced parseable JSON".to_string(),
    ))
}

/// Stage 1: targeted rewrites, applied in order. Each is a pure
/// string-to-string pass.
fn rewrite_pass(text: &str) -> String {
    let mut fixed = text.trim().to_string();
    fixed = TRUNCATED_VALUE_RE.replace_all(&fixed, ": null").to_string();
    fixed = DANGLING_KEY_EOF_RE.replace_all(&fixed, "").to_string();
    fixed = DANGLING_KEY_RE.replace_all(&fixed, "$1").to_string();
    fixed = TRAILING_COMMA_RE.replace_all(&fixed, "$1").to_string();
    fixed = escape_embedded_quotes(&fixed);
    balance_closers(&fixed)
}

/// A quote met while inside a string either closes it or is an embedded quote
/// the exporter failed to escape. It closes when the next non-space character
/// is a structural delimiter (or input ends); otherwise we escape it in
/// place.
fn escape_embedded_quotes(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len() + 8);
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in bytes.iter().enumerate() {
        if escape {
            out.push(ch);
            escape = false;
            continue;
        }
        if ch == b'\\' {
            out.push(ch);
            escape = true;
            continue;
        }
        if ch == b'"' {
            if !in_string {
                in_string = true;
                out.push(ch);
            } else if closes_string(bytes, i + 1) {
                in_string = false;
                out.push(ch);
            } else {
                out.extend_from_slice(b"\\\"");
            }
        } else {
            out.push(ch);
        }
    }

    String::from_utf8_lossy(&out).to_string()
}

fn closes_string(bytes: &[u8], mut i: usize) -> bool {
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\r' | b'\n') {
        i += 1;
    }
    i >= bytes.len() || matches!(bytes[i], b',' | b'}' | b']' | b':')
}

/// Appends the closers a truncated document lost. Containers still open at
/// end of input are unwound innermost-first, so interleaved nesting closes in
/// the right order.
fn balance_closers(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut in_string = false;
    let mut escape = false;
    let mut open: Vec<u8> = Vec::new();

    for &ch in bytes {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            b'\\' => escape = true,
            b'"' => in_string = !in_string,
            b'{' | b'[' if !in_string => open.push(ch),
            b'}' if !in_string => {
                if open.last() == Some(&b'{') {
                    open.pop();
                }
            }
            b']' if !in_string => {
                if open.last() == Some(&b'[') {
                    open.pop();
                }
            }
            _ => {}
        }
    }

    let mut out = text.to_string();
    while let Some(opener) = open.pop() {
        out.push(if opener == b'{' { '}' } else { ']' });
    }
    out
}

/// Stage 2: give up on surgical fixes and drop every line that looks
/// damaged, then rebalance what is left.
fn line_cleanup(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !(trimmed.contains("...")
                || trimmed.contains('\u{2026}')
                || trimmed.ends_with(':')
                || trimmed == ","
                || trimmed == "\""
                || has_open_string(trimmed))
        })
        .collect();

    let joined = kept.join("\n");
    let stripped = strip_trailing_commas(&joined);
    balance_closers(&stripped)
}

fn has_open_string(line: &str) -> bool {
    let mut in_string = false;
    let mut escape = false;
    for &ch in line.as_bytes() {
        if escape {
            escape = false;
            continue;
        }
        if ch == b'\\' {
            escape = true;
            continue;
        }
        if ch == b'"' {
            in_string = !in_string;
        }
    }
    in_string
}

/// String-aware trailing comma removal (the stage-1 regex variant is blind to
/// string contents; after line drops we cannot afford that).
fn strip_trailing_commas(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut in_string = false;
    let mut escape = false;
    let mut i = 0usize;

    while i < bytes.len() {
        let ch = bytes[i];
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == b'\\' {
                escape = true;
            } else if ch == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if ch == b'"' {
            in_string = true;
            out.push(ch);
            i += 1;
            continue;
        }

        if ch == b',' {
            let mut j = i + 1;
            while j < bytes.len() && matches!(bytes[j], b' ' | b'\t' | b'\r' | b'\n') {
                j += 1;
            }
            if j >= bytes.len() || bytes[j] == b'}' || bytes[j] == b']' {
                i += 1;
                continue;
            }
        }

        out.push(ch);
        i += 1;
    }

    String::from_utf8_lossy(&out).to_string()
}

/// Stage 3: last resort. Pull the widest flat `[...]` span (no nested
/// brackets) out of the original text, or failing that the widest flat
/// `{...}` span, and wrap it as a document.
fn extract_span(text: &str) -> Option<String> {
    if let Some(span) = widest_flat_span(text, b'[', b']') {
        return Some(format!("{{\"data\": {}}}", span));
    }
    if let Some(span) = widest_flat_span(text, b'{', b'}') {
        return Some(format!("{{\"data\": [{}]}}", span));
    }
    None
}

fn widest_flat_span(text: &str, open: u8, close: u8) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut best: Option<(usize, usize)> = None;
    let mut start: Option<usize> = None;

    for (i, &ch) in bytes.iter().enumerate() {
        if ch == open {
            // re-anchoring on every opener keeps the span flat
            start = Some(i);
        } else if ch == close {
            if let Some(s) = start.take() {
                let end = i + 1;
                if best.map_or(true, |(bs, be)| end - s > be - bs) {
                    best = Some((s, end));
                }
            }
        }
    }

    best.map(|(s, e)| &text[s..e])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_json_passes_untouched() {
        let input = r#"{"creators": [{"aioCreatorID": "c1"}]}"#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired.stage, RepairStage::Strict);
        assert_eq!(repaired.text, input);
    }

    #[test]
    fn test_truncated_string_value_becomes_null() {
        let input = r#"{"a": 1, "bio": "cut off mid sent..."#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired.stage, RepairStage::Rewritten);
        assert_eq!(repaired.value, json!({"a": 1, "bio": null}));
    }

    #[test]
    fn test_dangling_key_at_end_removed() {
        let input = r#"{"a": 1, "b":"#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired.stage, RepairStage::Rewritten);
        assert_eq!(repaired.value, json!({"a": 1}));
    }

    #[test]
    fn test_dangling_key_before_closer_removed() {
        let input = r#"{"a": 1, "b":}"#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired.value, json!({"a": 1}));
    }

    #[test]
    fn test_trailing_comma_removed() {
        let input = r#"{"a": [1, 2,],}"#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired.stage, RepairStage::Rewritten);
        assert_eq!(repaired.value, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_embedded_quote_escaped() {
        let input = r#"{"bio": "say "hi" ok"}"#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired.value, json!({"bio": "say \"hi\" ok"}));
    }

    #[test]
    fn test_interleaved_closers_unwound_in_order() {
        let input = r#"{"creators": [{"aioCreatorID": "c1""#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired.stage, RepairStage::Rewritten);
        assert_eq!(repaired.value, json!({"creators": [{"aioCreatorID": "c1"}]}));
    }

    #[test]
    fn test_line_cleanup_drops_damaged_lines() {
        // the colon-terminated line defeats stage 1 (no leading comma), so
        // the line pass has to take over
        let input = "{\n\"a\": 1,\n\"broken\":\n\"b\": 2\n}";
        let repaired = repair(input).unwrap();
        assert_eq!(repaired.stage, RepairStage::LineCleanup);
        assert_eq!(repaired.value, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_span_extract_recovers_array() {
        let input = r#"garbage before [1, 2, 3] garbage "unclosed after"#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired.stage, RepairStage::SpanExtract);
        assert_eq!(repaired.value, json!({"data": [1, 2, 3]}));
    }

    #[test]
    fn test_span_extract_wraps_bare_object_in_array() {
        let input = r#"x{y{"aioCreatorID": "c1"}z"#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired.stage, RepairStage::SpanExtract);
        assert_eq!(repaired.value, json!({"data": [{"aioCreatorID": "c1"}]}));
    }

    #[test]
    fn test_unrecoverable_input_errors() {
        let err = repair("not even close").unwrap_err();
        assert!(matches!(err, ImportError::UnrecoverableInput(_)));
    }

    #[test]
    fn test_repair_is_idempotent_on_repaired_text() {
        let input = r#"{"a": 1, "bio": "trunc..."#;
        let first = repair(input).unwrap();
        let second = repair(&first.text).unwrap();
        assert_eq!(second.stage, RepairStage::Strict);
        assert_eq!(first.value, second.value);
    }
}
