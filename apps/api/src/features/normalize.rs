//! Shared normalization rules applied to parsed-but-untrusted model output.
//!
//! Every feature normalizer enforces the same contract: required array
//! fields become non-empty arrays, text fields become non-empty strings, and
//! numeric scores leave here as integers clamped into [0, 100]. Semantic
//! correctness of the model's answer is not checked — only structure.

use serde_json::Value;

/// Rounds a raw numeric score and clamps it into [0, 100].
pub fn clamp_score(raw: f64) -> u32 {
    raw.round().clamp(0.0, 100.0) as u32
}

/// Numeric view of an optional JSON field. Rejects NaN so a literal
/// `"NaN"`-shaped payload cannot leak through the clamp.
pub fn as_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| !n.is_nan())
}

/// Non-empty string or the documented default.
pub fn string_or(value: Option<&Value>, default: &str) -> String {
    match value.and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

/// Required array field: missing, non-array, or empty input is replaced by a
/// single-element array carrying the documented default message.
pub fn string_list_or(value: Option<&Value>, default: &str) -> Vec<String> {
    let items: Vec<String> = value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if items.is_empty() {
        vec![default.to_string()]
    } else {
        items
    }
}

/// Optional array field: absence yields an empty list, not a default entry.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_score_bounds_and_rounds() {
        assert_eq!(clamp_score(-5.0), 0);
        assert_eq!(clamp_score(0.4), 0);
        assert_eq!(clamp_score(72.6), 73);
        assert_eq!(clamp_score(100.0), 100);
        assert_eq!(clamp_score(150.0), 100);
    }

    #[test]
    fn test_as_number_accepts_ints_and_floats() {
        assert_eq!(as_number(Some(&json!(42))), Some(42.0));
        assert_eq!(as_number(Some(&json!(42.5))), Some(42.5));
    }

    #[test]
    fn test_as_number_rejects_non_numbers() {
        assert_eq!(as_number(Some(&json!("85"))), None);
        assert_eq!(as_number(Some(&json!(null))), None);
        assert_eq!(as_number(Some(&json!([1]))), None);
        assert_eq!(as_number(None), None);
    }

    #[test]
    fn test_string_or_falls_back_on_missing_or_blank() {
        assert_eq!(string_or(Some(&json!("fine")), "d"), "fine");
        assert_eq!(string_or(Some(&json!("   ")), "d"), "d");
        assert_eq!(string_or(Some(&json!(7)), "d"), "d");
        assert_eq!(string_or(None, "d"), "d");
    }

    #[test]
    fn test_string_list_or_never_returns_empty() {
        for input in [Some(json!([])), Some(json!(null)), Some(json!("nope")), None] {
            let out = string_list_or(input.as_ref(), "default entry");
            assert_eq!(out, vec!["default entry".to_string()]);
        }
    }

    #[test]
    fn test_string_list_or_keeps_valid_entries_and_drops_junk() {
        let input = json!(["keep", 3, null, "  ", "also keep"]);
        let out = string_list_or(Some(&input), "default");
        assert_eq!(out, vec!["keep".to_string(), "also keep".to_string()]);
    }

    #[test]
    fn test_string_list_allows_empty() {
        assert!(string_list(Some(&json!([]))).is_empty());
        assert!(string_list(None).is_empty());
    }
}
