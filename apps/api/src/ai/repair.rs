//! JSON repair — best-effort cleanup of near-JSON model output.
//!
//! Upstream responses are rarely pure JSON: the object is usually wrapped in
//! markdown fences or surrounded by prose. Repair strips fences, then slices
//! from the first `{` to the last `}` inclusive. This is a deliberate
//! heuristic, not grammar recovery — it assumes at most one JSON object per
//! response. A string value containing an unmatched brace can still defeat
//! it; that boundary is pinned by a test below.

use crate::ai::error::AiError;

/// Max characters of offending text carried in a parse-error preview.
const PREVIEW_LEN: usize = 500;

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Repairs near-JSON text into its best-effort parseable form.
///
/// After fence stripping, returns the substring from the first `{` to the
/// last `}` inclusive. If no such pair exists the trimmed input is returned
/// unchanged — parsing then fails downstream, which is expected and surfaced
/// as a parse error. Idempotent for text already containing exactly one
/// top-level object.
pub fn repair_json_text(text: &str) -> &str {
    let text = strip_json_fences(text);
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Parses repaired text as JSON, carrying a truncated preview on failure.
pub fn parse_payload(text: &str) -> Result<serde_json::Value, AiError> {
    serde_json::from_str(text).map_err(|e| AiError::MalformedPayload {
        reason: e.to_string(),
        preview: text.chars().take(PREVIEW_LEN).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_repair_extracts_object_from_prose() {
        let input = "Here is your result: {\"score\": 85} — hope that helps!";
        assert_eq!(repair_json_text(input), "{\"score\": 85}");
    }

    #[test]
    fn test_repair_fenced_json_parses_same_as_unfenced() {
        let fenced = "```json\n{\"questions\": [1, 2, 3]}\n```";
        let plain = "{\"questions\": [1, 2, 3]}";
        let from_fenced = parse_payload(repair_json_text(fenced)).unwrap();
        let from_plain = parse_payload(repair_json_text(plain)).unwrap();
        assert_eq!(from_fenced, from_plain);
    }

    #[test]
    fn test_repair_is_idempotent_on_single_object() {
        let cases = [
            "{\"a\": 1}",
            "prose {\"a\": {\"nested\": true}} trailing",
            "```json\n{\"a\": [1, 2]}\n```",
        ];
        for input in cases {
            let once = repair_json_text(input).to_string();
            let twice = repair_json_text(&once).to_string();
            assert_eq!(once, twice, "repair not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_repair_without_braces_returns_trimmed_input() {
        assert_eq!(repair_json_text("  no json here  "), "no json here");
    }

    #[test]
    fn test_repair_handles_nested_braces() {
        let input = "{\"outer\": {\"inner\": {\"deep\": 1}}}";
        assert_eq!(repair_json_text(input), input);
    }

    /// Known boundary of the first/last heuristic: an unmatched `}` inside a
    /// string value extends the slice past the intended object. The result
    /// still fails to parse, so the caller sees a parse error rather than
    /// silently wrong data.
    #[test]
    fn test_repair_mis_extracts_on_unmatched_brace_in_string() {
        let input = "{\"note\": \"uses } a lot\"} and then a stray }";
        let repaired = repair_json_text(input);
        assert!(repaired.ends_with('}'));
        assert!(parse_payload(repaired).is_err());
    }

    #[test]
    fn test_parse_error_preview_is_truncated() {
        let long = format!("not json {}", "x".repeat(2000));
        let err = parse_payload(&long).unwrap_err();
        match err {
            AiError::MalformedPayload { preview, .. } => {
                assert!(preview.chars().count() <= 500);
            }
            other => panic!("expected MalformedPayload, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_payload_accepts_valid_json() {
        let value = parse_payload("{\"ok\": true}").unwrap();
        assert_eq!(value["ok"], serde_json::json!(true));
    }
}
