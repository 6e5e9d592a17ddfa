//! Record list extraction from free-text engine replies.
//!
//! The engine is asked for a JSON array but wraps it in prose, markdown
//! fences, or citation markers often enough that the array has to be
//! located first. Location is a string-aware bracket scan starting at the
//! first `[` followed by `{`, so brackets inside string values and trailing
//! prose with its own brackets do not confuse it.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::rules::canonical_linkedin_url;
use crate::error::{ExtractionFailure, Result};
use crate::traits::engine::EngineResponse;
use crate::types::record::{clamp_confidence, DiscoveryRecord};

static ARRAY_OPENER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\s*\{").unwrap());

/// Find the balanced array literal starting at byte `start` (a `[`).
///
/// Returns `None` when the text ends before the array closes.
fn balanced_array(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Locate and parse the first array of objects in `text`.
///
/// Only the first candidate is considered. A malformed first array is an
/// error even when a later one would parse, since later openers may sit
/// inside it.
fn locate_array(text: &str) -> std::result::Result<Vec<Value>, ExtractionFailure> {
    let opener = ARRAY_OPENER
        .find(text)
        .ok_or(ExtractionFailure::NoArrayFound)?;

    let literal = balanced_array(text, opener.start()).ok_or_else(|| ExtractionFailure::InvalidJson {
        detail: "array is never closed".to_string(),
    })?;

    serde_json::from_str::<Vec<Value>>(literal).map_err(|e| ExtractionFailure::InvalidJson {
        detail: e.to_string(),
    })
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn confidence_field(obj: &Map<String, Value>) -> f64 {
    let raw = match obj.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.map(clamp_confidence).unwrap_or(0.0)
}

fn linkedin_field(obj: &Map<String, Value>) -> Option<String> {
    ["linkedinUrl", "linkedin_url"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .and_then(canonical_linkedin_url)
}

/// Convert one array element, or `None` if it cannot be a record.
fn to_record(index: usize, element: Value) -> Option<DiscoveryRecord> {
    let Value::Object(obj) = element else {
        warn!(index, "Dropping non-object element from engine reply");
        return None;
    };

    let name = text_field(&obj, "name");
    if name.is_empty() {
        warn!(index, "Dropping element without a name from engine reply");
        return None;
    }

    Some(DiscoveryRecord {
        name,
        role: text_field(&obj, "role"),
        company: text_field(&obj, "company"),
        location: text_field(&obj, "location"),
        description: text_field(&obj, "description"),
        linkedin_url: linkedin_field(&obj),
        confidence: confidence_field(&obj),
    })
}

/// Extract discovery records from an engine reply.
///
/// Elements without a usable name are dropped; the rest keep the order the
/// engine gave them. A located array with no usable elements is an empty
/// list, not an error.
///
/// # Errors
///
/// - `Extraction { NoArrayFound }` when the text has no `[ {` opener
/// - `Extraction { InvalidJson }` when the located array does not parse
pub fn extract_list(response: &EngineResponse) -> Result<Vec<DiscoveryRecord>> {
    let elements = locate_array(&response.content)?;
    let total = elements.len();

    let records: Vec<DiscoveryRecord> = elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| to_record(index, element))
        .collect();

    debug!(
        elements = total,
        records = records.len(),
        dropped = total - records.len(),
        "Extracted discovery records"
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;
    use proptest::prelude::*;

    fn reply(text: &str) -> EngineResponse {
        EngineResponse::new(text)
    }

    fn reason(err: DiscoveryError) -> &'static str {
        err.reason().unwrap_or("none")
    }

    #[test]
    fn test_array_wrapped_in_prose_and_fences() {
        let text = r#"Here are some founders I found [1]:

```json
[
  {"name": "Jane Citizen", "role": "CEO", "company": "PayRight", "location": "Adelaide, SA",
   "description": "Building payments [beta] rails", "linkedinUrl": "https://au.linkedin.com/in/janec/", "confidence": 0.9},
  {"name": "Sam Lee", "role": "CTO", "company": "Ledgerly", "location": "Adelaide",
   "description": "Open banking", "confidence": 0.7}
]
```

Let me know if you need more [2]."#;

        let records = extract_list(&reply(text)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Jane Citizen");
        assert_eq!(records[0].description, "Building payments [beta] rails");
        assert_eq!(
            records[0].linkedin_url.as_deref(),
            Some("https://www.linkedin.com/in/janec")
        );
        assert_eq!(records[1].name, "Sam Lee");
        assert_eq!(records[1].linkedin_url, None);
    }

    #[test]
    fn test_no_array_found() {
        let err = extract_list(&reply("I couldn't find any founders matching that.")).unwrap_err();
        assert_eq!(reason(err), "no-array-found");
    }

    #[test]
    fn test_array_of_scalars_is_not_an_opener() {
        let err = extract_list(&reply("Sources: [1] [2] [3]")).unwrap_err();
        assert_eq!(reason(err), "no-array-found");
    }

    #[test]
    fn test_invalid_json() {
        let err = extract_list(&reply(r#"[{"name": "Jane", }]"#)).unwrap_err();
        assert_eq!(reason(err), "invalid-json");
    }

    #[test]
    fn test_truncated_array_is_invalid_json() {
        let err = extract_list(&reply(r#"[{"name": "Jane"}, {"name": "Sam""#)).unwrap_err();
        assert_eq!(reason(err), "invalid-json");
    }

    #[test]
    fn test_nested_array_in_malformed_reply_is_not_used() {
        let text = r#"[{"name": "Jane Citizen", "previous": [{"name": "OldCo Pty Ltd"}],}]"#;
        let err = extract_list(&reply(text)).unwrap_err();
        assert_eq!(reason(err), "invalid-json");
    }

    #[test]
    fn test_first_invalid_array_wins_over_later_valid_one() {
        let text = r#"[{"name": "A",}] and also [{"name": "B"}]"#;
        let err = extract_list(&reply(text)).unwrap_err();
        assert_eq!(reason(err), "invalid-json");
    }

    #[test]
    fn test_nested_arrays_stay_inside_their_record() {
        let text = r#"[{"name": "Jane Citizen", "previous": [{"name": "OldCo Pty Ltd"}]}]"#;
        let records = extract_list(&reply(text)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Jane Citizen");
    }

    #[test]
    fn test_elements_without_name_are_dropped() {
        let records = extract_list(&reply(r#"[{"name": "A"}, {"role": "x"}]"#)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "A");
        assert_eq!(records[0].confidence, 0.0);
        assert_eq!(records[0].role, "");
    }

    #[test]
    fn test_blank_and_non_object_elements_are_dropped() {
        let text = r#"[{"name": "  "}, "Jane", 3, {"name": 7}, {"name": " Sam Lee "}]"#;
        let records = extract_list(&reply(text)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Sam Lee");
    }

    #[test]
    fn test_all_elements_unusable_is_empty_list() {
        let records = extract_list(&reply(r#"[{"role": "CEO"}]"#)).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_confidence_variants() {
        let text = r#"[
            {"name": "A", "confidence": 1.7},
            {"name": "B", "confidence": -0.2},
            {"name": "C", "confidence": "0.8"},
            {"name": "D", "confidence": "high"},
            {"name": "E", "confidence": null}
        ]"#;
        let confidences: Vec<f64> = extract_list(&reply(text))
            .unwrap()
            .iter()
            .map(|r| r.confidence)
            .collect();
        assert_eq!(confidences, vec![1.0, 0.0, 0.8, 0.0, 0.0]);
    }

    #[test]
    fn test_non_profile_linkedin_is_dropped() {
        let text = r#"[{"name": "A", "linkedinUrl": "https://www.linkedin.com/company/acme"},
                       {"name": "B", "linkedin_url": "linkedin.com/in/bee"}]"#;
        let records = extract_list(&reply(text)).unwrap();
        assert_eq!(records[0].linkedin_url, None);
        assert_eq!(
            records[1].linkedin_url.as_deref(),
            Some("https://www.linkedin.com/in/bee")
        );
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let text = r#"[{"name": "Jane \"JC\" Citizen", "description": "ends with ]\\"}] trailing ]"#;
        let records = extract_list(&reply(text)).unwrap();
        assert_eq!(records[0].name, r#"Jane "JC" Citizen"#);
        assert_eq!(records[0].description, r"ends with ]\");
    }

    proptest! {
        #[test]
        fn prop_confidence_always_in_range(c in prop::num::f64::ANY) {
            let text = if c.is_finite() {
                format!(r#"[{{"name": "A", "confidence": {}}}]"#, c)
            } else {
                r#"[{"name": "A", "confidence": "NaN"}]"#.to_string()
            };
            let records = extract_list(&reply(&text)).unwrap();
            prop_assert!((0.0..=1.0).contains(&records[0].confidence));
        }

        #[test]
        fn prop_order_is_preserved(names in prop::collection::vec("[A-Z][a-z]{1,8} [A-Z][a-z]{1,8}", 1..8)) {
            let elements: Vec<Value> = names
                .iter()
                .map(|n| serde_json::json!({ "name": n, "role": "Founder" }))
                .collect();
            let text = format!("Results:\n{}\nDone.", Value::Array(elements));

            let records = extract_list(&reply(&text)).unwrap();
            let got: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
            let want: Vec<&str> = names.iter().map(String::as_str).collect();
            prop_assert_eq!(got, want);
        }

        #[test]
        fn prop_text_without_brackets_has_no_array(text in "[^\\[]*") {
            let err = extract_list(&reply(&text)).unwrap_err();
            prop_assert_eq!(err.reason(), Some("no-array-found"));
        }
    }
}
