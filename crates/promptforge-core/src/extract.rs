//! JSON recovery from free-form model output.
//!
//! Models are inconsistent about markdown fencing, so extraction tries an
//! ordered chain of strategies and stops at the first candidate that parses:
//!
//! 1. a fenced block tagged `json`;
//! 2. a fenced block with no tag;
//! 3. the first brace-delimited substring that is itself a JSON object.
//!
//! Every candidate must pass a real `serde_json` parse before it is returned;
//! a fenced block that only looks like JSON falls through to the next
//! strategy.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use promptforge_contracts::error::{ForgeError, ForgeResult};

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```json\s*(\{[\s\S]*?\})\s*```").expect("json fence pattern is valid")
});

static BARE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```\s*(\{[\s\S]*?\})\s*```").expect("bare fence pattern is valid")
});

/// Which strategy produced the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// ```` ```json { … } ``` ````
    JsonFence,
    /// ```` ``` { … } ``` ````
    BareFence,
    /// Shortest parseable object starting at the earliest possible `{`.
    BraceScan,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::JsonFence => "json-fence",
            ExtractionStrategy::BareFence => "bare-fence",
            ExtractionStrategy::BraceScan => "brace-scan",
        }
    }
}

/// A recovered JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub strategy: ExtractionStrategy,
    /// The exact substring of the model output.
    pub json: String,
    /// `json` parsed.
    pub value: Value,
}

/// Recover a JSON object from raw model text.
///
/// Returns `ForgeError::Extraction` when no strategy yields a parseable
/// object.
pub fn extract_json(raw: &str) -> ForgeResult<Extracted> {
    let found = fenced(raw, &JSON_FENCE, ExtractionStrategy::JsonFence)
        .or_else(|| fenced(raw, &BARE_FENCE, ExtractionStrategy::BareFence))
        .or_else(|| brace_scan(raw));

    match found {
        Some(extracted) => {
            debug!(
                strategy = extracted.strategy.as_str(),
                bytes = extracted.json.len(),
                "extracted JSON candidate"
            );
            Ok(extracted)
        }
        None => Err(ForgeError::Extraction {
            reason: format!("no parseable JSON object in {} bytes of output", raw.len()),
        }),
    }
}

fn fenced(raw: &str, pattern: &Regex, strategy: ExtractionStrategy) -> Option<Extracted> {
    pattern.captures_iter(raw).find_map(|caps| {
        let body = caps.get(1)?.as_str();
        match serde_json::from_str::<Value>(body) {
            Ok(value) if value.is_object() => Some(Extracted {
                strategy,
                json: body.to_string(),
                value,
            }),
            _ => {
                debug!(strategy = strategy.as_str(), "fenced block failed to parse");
                None
            }
        }
    })
}

/// For each `{` in order, parse the first JSON value starting there. The
/// parser stops at the end of that value, which is the shortest
/// brace-delimited substring that is valid JSON.
fn brace_scan(raw: &str) -> Option<Extracted> {
    raw.match_indices('{').find_map(|(start, _)| {
        let tail = &raw[start..];
        let mut stream = serde_json::Deserializer::from_str(tail).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) if value.is_object() => {
                let end = start + stream.byte_offset();
                Some(Extracted {
                    strategy: ExtractionStrategy::BraceScan,
                    json: raw[start..end].to_string(),
                    value,
                })
            }
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_fence_returns_exactly_the_object_text() {
        let raw = "Here you go:\n```json\n{\"name\": \"Ada\", \"tags\": {\"a\": 1}}\n```\nEnjoy!";
        let extracted = extract_json(raw).unwrap();

        assert_eq!(extracted.strategy, ExtractionStrategy::JsonFence);
        assert_eq!(extracted.json, "{\"name\": \"Ada\", \"tags\": {\"a\": 1}}");
        assert_eq!(extracted.value, json!({ "name": "Ada", "tags": { "a": 1 } }));
    }

    #[test]
    fn json_fence_wins_over_earlier_bare_fence() {
        let raw = "```\n{\"which\": \"bare\"}\n```\n```json\n{\"which\": \"tagged\"}\n```";
        let extracted = extract_json(raw).unwrap();

        assert_eq!(extracted.strategy, ExtractionStrategy::JsonFence);
        assert_eq!(extracted.value["which"], "tagged");
    }

    #[test]
    fn bare_fence_is_used_when_no_tagged_block() {
        let raw = "Result:\n```\n{\"ok\": true}\n```";
        let extracted = extract_json(raw).unwrap();

        assert_eq!(extracted.strategy, ExtractionStrategy::BareFence);
        assert_eq!(extracted.json, "{\"ok\": true}");
    }

    #[test]
    fn unparseable_fence_falls_through_to_brace_scan() {
        // The fenced block is not JSON, but a later bare object is.
        let raw = "```json\n{name: Ada}\n```\nActually: {\"name\": \"Ada\"}";
        let extracted = extract_json(raw).unwrap();

        assert_eq!(extracted.strategy, ExtractionStrategy::BraceScan);
        assert_eq!(extracted.json, "{\"name\": \"Ada\"}");
    }

    #[test]
    fn brace_scan_finds_unfenced_nested_object() {
        let raw = "Sure! {\"a\": {\"b\": [1, 2]}, \"c\": \"}\"} trailing words";
        let extracted = extract_json(raw).unwrap();

        assert_eq!(extracted.strategy, ExtractionStrategy::BraceScan);
        assert_eq!(extracted.json, "{\"a\": {\"b\": [1, 2]}, \"c\": \"}\"}");
    }

    #[test]
    fn brace_scan_skips_braces_that_do_not_parse() {
        let raw = "set {x | x > 0} then {\"x\": 1}";
        let extracted = extract_json(raw).unwrap();

        assert_eq!(extracted.json, "{\"x\": 1}");
    }

    #[test]
    fn bare_json_output_is_accepted() {
        let raw = "{\"name\": \"Ada\"}";
        let extracted = extract_json(raw).unwrap();
        assert_eq!(extracted.json, raw);
    }

    #[test]
    fn text_without_json_fails_with_extraction_error() {
        let err = extract_json("I cannot help with that.").unwrap_err();
        assert!(matches!(err, ForgeError::Extraction { .. }));
    }

    #[test]
    fn unbalanced_braces_fail_with_extraction_error() {
        let err = extract_json("{\"name\": \"Ada\"").unwrap_err();
        assert!(matches!(err, ForgeError::Extraction { .. }));
    }

    #[test]
    fn arrays_are_not_accepted_as_records() {
        let err = extract_json("```json\n[1, 2, 3]\n```").unwrap_err();
        assert!(matches!(err, ForgeError::Extraction { .. }));
    }
}
