//! Dotted-path extraction from opaque JSON responses
//!
//! A path such as `choices.0.message.content` is walked one segment at a time:
//! arrays take a non-negative integer index, objects take an exact key, and any
//! other value with segments remaining yields nothing. Extraction never fails
//! loudly; every problem is an absent result plus a debug log line.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Answer text recorded when the answer path resolves to nothing
pub const EXTRACTION_FAILED: &str = "解析失败：未找到内容";

/// Default answer path for chat-completion style responses
pub const DEFAULT_ANSWER_PATH: &str = "choices.0.message.content";
/// Default token-usage path for chat-completion style responses
pub const DEFAULT_TOKENS_PATH: &str = "usage.total_tokens";
/// Default path of an upstream error message
pub const DEFAULT_ERROR_PATH: &str = "error.message";
/// Default path of the finish/stop reason
pub const DEFAULT_FINISH_REASON_PATH: &str = "choices.0.finish_reason";
/// Default path of tool-call evidence
pub const DEFAULT_TOOL_CALLS_PATH: &str = "choices.0.message.tool_calls";

/// Where the logical fields live inside a raw response
///
/// Stored templates usually name only `answer` and `tokens`; the remaining
/// paths fall back to the chat-completion defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRules {
    /// Path of the answer text
    pub answer: String,
    /// Path of the total token count
    pub tokens: String,
    /// Path of an upstream error message
    #[serde(default = "default_error_path")]
    pub error: String,
    /// Path of the finish/stop reason
    #[serde(default = "default_finish_reason_path")]
    pub finish_reason: String,
    /// Path of tool-call evidence
    #[serde(default = "default_tool_calls_path")]
    pub tool_calls: String,
}

impl Default for MappingRules {
    fn default() -> Self {
        Self::with_fields(DEFAULT_ANSWER_PATH, DEFAULT_TOKENS_PATH)
    }
}

impl MappingRules {
    /// Rules with custom answer/tokens paths and default auxiliary paths
    pub fn with_fields(answer: &str, tokens: &str) -> Self {
        Self {
            answer: answer.to_string(),
            tokens: tokens.to_string(),
            error: default_error_path(),
            finish_reason: default_finish_reason_path(),
            tool_calls: default_tool_calls_path(),
        }
    }

    /// Parse stored rules; `None` if the text is not a string→string mapping
    ///
    /// A missing `answer` or `tokens` key leaves that path empty, so the field
    /// resolves to nothing rather than to a default location.
    pub fn parse(text: &str) -> Option<Self> {
        let mut map = match serde_json::from_str::<HashMap<String, String>>(text) {
            Ok(map) => map,
            Err(e) => {
                tracing::debug!(error = %e, "mapping rules rejected");
                return None;
            }
        };
        Some(Self {
            answer: map.remove("answer").unwrap_or_default(),
            tokens: map.remove("tokens").unwrap_or_default(),
            error: map.remove("error").unwrap_or_else(default_error_path),
            finish_reason: map
                .remove("finish_reason")
                .unwrap_or_else(default_finish_reason_path),
            tool_calls: map.remove("tool_calls").unwrap_or_else(default_tool_calls_path),
        })
    }

    /// Parse stored rules, falling back to `fallback` when absent or malformed
    pub fn parse_or(text: Option<&str>, fallback: MappingRules) -> Self {
        text.and_then(Self::parse).unwrap_or(fallback)
    }
}

fn default_error_path() -> String {
    DEFAULT_ERROR_PATH.to_string()
}

fn default_finish_reason_path() -> String {
    DEFAULT_FINISH_REASON_PATH.to_string()
}

fn default_tool_calls_path() -> String {
    DEFAULT_TOOL_CALLS_PATH.to_string()
}

/// Answer and token count pulled from a response
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Extracted {
    /// Answer text, or [`EXTRACTION_FAILED`] when nothing was found
    pub answer: String,
    /// Non-negative token count, 0 when absent or not a number
    pub tokens: i64,
    /// Whether the answer path resolved to a value
    pub answer_found: bool,
}

impl Extracted {
    /// Whether the answer is missing or whitespace only
    pub fn is_blank(&self) -> bool {
        !self.answer_found || self.answer.trim().is_empty()
    }
}

/// Walk `path` through `value`
///
/// Returns `None` for an empty path, a null root, a missing key, a non-numeric
/// or out-of-range array index, or a scalar with segments left over.
pub fn get_value_by_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() || value.is_null() {
        return None;
    }

    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Array(items) => {
                let index = match segment.parse::<usize>() {
                    Ok(index) => index,
                    Err(e) => {
                        tracing::debug!(path, segment, error = %e, "array segment is not an index");
                        return None;
                    }
                };
                match items.get(index) {
                    Some(item) => item,
                    None => {
                        tracing::debug!(path, index, len = items.len(), "array index out of range");
                        return None;
                    }
                }
            }
            Value::Object(map) => map.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve `answer` and `tokens` using `rules` (chat-completion defaults if `None`)
pub fn extract_standard(raw: &Value, rules: Option<&MappingRules>) -> Extracted {
    let default_rules;
    let rules = match rules {
        Some(rules) => rules,
        None => {
            default_rules = MappingRules::default();
            &default_rules
        }
    };

    let answer = get_value_by_path(raw, &rules.answer).filter(|v| !v.is_null());
    let tokens = get_value_by_path(raw, &rules.tokens)
        .and_then(coerce_tokens)
        .unwrap_or(0);

    Extracted {
        answer_found: answer.is_some(),
        answer: answer
            .map(text_form)
            .unwrap_or_else(|| EXTRACTION_FAILED.to_string()),
        tokens,
    }
}

/// Re-run extraction over a stored `raw_response` string
///
/// Stored rules are parsed leniently; malformed rules mean defaults, and a
/// non-JSON raw response extracts like an empty document.
pub fn reextract(raw_response: &str, mapping_rules: Option<&str>) -> Extracted {
    let raw = serde_json::from_str::<Value>(raw_response).unwrap_or(Value::Null);
    let rules = MappingRules::parse_or(mapping_rules, MappingRules::default());
    extract_standard(&raw, Some(&rules))
}

/// Whether `path` resolves to something other than null or an empty container
pub fn has_evidence(raw: &Value, path: &str) -> bool {
    match get_value_by_path(raw, path) {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Textual form of a JSON value: strings verbatim, everything else compact JSON
pub fn text_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce_tokens(value: &Value) -> Option<i64> {
    let tokens = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }?;
    Some(tokens.max(0))
}
