use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::error::ExtractionError;
use crate::escape::unescape;

/// A decoded JSON object.
pub type Record = Map<String, Value>;

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("fenced json pattern is valid")
});

/// How the unfenced fallback picks its span once a `{` has been seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStrategy {
    /// First `{` to the last `}` of the whole text.
    #[default]
    Greedy,
    /// First `{` to its matching `}`; greedy when nothing balances.
    Balanced,
}

impl std::str::FromStr for SpanStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(SpanStrategy::Greedy),
            "balanced" => Ok(SpanStrategy::Balanced),
            other => Err(format!("unknown span strategy '{}' (expected greedy or balanced)", other)),
        }
    }
}

/// Pulls a single JSON object out of free-form model output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor {
    strategy: SpanStrategy,
}

impl JsonExtractor {
    pub fn new(strategy: SpanStrategy) -> Self {
        Self { strategy }
    }

    /// Locate, unescape and parse the JSON object embedded in `text`.
    pub fn extract(&self, text: &str) -> Result<Record, ExtractionError> {
        let payload = locate_candidate(text, self.strategy).ok_or(ExtractionError::NotFound)?;
        decode(payload)
    }
}

/// Extract with the greedy brace span.
pub fn extract(text: &str) -> Result<Record, ExtractionError> {
    JsonExtractor::default().extract(text)
}

/// Find the candidate payload: a ```` ```json ```` fenced object first, then a
/// brace span picked by `strategy`.
pub fn locate_candidate(text: &str, strategy: SpanStrategy) -> Option<&str> {
    if let Some(captures) = FENCED_JSON.captures(text) {
        return captures.get(1).map(|m| m.as_str());
    }

    match strategy {
        SpanStrategy::Greedy => greedy_span(text),
        SpanStrategy::Balanced => balanced_span(text).or_else(|| greedy_span(text)),
    }
}

fn greedy_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Span from the first `{` to the `}` that brings nesting back to zero.
/// Braces inside string literals do not count.
fn balanced_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
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
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse the payload, preferring its unescaped form when that form differs
/// and parses.
fn decode(payload: &str) -> Result<Record, ExtractionError> {
    if let Ok(unescaped) = unescape(payload) {
        if unescaped != payload {
            match serde_json::from_str::<Record>(&unescaped) {
                Ok(record) => return Ok(record),
                Err(e) => tracing::debug!(error = %e, "Unescaped payload did not parse, using raw payload"),
            }
        }
    }

    serde_json::from_str::<Record>(payload).map_err(ExtractionError::ParseFailure)
}
