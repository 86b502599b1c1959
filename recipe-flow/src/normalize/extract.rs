use regex::Regex;
use serde_json::{Deserializer, Value};
use std::sync::LazyLock;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("Invalid regex"));

static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)\s*```").expect("Invalid regex"));

static OPEN_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*)$").expect("Invalid regex"));

/// Where the candidate JSON text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Interior of a closed fenced block
    Fenced,
    /// Everything after an opening fence that was never closed
    Unterminated,
    /// First complete object inside surrounding prose
    Braced,
    /// The whole completion
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub text: &'a str,
    pub source: CandidateSource,
}

/// Pick the part of a completion most likely to hold the recipe JSON.
pub fn extract_candidate(raw: &str) -> Candidate<'_> {
    let fenced = JSON_FENCE
        .captures(raw)
        .or_else(|| ANY_FENCE.captures(raw))
        .and_then(|caps| caps.get(1));
    if let Some(inner) = fenced {
        return Candidate {
            text: inner.as_str(),
            source: CandidateSource::Fenced,
        };
    }

    if let Some(rest) = OPEN_FENCE.captures(raw).and_then(|caps| caps.get(1)) {
        return Candidate {
            text: rest.as_str().trim(),
            source: CandidateSource::Unterminated,
        };
    }

    let trimmed = raw.trim();
    if let Some(text) = first_object(trimmed).or_else(|| outer_braces(trimmed)) {
        if text.len() < trimmed.len() {
            return Candidate {
                text,
                source: CandidateSource::Braced,
            };
        }
    }

    Candidate {
        text: trimmed,
        source: CandidateSource::Raw,
    }
}

/// The first `{` that starts a complete JSON value, cut at the value's end.
fn first_object(text: &str) -> Option<&str> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut values = Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(_)) => Some(&text[start..start + values.byte_offset()]),
            _ => None,
        }
    })
}

/// First `{` to last `}`, for objects that do not parse on their own.
fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
