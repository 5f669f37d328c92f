//! Normalization of the secondary source's search responses.
//!
//! The secondary source has returned at least three incompatible shapes for
//! the same search endpoint: a bare array, an object with an `animeList`
//! field, and an object whose list hides one level inside a generic `data`
//! container under an unpredictable key. All shape probing lives here so a
//! new shape is handled in exactly one place.

use serde_json::Value;
use shared::{Candidate, ResolveError};

/// Extract the candidate list from whatever shape the search endpoint
/// returned this week.
///
/// Resolution order: the raw value itself, then the `animeList` field, then
/// the first array-valued field of the `data` object in insertion order.
/// Fails with `Shape` when no list can be found at all; a recognized but
/// empty list comes back as an empty `Vec` and becomes `NoCandidates` at
/// the match step.
pub fn extract_candidates(raw: &Value) -> Result<Vec<Candidate>, ResolveError> {
    let list = find_list(raw).ok_or_else(|| {
        ResolveError::Shape("search response contains no candidate list".to_string())
    })?;

    Ok(list.iter().filter_map(parse_candidate).collect())
}

/// Locate the array of candidate records inside the raw response.
fn find_list(raw: &Value) -> Option<&Vec<Value>> {
    if let Value::Array(items) = raw {
        return Some(items);
    }

    if let Some(Value::Array(items)) = raw.get("animeList") {
        return Some(items);
    }

    if let Some(Value::Object(data)) = raw.get("data") {
        for (key, value) in data {
            if let Value::Array(items) = value {
                tracing::debug!(field = %key, "Found candidate list nested under data");
                return Some(items);
            }
        }
    }

    None
}

/// Parse one candidate record. Elements without a title are dropped; an
/// element without an id still matches, it just can't win (the chain fails
/// with `MissingField` only if it does).
fn parse_candidate(item: &Value) -> Option<Candidate> {
    let title = item.get("title")?.as_str()?.to_string();

    let id = item.get("animeId").and_then(value_to_id);
    let href = item
        .get("href")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(Candidate { id, title, href })
}

/// Ids come back as JSON strings or numbers depending on the source's mood.
pub(crate) fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
