//! Data models for the resolution pipeline.
//!
//! Two unrelated identifier spaces meet here: the catalog source's numeric
//! ids and the secondary source's opaque string ids. The types never compare
//! the two directly; all cross-referencing goes through title matching or
//! the secondary source's own chained ids (episode -> server -> url).

use serde::{Deserialize, Serialize};

/// The catalog source's view of a title, immutable for the duration of one
/// resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Catalog-side numeric id
    pub mal_id: u32,

    // Titles
    pub title: String,
    pub title_english: Option<String>,
    pub title_synonyms: Vec<String>,

    // Metadata shown by the caller, not used for matching
    pub episodes_total: Option<u32>,
    pub status: Option<String>,
    pub score: Option<f64>,
}

/// A secondary-source search result under consideration for matching.
///
/// The id lives in the secondary source's own id space and may be absent:
/// a bare `{title}` element still participates in matching and only fails
/// the chain if it wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Option<String>,
    pub title: String,
    pub href: Option<String>,
}

/// How a candidate was chosen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Normalized-title substring containment, in either direction
    Title,
    /// No candidate passed the substring test; the secondary source's own
    /// top search hit was taken as the best available guess
    FirstResult,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchKind::Title => write!(f, "title"),
            MatchKind::FirstResult => write!(f, "first_result"),
        }
    }
}

/// A chosen candidate plus how it was chosen, so fallback matches stay
/// visible to callers instead of looking like confident hits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub candidate: Candidate,
    pub kind: MatchKind,
}

/// A secondary-source episode entry.
///
/// Sequence order is presentation order; the secondary source is
/// uncontrolled, so order is not guaranteed stable across refetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeDescriptor {
    /// Secondary-side episode id, required for the server-descriptor hop
    pub id: Option<String>,
    pub number: Option<u32>,
    pub title: Option<String>,
}

/// The final resolved artifact: one playable URL, held by the caller only
/// for the current playback session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamTarget {
    pub url: String,
    pub server: Option<String>,
}
