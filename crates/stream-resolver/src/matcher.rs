//! Title matching across the two sources' naming schemes.
//!
//! The catalog and secondary sources share no identifier space, so the only
//! bridge between them is the title string. Comparison keys are aggressively
//! normalized (lowercase, ASCII alphanumerics only) so punctuation, spacing,
//! and parenthetical annotations never affect matching.

use shared::{Candidate, MatchKind, MatchOutcome, ResolveError};

/// Reduce a title to its comparison key: lowercase, ASCII letters and
/// digits only.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Sanitize a title for use as a secondary-source search query: keep
/// letters, digits, spaces and `.,'-`, then collapse whitespace runs.
pub fn sanitize_query(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '.' | ',' | '\'' | '-'))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pick the best candidate for a target title.
///
/// A candidate matches when its normalized title contains the normalized
/// target as a substring, or the other way around (subtitle and
/// season-suffix asymmetry goes both directions). First match in input
/// order wins, since candidates arrive pre-ranked by the secondary source's
/// own relevance ordering.
///
/// When nothing matches, the first candidate is taken as the best available
/// guess rather than failing: a wrong anime is preferred over no video at
/// all, and the outcome is tagged `FirstResult` so the fallback stays
/// visible. Fails with `NoCandidates` only on an empty slice.
pub fn best_match(target: &str, candidates: &[Candidate]) -> Result<MatchOutcome, ResolveError> {
    if candidates.is_empty() {
        return Err(ResolveError::NoCandidates);
    }

    let normalized_target = normalize_title(target);

    let matched = candidates.iter().find(|candidate| {
        let normalized = normalize_title(&candidate.title);
        normalized.contains(&normalized_target) || normalized_target.contains(&normalized)
    });

    match matched {
        Some(candidate) => Ok(MatchOutcome {
            candidate: candidate.clone(),
            kind: MatchKind::Title,
        }),
        None => Ok(MatchOutcome {
            candidate: candidates[0].clone(),
            kind: MatchKind::FirstResult,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, title: &str) -> Candidate {
        Candidate {
            id: Some(id.to_string()),
            title: title.to_string(),
            href: None,
        }
    }

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_title("Naruto (TV)"), "narutotv");
        assert_eq!(normalize_title("Re:Zero - Starting Life"), "rezerostartinglife");
        assert_eq!(normalize_title("86"), "86");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for title in ["Naruto TV", "one piece 2", "Attack on Titan"] {
            let once = normalize_title(title);
            assert_eq!(normalize_title(&once), once);
        }
    }

    #[test]
    fn test_sanitize_query() {
        assert_eq!(sanitize_query("Naruto (TV)"), "Naruto TV");
        assert_eq!(sanitize_query("Dr. Stone: New World!"), "Dr. Stone New World");
        assert_eq!(sanitize_query("  spaced   out  "), "spaced out");
        assert_eq!(sanitize_query("Gintama'"), "Gintama'");
    }

    #[test]
    fn test_candidate_containing_target_matches() {
        let candidates = vec![
            candidate("x1", "Naruto Shippuden"),
            candidate("x2", "Naruto"),
        ];
        let outcome = best_match("Naruto Ship", &candidates).unwrap();
        assert_eq!(outcome.candidate.id.as_deref(), Some("x1"));
        assert_eq!(outcome.kind, MatchKind::Title);
    }

    #[test]
    fn test_target_containing_candidate_matches() {
        // Target carries a suffix the secondary source doesn't use
        let candidates = vec![candidate("x1", "Naruto")];
        let outcome = best_match("Naruto (TV)", &candidates).unwrap();
        assert_eq!(outcome.candidate.id.as_deref(), Some("x1"));
        assert_eq!(outcome.kind, MatchKind::Title);
    }

    #[test]
    fn test_first_matching_candidate_wins() {
        let candidates = vec![
            candidate("x1", "Bleach"),
            candidate("x2", "Naruto"),
            candidate("x3", "Naruto Shippuden"),
        ];
        let outcome = best_match("Naruto", &candidates).unwrap();
        assert_eq!(outcome.candidate.id.as_deref(), Some("x2"));
    }

    #[test]
    fn test_no_substring_match_falls_back_to_first() {
        let candidates = vec![
            candidate("x1", "Bleach"),
            candidate("x2", "One Piece"),
        ];
        let outcome = best_match("Naruto", &candidates).unwrap();
        assert_eq!(outcome.candidate.id.as_deref(), Some("x1"));
        assert_eq!(outcome.kind, MatchKind::FirstResult);
    }

    #[test]
    fn test_empty_candidates_fail() {
        let err = best_match("Naruto", &[]).unwrap_err();
        assert!(matches!(err, ResolveError::NoCandidates));
    }
}
