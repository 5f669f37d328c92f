//! The episode resolution orchestrator.
//!
//! Drives the strict hop chain from a canonical catalog id to a playable
//! URL: fetch title -> search secondary -> match -> fetch detail -> select
//! episode -> fetch server descriptor -> fetch stream URL. Each hop's
//! required input only exists in the previous hop's output, so no hop is
//! skipped or reordered, and every failure stops the chain with its kind
//! intact. The pipeline never retries on its own.

use crate::{matcher, normalize};
use async_trait::async_trait;
use serde_json::Value;
use shared::{
    CanonicalRecord, EpisodeDescriptor, MatchKind, MatchOutcome, ResolveError, StreamTarget,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// The trusted, rate-limited metadata side of the pipeline.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the canonical record for a catalog id.
    async fn anime_by_id(&self, mal_id: u32) -> Result<CanonicalRecord, ResolveError>;
}

/// The scraping-backed side of the pipeline, reached through the relay.
#[async_trait]
pub trait SecondarySource: Send + Sync {
    /// Free-text search; shape is unstable and returned raw.
    async fn search(&self, query: &str) -> Result<Value, ResolveError>;

    /// Ordered episode list for one of the source's own anime ids.
    async fn episode_list(&self, anime_id: &str) -> Result<Vec<EpisodeDescriptor>, ResolveError>;

    /// Server-group id for an episode id.
    async fn server_group(&self, episode_id: &str) -> Result<String, ResolveError>;

    /// Playable URL for a server-group id.
    async fn stream_url(&self, server_id: &str) -> Result<StreamTarget, ResolveError>;
}

/// Everything learned about one title before an episode is selected:
/// the canonical record, how the secondary-source candidate was chosen,
/// and the ordered episode list (empty is valid, "no episodes yet").
#[derive(Debug, Clone)]
pub struct ResolvedAnime {
    pub canonical: CanonicalRecord,
    pub matched: MatchOutcome,
    pub episodes: Vec<EpisodeDescriptor>,
}

/// Orchestrates one resolution at a time over the two sources.
pub struct EpisodeResolver<C, S> {
    catalog: C,
    secondary: S,
}

impl<C: CatalogSource, S: SecondarySource> EpisodeResolver<C, S> {
    /// Create a resolver over the given sources
    pub fn new(catalog: C, secondary: S) -> Self {
        Self { catalog, secondary }
    }

    /// Hops 1-4: canonical title, secondary search, match, episode list.
    pub async fn load(&self, mal_id: u32) -> Result<ResolvedAnime, ResolveError> {
        let canonical = self.catalog.anime_by_id(mal_id).await?;
        info!(mal_id, title = %canonical.title, "Fetched canonical record");

        let query = matcher::sanitize_query(&canonical.title);
        let raw = self.secondary.search(&query).await?;
        let candidates = normalize::extract_candidates(&raw)?;
        info!(query = %query, candidates = candidates.len(), "Secondary search complete");

        let matched = matcher::best_match(&canonical.title, &candidates)?;
        match matched.kind {
            MatchKind::Title => info!(
                candidate = %matched.candidate.title,
                "Matched candidate by title"
            ),
            MatchKind::FirstResult => warn!(
                candidate = %matched.candidate.title,
                "No title match, falling back to the top search hit"
            ),
        }

        let anime_id = matched
            .candidate
            .id
            .as_deref()
            .ok_or(ResolveError::MissingField("animeId"))?;

        let episodes = self.secondary.episode_list(anime_id).await?;
        info!(anime_id = %anime_id, episodes = episodes.len(), "Fetched episode list");

        Ok(ResolvedAnime {
            canonical,
            matched,
            episodes,
        })
    }

    /// Hops 5-7: select an episode by index, fetch its server descriptor,
    /// fetch the playable URL. An out-of-range index fails before any
    /// network call is made.
    pub async fn resolve_episode(
        &self,
        anime: &ResolvedAnime,
        index: usize,
    ) -> Result<StreamTarget, ResolveError> {
        let episode = anime
            .episodes
            .get(index)
            .ok_or(ResolveError::InvalidSelection {
                index,
                available: anime.episodes.len(),
            })?;

        let episode_id = episode
            .id
            .as_deref()
            .ok_or(ResolveError::MissingField("episode id"))?;

        let server_id = self.secondary.server_group(episode_id).await?;
        let target = self.secondary.stream_url(&server_id).await?;
        info!(episode = index, url = %target.url, "Resolved stream target");

        Ok(target)
    }

    /// One complete resolution: canonical id + episode index to a playable
    /// URL.
    pub async fn resolve(
        &self,
        mal_id: u32,
        index: usize,
    ) -> Result<(ResolvedAnime, StreamTarget), ResolveError> {
        let anime = self.load(mal_id).await?;
        let target = self.resolve_episode(&anime, index).await?;
        Ok((anime, target))
    }
}

/// Opaque token identifying one in-flight resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Issues monotonically increasing request tokens so callers can discard
/// late-arriving results from superseded resolutions. There is no
/// cancellation in the transport; staleness is decided at completion time.
#[derive(Debug, Default)]
pub struct RequestTracker {
    current: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new resolution, superseding any earlier one.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a completed resolution's token is still the latest.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::Candidate;
    use std::sync::Mutex;

    struct FakeCatalog {
        record: Result<CanonicalRecord, &'static str>,
    }

    impl FakeCatalog {
        fn with_title(mal_id: u32, title: &str) -> Self {
            Self {
                record: Ok(CanonicalRecord {
                    mal_id,
                    title: title.to_string(),
                    title_english: None,
                    title_synonyms: Vec::new(),
                    episodes_total: None,
                    status: None,
                    score: None,
                }),
            }
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn anime_by_id(&self, mal_id: u32) -> Result<CanonicalRecord, ResolveError> {
            match &self.record {
                Ok(record) => Ok(record.clone()),
                Err(_) => Err(ResolveError::NotFound(mal_id)),
            }
        }
    }

    struct FakeSecondary {
        search_response: Value,
        episodes: Vec<EpisodeDescriptor>,
        server_id: Option<&'static str>,
        url: &'static str,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSecondary {
        fn new(search_response: Value) -> Self {
            Self {
                search_response,
                episodes: vec![
                    episode("ep-1"),
                    episode("ep-2"),
                    episode("ep-3"),
                ],
                server_id: Some("srv-1"),
                url: "https://video.example/ep-1",
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    fn episode(id: &str) -> EpisodeDescriptor {
        EpisodeDescriptor {
            id: Some(id.to_string()),
            number: None,
            title: None,
        }
    }

    #[async_trait]
    impl SecondarySource for FakeSecondary {
        async fn search(&self, query: &str) -> Result<Value, ResolveError> {
            self.record(format!("search:{query}"));
            Ok(self.search_response.clone())
        }

        async fn episode_list(
            &self,
            anime_id: &str,
        ) -> Result<Vec<EpisodeDescriptor>, ResolveError> {
            self.record(format!("episode_list:{anime_id}"));
            Ok(self.episodes.clone())
        }

        async fn server_group(&self, episode_id: &str) -> Result<String, ResolveError> {
            self.record(format!("server_group:{episode_id}"));
            match self.server_id {
                Some(id) => Ok(id.to_string()),
                None => Err(ResolveError::MissingField("serverId")),
            }
        }

        async fn stream_url(&self, server_id: &str) -> Result<StreamTarget, ResolveError> {
            self.record(format!("stream_url:{server_id}"));
            Ok(StreamTarget {
                url: self.url.to_string(),
                server: None,
            })
        }
    }

    #[tokio::test]
    async fn test_full_resolution() {
        let catalog = FakeCatalog::with_title(1, "Naruto (TV)");
        let secondary = FakeSecondary::new(json!([
            {"title": "Naruto", "animeId": "x1"},
            {"title": "Naruto Shippuden", "animeId": "x2"}
        ]));

        let resolver = EpisodeResolver::new(catalog, secondary);
        let (anime, target) = resolver.resolve(1, 0).await.unwrap();

        // "naruto" is contained in the normalized target "narutotv"
        assert_eq!(anime.matched.candidate.id.as_deref(), Some("x1"));
        assert_eq!(anime.matched.kind, MatchKind::Title);
        assert_eq!(anime.episodes.len(), 3);
        assert_eq!(target.url, "https://video.example/ep-1");

        assert_eq!(
            resolver.secondary.calls(),
            vec![
                "search:Naruto TV",
                "episode_list:x1",
                "server_group:ep-1",
                "stream_url:srv-1",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_search_stops_the_chain() {
        let catalog = FakeCatalog::with_title(1, "Naruto");
        let secondary = FakeSecondary::new(json!([]));

        let resolver = EpisodeResolver::new(catalog, secondary);
        let err = resolver.load(1).await.unwrap_err();

        assert!(matches!(err, ResolveError::NoCandidates));
        // Only the search hop ran
        assert_eq!(resolver.secondary.calls(), vec!["search:Naruto"]);
    }

    #[tokio::test]
    async fn test_unknown_id_fails_before_search() {
        let catalog = FakeCatalog {
            record: Err("missing"),
        };
        let secondary = FakeSecondary::new(json!([]));

        let resolver = EpisodeResolver::new(catalog, secondary);
        let err = resolver.load(99).await.unwrap_err();

        assert!(matches!(err, ResolveError::NotFound(99)));
        assert!(resolver.secondary.calls().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_index_makes_no_network_call() {
        let catalog = FakeCatalog::with_title(1, "Naruto");
        let secondary = FakeSecondary::new(json!([{"title": "Naruto", "animeId": "x1"}]));

        let resolver = EpisodeResolver::new(catalog, secondary);
        let anime = resolver.load(1).await.unwrap();
        let calls_after_load = resolver.secondary.calls().len();

        let err = resolver.resolve_episode(&anime, 5).await.unwrap_err();

        assert!(matches!(
            err,
            ResolveError::InvalidSelection {
                index: 5,
                available: 3
            }
        ));
        assert_eq!(resolver.secondary.calls().len(), calls_after_load);
    }

    #[tokio::test]
    async fn test_missing_server_id_surfaces_as_missing_field() {
        let catalog = FakeCatalog::with_title(1, "Naruto");
        let mut secondary = FakeSecondary::new(json!([{"title": "Naruto", "animeId": "x1"}]));
        secondary.server_id = None;

        let resolver = EpisodeResolver::new(catalog, secondary);
        let anime = resolver.load(1).await.unwrap();
        let err = resolver.resolve_episode(&anime, 0).await.unwrap_err();

        assert!(matches!(err, ResolveError::MissingField("serverId")));
    }

    #[tokio::test]
    async fn test_fallback_match_is_tagged() {
        let catalog = FakeCatalog::with_title(1, "Frieren");
        let secondary = FakeSecondary::new(json!([
            {"title": "Bleach", "animeId": "x1"},
            {"title": "One Piece", "animeId": "x2"}
        ]));

        let resolver = EpisodeResolver::new(catalog, secondary);
        let anime = resolver.load(1).await.unwrap();

        assert_eq!(anime.matched.kind, MatchKind::FirstResult);
        assert_eq!(anime.matched.candidate.id.as_deref(), Some("x1"));
    }

    #[tokio::test]
    async fn test_matched_candidate_without_id_fails() {
        let catalog = FakeCatalog::with_title(1, "Naruto");
        let secondary = FakeSecondary::new(json!([{"title": "Naruto"}]));

        let resolver = EpisodeResolver::new(catalog, secondary);
        let err = resolver.load(1).await.unwrap_err();

        assert!(matches!(err, ResolveError::MissingField("animeId")));
    }

    #[test]
    fn test_request_tracker_supersedes_older_tokens() {
        let tracker = RequestTracker::new();

        let first = tracker.begin();
        assert!(tracker.is_current(first));

        let second = tracker.begin();
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }
}
