//! Wire types for the catalog and secondary APIs.
//!
//! Catalog responses are stable and fully typed. Secondary responses are
//! typed only where the shape has been stable in practice (detail, episode,
//! server); the search endpoint is handled as raw JSON by the normalizer.

use serde::Deserialize;
use serde_json::Value;
use shared::{CanonicalRecord, EpisodeDescriptor};

use crate::normalize::value_to_id;

/// Generic `{ "data": ... }` envelope used by every catalog endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// One catalog anime record
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogAnime {
    pub mal_id: u32,
    pub title: String,
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_synonyms: Vec<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub score: Option<f64>,
}

impl From<CatalogAnime> for CanonicalRecord {
    fn from(anime: CatalogAnime) -> Self {
        CanonicalRecord {
            mal_id: anime.mal_id,
            title: anime.title,
            title_english: anime.title_english,
            title_synonyms: anime.title_synonyms,
            episodes_total: anime.episodes,
            status: anime.status,
            score: anime.score,
        }
    }
}

/// One catalog-side episode entry
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEpisode {
    pub mal_id: u32,
    pub title: Option<String>,
}

/// Secondary-source detail payload; only the episode list matters here
#[derive(Debug, Clone, Deserialize)]
pub struct SecondaryDetail {
    #[serde(default)]
    pub episodes: Vec<SecondaryEpisode>,
}

/// One secondary-source episode entry. The episode id has been spelled
/// both `id` and `episodeId` across versions of the source.
#[derive(Debug, Clone, Deserialize)]
pub struct SecondaryEpisode {
    pub id: Option<Value>,
    #[serde(rename = "episodeId")]
    pub episode_id: Option<Value>,
    pub title: Option<String>,
    pub number: Option<u32>,
}

impl From<SecondaryEpisode> for EpisodeDescriptor {
    fn from(episode: SecondaryEpisode) -> Self {
        let id = episode
            .id
            .as_ref()
            .and_then(value_to_id)
            .or_else(|| episode.episode_id.as_ref().and_then(value_to_id));
        EpisodeDescriptor {
            id,
            number: episode.number,
            title: episode.title,
        }
    }
}

/// Per-episode payload pointing at the server group for the next hop
#[derive(Debug, Clone, Deserialize)]
pub struct ServerPointer {
    #[serde(rename = "serverId")]
    pub server_id: Option<Value>,
}

/// Final server payload carrying the playable URL
#[derive(Debug, Clone, Deserialize)]
pub struct ServerStream {
    pub url: Option<String>,
    pub server: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_episode_id_spellings() {
        let by_id: SecondaryEpisode =
            serde_json::from_value(json!({"id": "ep-1", "number": 1})).unwrap();
        let descriptor = EpisodeDescriptor::from(by_id);
        assert_eq!(descriptor.id.as_deref(), Some("ep-1"));

        let by_episode_id: SecondaryEpisode =
            serde_json::from_value(json!({"episodeId": "ep-2"})).unwrap();
        let descriptor = EpisodeDescriptor::from(by_episode_id);
        assert_eq!(descriptor.id.as_deref(), Some("ep-2"));

        let neither: SecondaryEpisode = serde_json::from_value(json!({"number": 3})).unwrap();
        let descriptor = EpisodeDescriptor::from(neither);
        assert_eq!(descriptor.id, None);
    }

    #[test]
    fn test_catalog_anime_to_canonical() {
        let anime: CatalogAnime = serde_json::from_value(json!({
            "mal_id": 20,
            "title": "Naruto",
            "title_english": "Naruto",
            "episodes": 220,
            "status": "Finished Airing",
            "score": 8.0
        }))
        .unwrap();

        let record = CanonicalRecord::from(anime);
        assert_eq!(record.mal_id, 20);
        assert_eq!(record.episodes_total, Some(220));
        assert!(record.title_synonyms.is_empty());
    }
}
