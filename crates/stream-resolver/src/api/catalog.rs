//! Catalog metadata client.
//!
//! Read-only client for the Jikan-style catalog API. Every request passes
//! through the shared rate governor first; the upstream publishes a minimum
//! request spacing and enforcement is our job, not theirs. Hops fail fast
//! with no automatic retry, retrying is the caller's decision.

use super::rate_governor::RateGovernor;
use super::types::{CatalogAnime, CatalogEpisode, Envelope};
use super::urlencode;
use reqwest::{Client, StatusCode};
use shared::{CanonicalRecord, ResolveError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const SOURCE_NAME: &str = "catalog";

/// Rate-governed catalog API client
pub struct CatalogClient {
    /// HTTP client
    client: Client,
    /// Base URL for the catalog API
    base_url: String,
    /// Shared governor for the catalog's published request spacing
    governor: Arc<RateGovernor>,
    /// Page size for listing endpoints
    page_size: u32,
}

impl CatalogClient {
    /// Create a new catalog client sharing the given governor
    pub fn new(
        base_url: String,
        governor: Arc<RateGovernor>,
        page_size: u32,
    ) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("stream-resolver/0.1.0")
            .build()
            .map_err(|e| ResolveError::upstream(SOURCE_NAME, &e))?;

        Ok(Self {
            client,
            base_url,
            governor,
            page_size,
        })
    }

    /// Make one governed GET request and return the raw response.
    async fn get_raw(&self, endpoint: &str) -> Result<reqwest::Response, ResolveError> {
        self.governor.acquire().await;

        let url = format!("{}{}", self.base_url, endpoint);
        debug!(url = %url, "Catalog request");

        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::upstream(SOURCE_NAME, &e))
    }

    /// Make one governed GET request and parse the `data` envelope.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<T, ResolveError> {
        let response = self.get_raw(endpoint).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ResolveError::upstream_status(SOURCE_NAME, status));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ResolveError::Shape(format!("catalog payload: {e}")))?;
        Ok(envelope.data)
    }

    /// Paged listing ordered by popularity
    pub async fn popular(&self, page: u32) -> Result<Vec<CanonicalRecord>, ResolveError> {
        let anime: Vec<CatalogAnime> = self
            .get(&format!(
                "/anime?order_by=popularity&page={}&limit={}",
                page, self.page_size
            ))
            .await?;
        Ok(anime.into_iter().map(CanonicalRecord::from).collect())
    }

    /// Currently-airing listing, ordered by popularity
    pub async fn airing(&self) -> Result<Vec<CanonicalRecord>, ResolveError> {
        let anime: Vec<CatalogAnime> = self
            .get(&format!(
                "/anime?status=airing&order_by=popularity&limit={}",
                self.page_size
            ))
            .await?;
        Ok(anime.into_iter().map(CanonicalRecord::from).collect())
    }

    /// Listing ordered by score
    pub async fn top(&self) -> Result<Vec<CanonicalRecord>, ResolveError> {
        let anime: Vec<CatalogAnime> = self
            .get(&format!(
                "/anime?order_by=score&sort=desc&limit={}",
                self.page_size
            ))
            .await?;
        Ok(anime.into_iter().map(CanonicalRecord::from).collect())
    }

    /// Single-record lookup by catalog id
    pub async fn anime_by_id(&self, mal_id: u32) -> Result<CanonicalRecord, ResolveError> {
        let response = self.get_raw(&format!("/anime/{mal_id}")).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound(mal_id));
        }
        if !status.is_success() {
            return Err(ResolveError::upstream_status(SOURCE_NAME, status));
        }

        let envelope: Envelope<CatalogAnime> = response
            .json()
            .await
            .map_err(|e| ResolveError::Shape(format!("catalog payload: {e}")))?;
        Ok(CanonicalRecord::from(envelope.data))
    }

    /// Free-text search by title
    pub async fn search(&self, query: &str) -> Result<Vec<CanonicalRecord>, ResolveError> {
        let anime: Vec<CatalogAnime> = self
            .get(&format!(
                "/anime?q={}&limit={}",
                urlencode(query),
                self.page_size
            ))
            .await?;
        Ok(anime.into_iter().map(CanonicalRecord::from).collect())
    }

    /// Catalog-side episode listing by catalog id
    pub async fn episodes(&self, mal_id: u32) -> Result<Vec<CatalogEpisode>, ResolveError> {
        self.get(&format!("/anime/{mal_id}/episodes")).await
    }
}

#[async_trait::async_trait]
impl crate::resolver::CatalogSource for CatalogClient {
    async fn anime_by_id(&self, mal_id: u32) -> Result<CanonicalRecord, ResolveError> {
        CatalogClient::anime_by_id(self, mal_id).await
    }
}
