//! Secondary-source client, reached through the local relay.
//!
//! The relay rewrites outbound headers and sidesteps browser-origin
//! restrictions; to us it is an opaque forwarding boundary with a health
//! endpoint. Before every real request the health endpoint is probed, and a
//! failed probe surfaces as `UpstreamUnavailable` without the real call
//! being attempted. The source has no published rate limit, so no governor
//! is involved.

use super::types::{Envelope, SecondaryDetail, ServerPointer, ServerStream};
use super::urlencode;
use reqwest::Client;
use serde_json::Value;
use shared::{EpisodeDescriptor, ResolveError, StreamTarget};
use std::time::Duration;
use tracing::debug;

const SOURCE_NAME: &str = "secondary";

/// Relay-backed client for the scraping-based source
pub struct SecondaryClient {
    /// HTTP client
    client: Client,
    /// Relay base URL
    base_url: String,
    /// Path segment selecting the scraped source behind the relay
    source: String,
}

impl SecondaryClient {
    /// Create a new secondary-source client
    pub fn new(base_url: String, source: String) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("stream-resolver/0.1.0")
            .build()
            .map_err(|e| ResolveError::upstream(SOURCE_NAME, &e))?;

        Ok(Self {
            client,
            base_url,
            source,
        })
    }

    /// Probe the relay's health endpoint. Any failure means the relay (or
    /// the source behind it) is unusable right now.
    async fn ensure_healthy(&self) -> Result<(), ResolveError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::upstream(SOURCE_NAME, &e))?;

        if !response.status().is_success() {
            return Err(ResolveError::upstream_status(
                SOURCE_NAME,
                response.status(),
            ));
        }
        Ok(())
    }

    /// Health-checked GET returning the response body as raw JSON.
    async fn get_json(&self, endpoint: &str) -> Result<Value, ResolveError> {
        self.ensure_healthy().await?;

        let url = format!("{}/{}{}", self.base_url, self.source, endpoint);
        debug!(url = %url, "Secondary request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::upstream(SOURCE_NAME, &e))?;

        if !response.status().is_success() {
            return Err(ResolveError::upstream_status(
                SOURCE_NAME,
                response.status(),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ResolveError::Shape(format!("secondary payload: {e}")))
    }

    /// Free-text search. The response shape is unstable; it goes back raw
    /// for the normalizer to untangle.
    pub async fn search(&self, query: &str) -> Result<Value, ResolveError> {
        self.get_json(&format!("/search?q={}", urlencode(query))).await
    }

    /// Detail lookup by the source's own anime id; yields the ordered
    /// episode list. An empty list is valid ("no episodes yet").
    pub async fn episode_list(
        &self,
        anime_id: &str,
    ) -> Result<Vec<EpisodeDescriptor>, ResolveError> {
        let raw = self.get_json(&format!("/anime/{anime_id}")).await?;

        let envelope: Envelope<SecondaryDetail> = serde_json::from_value(raw)
            .map_err(|e| ResolveError::Shape(format!("secondary detail: {e}")))?;

        Ok(envelope
            .data
            .episodes
            .into_iter()
            .map(EpisodeDescriptor::from)
            .collect())
    }

    /// Per-episode lookup; yields the server-group id for the final hop.
    /// An absent id is upstream contract drift, not a transport failure.
    pub async fn server_group(&self, episode_id: &str) -> Result<String, ResolveError> {
        let raw = self.get_json(&format!("/episode/{episode_id}")).await?;

        let envelope: Envelope<ServerPointer> = serde_json::from_value(raw)
            .map_err(|e| ResolveError::Shape(format!("secondary episode: {e}")))?;

        envelope
            .data
            .server_id
            .as_ref()
            .and_then(crate::normalize::value_to_id)
            .ok_or(ResolveError::MissingField("serverId"))
    }

    /// Server-group lookup; yields the playable URL.
    pub async fn stream_url(&self, server_id: &str) -> Result<StreamTarget, ResolveError> {
        let raw = self.get_json(&format!("/server/{server_id}")).await?;

        let envelope: Envelope<ServerStream> = serde_json::from_value(raw)
            .map_err(|e| ResolveError::Shape(format!("secondary server: {e}")))?;

        let url = envelope.data.url.ok_or(ResolveError::MissingField("url"))?;

        Ok(StreamTarget {
            url,
            server: envelope.data.server,
        })
    }
}

#[async_trait::async_trait]
impl crate::resolver::SecondarySource for SecondaryClient {
    async fn search(&self, query: &str) -> Result<Value, ResolveError> {
        SecondaryClient::search(self, query).await
    }

    async fn episode_list(&self, anime_id: &str) -> Result<Vec<EpisodeDescriptor>, ResolveError> {
        SecondaryClient::episode_list(self, anime_id).await
    }

    async fn server_group(&self, episode_id: &str) -> Result<String, ResolveError> {
        SecondaryClient::server_group(self, episode_id).await
    }

    async fn stream_url(&self, server_id: &str) -> Result<StreamTarget, ResolveError> {
        SecondaryClient::stream_url(self, server_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SecondaryClient::new(
            "http://localhost:3001".to_string(),
            "otakudesu".to_string(),
        );
        assert!(client.is_ok());
    }
}
