//! Cross-source episode resolution pipeline.
//!
//! Turns a canonical catalog id into a playable stream URL hosted by an
//! unrelated scraping-backed source: fetch the canonical title, search the
//! secondary source, bridge the two id spaces by fuzzy title matching, then
//! walk the secondary source's own id chain (anime -> episode -> server ->
//! url) one hop at a time.

pub mod api;
pub mod matcher;
pub mod normalize;
pub mod resolver;

pub use api::{CatalogClient, RateGovernor, SecondaryClient};
pub use resolver::{
    CatalogSource, EpisodeResolver, RequestToken, RequestTracker, ResolvedAnime, SecondarySource,
};
