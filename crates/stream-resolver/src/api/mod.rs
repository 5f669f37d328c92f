//! HTTP clients for the two upstream sources.
//!
//! The catalog source is rate-limited and trusted; the secondary source is
//! scraping-backed, reached through a local relay, and trusted for nothing,
//! least of all its response shapes.

pub mod catalog;
pub mod rate_governor;
pub mod secondary;
pub mod types;

pub use catalog::CatalogClient;
pub use rate_governor::RateGovernor;
pub use secondary::SecondaryClient;

/// Percent-encode a query string value
pub(crate) fn urlencode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            b' ' => encoded.push_str("%20"),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
