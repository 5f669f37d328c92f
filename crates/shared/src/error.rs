//! Error taxonomy for the resolution pipeline.
//!
//! Every hop fails fast with a distinguishable kind; the caller decides
//! what to retry and what to surface. Nothing here is swallowed or folded
//! into a bare string.

use thiserror::Error;

/// Failure of one resolution attempt.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Transport/HTTP failure or a failed relay health check. The only
    /// kind worth retrying.
    #[error("{source_name} is unavailable: {message}")]
    UpstreamUnavailable {
        source_name: &'static str,
        message: String,
    },

    /// The catalog source has no record for the requested id.
    #[error("no catalog record for id {0}")]
    NotFound(u32),

    /// The response JSON matched none of the recognized shapes. Retrying
    /// won't change an upstream schema, so this is a hard stop.
    #[error("unrecognized response shape: {0}")]
    Shape(String),

    /// The secondary-source search produced nothing to match against.
    #[error("search returned no candidates")]
    NoCandidates,

    /// A later hop's required linking id was absent; signals upstream
    /// contract drift rather than a transport problem.
    #[error("missing field in response: {0}")]
    MissingField(&'static str),

    /// The caller asked for an episode index that doesn't exist.
    #[error("episode index {index} out of range ({available} episodes)")]
    InvalidSelection { index: usize, available: usize },
}

impl ResolveError {
    /// Wrap a transport-level failure from one of the upstream sources.
    pub fn upstream(source_name: &'static str, err: &reqwest::Error) -> Self {
        ResolveError::UpstreamUnavailable {
            source_name,
            message: err.to_string(),
        }
    }

    /// Wrap a non-2xx HTTP status from one of the upstream sources.
    pub fn upstream_status(source_name: &'static str, status: reqwest::StatusCode) -> Self {
        ResolveError::UpstreamUnavailable {
            source_name,
            message: format!("HTTP status {status}"),
        }
    }

    /// Stable label for the failure kind, for logs and UI dispatch.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::UpstreamUnavailable { .. } => "upstream_unavailable",
            ResolveError::NotFound(_) => "not_found",
            ResolveError::Shape(_) => "shape",
            ResolveError::NoCandidates => "no_candidates",
            ResolveError::MissingField(_) => "missing_field",
            ResolveError::InvalidSelection { .. } => "invalid_selection",
        }
    }

    /// Whether a caller-side retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolveError::UpstreamUnavailable { .. })
    }
}
