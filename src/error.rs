//! Error types for the pipeline stages.
//!
//! Two tiers: [`PipelineError`] is fatal for the stage that raises it and
//! maps to a distinct process exit code; [`SearchError`] and [`FetchError`]
//! are per-item failures that callers recover from by skipping a query or
//! classifying a link as dead.

use thiserror::Error;

/// Fatal stage-level error. Each variant carries its own exit code so the
/// surrounding automation can tell a missing credential from a missing
/// upstream artifact.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing credentials: set the {0} and {1} environment variables")]
    MissingCredentials(&'static str, &'static str),

    #[error("{path} not found; run the `{producer}` stage first")]
    MissingArtifact { path: String, producer: &'static str },
}

impl PipelineError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::MissingCredentials(..) => 2,
            PipelineError::MissingArtifact { .. } => 3,
        }
    }
}

/// A failed search call. Recoverable: the collector logs it and moves on to
/// the category's next query.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("search API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A failed liveness fetch. The classifier converts this into a dead
/// verdict rather than propagating it.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError(err.to_string())
    }
}
