use std::sync::Arc;

use pomdl_model::{Gav, ParseError};
use pomdl_net::TransportError;
use thiserror::Error;

/// Failure of a single per-repository fetch attempt.
///
/// These never abort a fan-out: the loop records them as events and moves on
/// to the next repository.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl DownloadError {
    /// Stable short name for metrics tagging.
    pub fn class_name(&self) -> &'static str {
        match self {
            DownloadError::Transport(error) => error.class_name(),
            DownloadError::Parse(_) => "parse",
        }
    }
}

/// Callback invoked with per-repository failures that were swallowed during
/// a fan-out. Purely informational.
pub type ErrorCallback = Arc<dyn Fn(&DownloadError) + Send + Sync>;

/// Top-level resolution failure for one coordinate. The caller's batch keeps
/// going; this only fails the coordinate it names.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The snapshot version could not be mapped to a dated build, either
    /// because no repository had usable metadata or because the responding
    /// repository no longer lists a snapshot at that coordinate.
    #[error("cannot resolve snapshot version for {gav}")]
    SnapshotUnresolved { gav: Gav },

    /// Every candidate repository was tried and none produced the POM.
    #[error("no repository provided a POM for {gav} (tried: {repositories:?})")]
    NotFound {
        gav: Gav,
        repositories: Vec<String>,
    },
}
