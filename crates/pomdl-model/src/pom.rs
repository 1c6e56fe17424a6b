use std::collections::HashMap;
use std::path::PathBuf;

use bytes::Bytes;

use crate::gav::Gav;
use crate::repository::MavenRepository;

/// A POM document located for a coordinate, before any dependency-graph
/// interpretation of its contents.
///
/// `document` holds the raw bytes; structured parsing beyond the coordinate
/// is the business of downstream consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawPom {
    pub gav: Gav,
    /// Filesystem path (for project POMs) or a synthetic path used only in
    /// diagnostics (for downloaded ones).
    pub source_path: PathBuf,
    /// The repository that served this POM, absent for local project POMs.
    pub repository: Option<MavenRepository>,
    pub document: Bytes,
}

impl RawPom {
    pub fn new(gav: Gav, source_path: impl Into<PathBuf>, document: Bytes) -> Self {
        Self {
            gav,
            source_path: source_path.into(),
            repository: None,
            document,
        }
    }

    /// A copy tagged with the repository it was downloaded from.
    pub fn with_repository(self, repository: MavenRepository) -> Self {
        Self {
            repository: Some(repository),
            ..self
        }
    }
}

/// Read-only index of the build's own in-progress POMs, keyed by filesystem
/// path. Populated by the (external) project loader before resolution starts.
pub type ProjectPoms = HashMap<PathBuf, RawPom>;
