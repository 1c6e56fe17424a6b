use std::path::Path;

use thiserror::Error;

use crate::gav::Gav;
use crate::metadata::MavenMetadata;
use crate::pom::RawPom;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed POM document: {0}")]
    Pom(String),

    #[error("malformed maven-metadata document: {0}")]
    Metadata(String),
}

/// Parses raw POM bytes into a [`RawPom`].
///
/// Implementations are injected into the resolver; the resolver treats a
/// parse failure on a downloaded document the same way it treats a network
/// failure for that repository.
pub trait PomParser: Send + Sync {
    /// `requested` is the coordinate the document was fetched for and
    /// `source_path` only matters for diagnostics; the parsed coordinate
    /// comes from the document itself.
    fn parse(&self, requested: &Gav, source_path: &Path, document: &[u8])
    -> Result<RawPom, ParseError>;
}

/// Parses raw `maven-metadata.xml` bytes into a [`MavenMetadata`].
pub trait MetadataParser: Send + Sync {
    fn parse(&self, document: &[u8]) -> Result<MavenMetadata, ParseError>;
}
