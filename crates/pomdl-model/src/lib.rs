//! Immutable data model for Maven POM and metadata resolution.
//!
//! Everything in this crate is a value: transformations such as
//! [`MavenRepository::with_uri`] or [`RawPom::with_repository`] return new
//! instances instead of mutating in place. Parsing of the underlying XML
//! documents is injected through the [`PomParser`] and [`MetadataParser`]
//! traits; this crate only defines the shapes the resolver works with.

pub use bytes::Bytes;

pub use self::gav::{Gav, SNAPSHOT_SUFFIX, is_snapshot};
pub use self::metadata::{MavenMetadata, Snapshot, Versioning};
pub use self::parser::{MetadataParser, ParseError, PomParser};
pub use self::pom::{ProjectPoms, RawPom};
pub use self::repository::MavenRepository;

mod gav;
mod metadata;
mod parser;
mod pom;
mod repository;
