//! Maven POM and metadata resolution across prioritized repositories.
//!
//! [`PomDownloader`] locates the POM for a coordinate by checking the
//! build's own project POMs first, then fanning out over a normalized,
//! deduplicated repository list (HTTPS preferred, Maven Central appended as
//! the final fallback). All network access goes through an injected
//! [`PomCache`] and a retry-wrapped transport from `pomdl-net`; per-repository
//! failures are swallowed into [`DownloadEvent`]s so one unreachable
//! repository never aborts resolution against the rest.
//!
//! Document parsing is injected via the `pomdl-model` parser traits, and
//! nothing in this crate is process-global: client, cache, parsers, and
//! sinks are all owned by the [`PomDownloader`] the caller constructs.

pub use self::cache::{CacheResult, CacheState, InMemoryPomCache, PomCache};
pub use self::download::PomDownloader;
pub use self::error::{DownloadError, ErrorCallback, ResolveError};
pub use self::event::{DownloadEvent, DownloadEventSink, EventKind, NoopEventSink, Outcome};

mod cache;
mod download;
mod error;
mod event;
