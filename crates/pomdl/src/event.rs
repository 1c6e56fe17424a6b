use crate::cache::CacheState;

/// What kind of document an attempt was after.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Metadata,
    Pom,
}

/// How a single per-repository attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Served from cache without recomputation.
    Cached,
    /// Freshly fetched and stored.
    Downloaded,
    /// The repository answered but had nothing (or a cached miss was hit).
    Unavailable,
    /// Transport or parse failure; `error_class` names it.
    Error,
}

impl From<CacheState> for Outcome {
    fn from(state: CacheState) -> Self {
        match state {
            CacheState::Cached => Outcome::Cached,
            CacheState::Updated => Outcome::Downloaded,
            CacheState::Unavailable => Outcome::Unavailable,
        }
    }
}

/// Observability record for one per-repository fetch attempt. Never consulted
/// for control decisions.
#[derive(Clone, Debug)]
pub struct DownloadEvent {
    pub repository_uri: String,
    pub group_id: String,
    pub artifact_id: String,
    pub kind: EventKind,
    pub outcome: Outcome,
    pub error_class: Option<&'static str>,
}

/// Receives one event per repository attempt. Implementations should be
/// cheap; they run inline with resolution.
pub trait DownloadEventSink: Send + Sync {
    fn record(&self, event: DownloadEvent);
}

/// Default sink that drops every event.
pub struct NoopEventSink;

impl DownloadEventSink for NoopEventSink {
    fn record(&self, _event: DownloadEvent) {}
}
