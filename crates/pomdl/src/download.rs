use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use pomdl_model::{
    Gav, MavenMetadata, MavenRepository, MetadataParser, PomParser, ProjectPoms, RawPom,
    is_snapshot,
};
use pomdl_net::{HttpClient, RetryingClient, TransportError};
use tracing::{debug, warn};

use crate::cache::{CacheResult, PomCache};
use crate::error::{DownloadError, ErrorCallback, ResolveError};
use crate::event::{DownloadEvent, DownloadEventSink, EventKind, NoopEventSink, Outcome};

/// Resolves POMs and version metadata for coordinates against a prioritized
/// repository list.
///
/// Construction is plain dependency injection: the retry-wrapped client, the
/// cache, the parsers, and the project-POM index are all owned here, scoped
/// to whatever lifetime the caller gives the downloader.
pub struct PomDownloader<C: HttpClient, K: PomCache> {
    client: RetryingClient<C>,
    cache: K,
    project_poms: ProjectPoms,
    pom_parser: Arc<dyn PomParser>,
    metadata_parser: Arc<dyn MetadataParser>,
    events: Arc<dyn DownloadEventSink>,
    on_error: Option<ErrorCallback>,
}

impl<C: HttpClient, K: PomCache> PomDownloader<C, K> {
    pub fn new(
        client: RetryingClient<C>,
        cache: K,
        project_poms: ProjectPoms,
        pom_parser: Arc<dyn PomParser>,
        metadata_parser: Arc<dyn MetadataParser>,
    ) -> Self {
        Self {
            client,
            cache,
            project_poms,
            pom_parser,
            metadata_parser,
            events: Arc::new(NoopEventSink),
            on_error: None,
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn DownloadEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Callback receiving per-repository failures that were swallowed during
    /// fan-outs.
    pub fn with_error_callback(mut self, on_error: ErrorCallback) -> Self {
        self.on_error = Some(on_error);
        self
    }

    /// Fetch and merge version metadata for `group_id:artifact_id` across
    /// `repositories` (Maven Central is always consulted last).
    ///
    /// Total by construction: repositories that are unreachable, answer
    /// non-2xx, or serve malformed documents contribute nothing, and the
    /// merged result of zero contributions is [`MavenMetadata::empty`].
    pub async fn download_metadata(
        &self,
        group_id: &str,
        artifact_id: &str,
        repositories: &[MavenRepository],
    ) -> MavenMetadata {
        let mut merged = MavenMetadata::empty();
        let mut seen = Vec::new();
        for candidate in candidate_repositories(repositories, true, None) {
            let Some(repo) = self.normalize_repository(&candidate).await else {
                debug!(repository = candidate.uri(), "repository unavailable, skipping");
                continue;
            };
            if !mark_seen(&mut seen, repo.uri()) {
                continue;
            }
            let result = self
                .cache
                .compute_metadata(
                    repo.uri(),
                    group_id,
                    artifact_id,
                    None,
                    self.fetch_metadata(group_id, artifact_id, None, &repo),
                )
                .await;
            if let Some(metadata) =
                self.record_outcome(&repo, group_id, artifact_id, EventKind::Metadata, result)
            {
                merged = merged.merge(metadata);
            }
        }
        merged
    }

    /// Locate the POM for `gav`, preferring the build's own project POMs,
    /// then trying `repositories` in order with Maven Central appended.
    ///
    /// `relative_path` and `containing_pom` come from a `<parent>` or module
    /// reference in the POM that asked for this one.
    pub async fn download(
        &self,
        gav: &Gav,
        relative_path: Option<&str>,
        containing_pom: Option<&RawPom>,
        repositories: &[MavenRepository],
    ) -> Result<RawPom, ResolveError> {
        // An in-progress project POM always wins over anything a repository
        // could serve, and must not cost a network round-trip.
        for project_pom in self.project_poms.values() {
            if project_pom.gav.group_id == gav.group_id
                && project_pom.gav.artifact_id == gav.artifact_id
            {
                return Ok(project_pom.clone());
            }
        }

        if let (Some(containing), Some(relative)) = (containing_pom, relative_path)
            && !relative.trim().is_empty()
            && let Some(folder) = containing.source_path.parent()
        {
            let candidate = normalize_path(&folder.join(relative).join("pom.xml"));
            // POMs published to remote repositories still carry relative
            // parent paths like ".." or "../..", so the coordinates must
            // match exactly before trusting where the path happens to land.
            if let Some(local) = self.project_poms.get(&candidate)
                && local.gav == *gav
            {
                return Ok(local.clone());
            }
        }

        let resolved_version = match self
            .dated_snapshot_version(&gav.group_id, &gav.artifact_id, &gav.version, repositories)
            .await
        {
            Some(version) => version,
            None => return Err(ResolveError::SnapshotUnresolved { gav: gav.clone() }),
        };

        let mut attempted = Vec::new();
        for candidate in candidate_repositories(repositories, true, Some(&gav.version)) {
            let Some(repo) = self.normalize_repository(&candidate).await else {
                debug!(repository = candidate.uri(), "repository unavailable, skipping");
                continue;
            };
            if !mark_seen(&mut attempted, repo.uri()) {
                continue;
            }
            let result = self
                .cache
                .compute_pom(
                    repo.uri(),
                    &gav.group_id,
                    &gav.artifact_id,
                    &resolved_version,
                    self.fetch_pom(gav, &resolved_version, &repo),
                )
                .await;
            if let Some(pom) =
                self.record_outcome(&repo, &gav.group_id, &gav.artifact_id, EventKind::Pom, result)
            {
                return Ok(pom);
            }
        }

        Err(ResolveError::NotFound {
            gav: gav.clone(),
            repositories: attempted,
        })
    }

    /// Map a `-SNAPSHOT` version to its current dated build, querying
    /// snapshot-specific metadata repository by repository.
    ///
    /// The first repository answering with non-empty metadata settles the
    /// question: if its metadata carries no snapshot record, the coordinate
    /// no longer exists and later repositories are not consulted.
    async fn dated_snapshot_version(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        repositories: &[MavenRepository],
    ) -> Option<String> {
        if !is_snapshot(version) {
            return Some(version.to_string());
        }

        let mut found = None;
        let mut seen = Vec::new();
        for candidate in candidate_repositories(repositories, false, Some(version)) {
            let Some(repo) = self.normalize_repository(&candidate).await else {
                debug!(repository = candidate.uri(), "repository unavailable, skipping");
                continue;
            };
            if !mark_seen(&mut seen, repo.uri()) {
                continue;
            }
            let result = self
                .cache
                .compute_metadata(
                    repo.uri(),
                    group_id,
                    artifact_id,
                    Some(version),
                    self.fetch_metadata(group_id, artifact_id, Some(version), &repo),
                )
                .await;
            if let Some(metadata) =
                self.record_outcome(&repo, group_id, artifact_id, EventKind::Metadata, result)
                && !metadata.is_empty()
            {
                found = Some(metadata);
                break;
            }
        }

        let snapshot = found?.versioning.snapshot?;
        Some(format!(
            "{}{}-{}",
            version.strip_suffix("SNAPSHOT")?,
            snapshot.timestamp,
            snapshot.build_number
        ))
    }

    /// Determine the canonical, reachable base URI for a repository,
    /// memoized (positive and negative) by the cache.
    async fn normalize_repository(&self, repository: &MavenRepository) -> Option<MavenRepository> {
        let result = self
            .cache
            .compute_repository(repository, self.probe_repository(repository))
            .await;
        match result {
            Ok(cached) => cached.data,
            Err(error) => {
                warn!(repository = repository.uri(), %error, "repository probe failed");
                None
            }
        }
    }

    // Always prefer https; fall back to http only when the TLS handshake
    // fails and the repository was plain http to begin with.
    async fn probe_repository(
        &self,
        repository: &MavenRepository,
    ) -> Result<Option<MavenRepository>, DownloadError> {
        let original = repository.uri();
        let secure = repository.secure_uri();
        match self.client.get(&secure, repository.credentials()).await {
            Ok(response) if response.is_success() => Ok(Some(repository.with_uri(secure))),
            Ok(response) => {
                debug!(uri = %secure, status = response.status, "probe rejected");
                Ok(None)
            }
            Err(TransportError::Tls(_)) if secure != original => {
                match self.client.get(original, repository.credentials()).await {
                    Ok(response) if response.is_success() => Ok(Some(repository.clone())),
                    _ => Ok(None),
                }
            }
            Err(error) => {
                debug!(uri = %secure, %error, "probe failed");
                Ok(None)
            }
        }
    }

    async fn fetch_metadata(
        &self,
        group_id: &str,
        artifact_id: &str,
        version: Option<&str>,
        repository: &MavenRepository,
    ) -> Result<Option<MavenMetadata>, DownloadError> {
        let url = metadata_url(repository.uri(), group_id, artifact_id, version);
        let response = self.client.get(&url, repository.credentials()).await?;
        if !response.is_success() {
            debug!(url = %url, status = response.status, "no metadata");
            return Ok(None);
        }
        Ok(Some(self.metadata_parser.parse(&response.body)?))
    }

    async fn fetch_pom(
        &self,
        gav: &Gav,
        resolved_version: &str,
        repository: &MavenRepository,
    ) -> Result<Option<RawPom>, DownloadError> {
        let url = pom_url(repository.uri(), gav, resolved_version);
        let response = self.client.get(&url, repository.credentials()).await?;
        if !response.is_success() {
            debug!(url = %url, status = response.status, "no POM");
            return Ok(None);
        }
        // Shown in diagnostics only; downloaded POMs have no real path.
        let source_path: PathBuf = [&gav.group_id, &gav.artifact_id, &gav.version]
            .iter()
            .collect();
        let pom = self.pom_parser.parse(gav, &source_path, &response.body)?;
        Ok(Some(pom.with_repository(repository.clone())))
    }

    /// Fold one per-repository attempt into an event (and the optional error
    /// callback), yielding whatever data it produced.
    fn record_outcome<T>(
        &self,
        repository: &MavenRepository,
        group_id: &str,
        artifact_id: &str,
        kind: EventKind,
        result: Result<CacheResult<T>, DownloadError>,
    ) -> Option<T> {
        match result {
            Ok(cached) => {
                self.events.record(DownloadEvent {
                    repository_uri: repository.uri().to_string(),
                    group_id: group_id.to_string(),
                    artifact_id: artifact_id.to_string(),
                    kind,
                    outcome: cached.state.into(),
                    error_class: None,
                });
                cached.data
            }
            Err(error) => {
                warn!(repository = repository.uri(), %error, "repository fetch failed");
                if let Some(on_error) = &self.on_error {
                    on_error(&error);
                }
                self.events.record(DownloadEvent {
                    repository_uri: repository.uri().to_string(),
                    group_id: group_id.to_string(),
                    artifact_id: artifact_id.to_string(),
                    kind,
                    outcome: Outcome::Error,
                    error_class: Some(error.class_name()),
                });
                None
            }
        }
    }
}

/// The ordered candidate list for a fan-out: caller repositories first, the
/// accept-filter applied against the *nominal* requested version, Maven
/// Central appended last when asked for. Normalization happens lazily as the
/// fan-out walks the list, so repositories past a first success are never
/// probed.
fn candidate_repositories(
    repositories: &[MavenRepository],
    include_central: bool,
    version_filter: Option<&str>,
) -> Vec<MavenRepository> {
    let mut candidates = repositories.to_vec();
    if include_central {
        candidates.push(MavenRepository::central());
    }
    if let Some(version) = version_filter {
        candidates.retain(|repo| repo.accepts_version(version));
    }
    candidates
}

/// Record `uri` in the fan-out's dedup list; false when it was already there.
fn mark_seen(seen: &mut Vec<String>, uri: &str) -> bool {
    if seen.iter().any(|s| s == uri) {
        return false;
    }
    seen.push(uri.to_string());
    true
}

fn metadata_url(base: &str, group_id: &str, artifact_id: &str, version: Option<&str>) -> String {
    let mut url = format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        group_id.replace('.', "/"),
        artifact_id
    );
    if let Some(version) = version {
        url.push('/');
        url.push_str(version);
    }
    url.push_str("/maven-metadata.xml");
    url
}

// The directory keeps the nominal version; only the filename carries the
// dated snapshot build.
fn pom_url(base: &str, gav: &Gav, resolved_version: &str) -> String {
    format!(
        "{}/{}/{}/{}/{}-{}.pom",
        base.trim_end_matches('/'),
        gav.group_id.replace('.', "/"),
        gav.artifact_id,
        gav.version,
        gav.artifact_id,
        resolved_version
    )
}

/// Lexical path normalization: resolves `.` and `..` without touching the
/// filesystem, so project-POM lookups work for paths that may not exist yet.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_url_layout() {
        assert_eq!(
            metadata_url("https://repo.example/m2", "org.example", "lib", None),
            "https://repo.example/m2/org/example/lib/maven-metadata.xml"
        );
        assert_eq!(
            metadata_url("https://repo.example/m2/", "org.example", "lib", Some("1.0-SNAPSHOT")),
            "https://repo.example/m2/org/example/lib/1.0-SNAPSHOT/maven-metadata.xml"
        );
    }

    #[test]
    fn pom_url_uses_nominal_directory_and_resolved_filename() {
        let gav = Gav::new("org.example", "lib", "1.0-SNAPSHOT");
        assert_eq!(
            pom_url("https://repo.example/m2", &gav, "1.0-20240101.120000-3"),
            "https://repo.example/m2/org/example/lib/1.0-SNAPSHOT/lib-1.0-20240101.120000-3.pom"
        );
    }

    #[test]
    fn normalize_path_resolves_dots_lexically() {
        assert_eq!(
            normalize_path(Path::new("/work/app/../lib/./pom.xml")),
            PathBuf::from("/work/lib/pom.xml")
        );
        assert_eq!(
            normalize_path(Path::new("/work/app/child/../../other/pom.xml")),
            PathBuf::from("/work/other/pom.xml")
        );
    }
}
