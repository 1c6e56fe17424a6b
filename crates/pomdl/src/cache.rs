use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pomdl_model::{MavenMetadata, MavenRepository, RawPom};

use crate::error::DownloadError;

/// How a cache lookup was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// Found without recomputation.
    Cached,
    /// Recomputed and stored.
    Updated,
    /// Recomputation ran and produced nothing; the miss is stored.
    Unavailable,
}

/// Result of a cache-fronted computation.
#[derive(Clone, Debug)]
pub struct CacheResult<T> {
    pub state: CacheState,
    pub data: Option<T>,
}

impl<T> CacheResult<T> {
    pub fn cached(data: Option<T>) -> Self {
        Self {
            state: CacheState::Cached,
            data,
        }
    }

    pub fn updated(data: T) -> Self {
        Self {
            state: CacheState::Updated,
            data: Some(data),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            state: CacheState::Unavailable,
            data: None,
        }
    }
}

/// The sole gate between the resolver and the network: every repository
/// probe, metadata fetch, and POM fetch goes through one of these methods.
///
/// `compute` is an already-constructed future; since futures are lazy it is
/// only driven on a cache miss. A compute returning `Ok(None)` means the
/// repository answered with nothing, and the miss itself is stored so the
/// question is not re-asked for the cache's lifetime. A compute returning
/// `Err` is *not* stored; a later resolution may retry a flaky repository.
pub trait PomCache: Send + Sync {
    /// Normalization results, keyed by the *input* descriptor's URI.
    fn compute_repository<F>(
        &self,
        repository: &MavenRepository,
        compute: F,
    ) -> impl Future<Output = Result<CacheResult<MavenRepository>, DownloadError>> + Send
    where
        F: Future<Output = Result<Option<MavenRepository>, DownloadError>> + Send;

    /// Metadata documents, keyed by repository URI, coordinate, and the
    /// optional version qualifier of snapshot-specific metadata.
    fn compute_metadata<F>(
        &self,
        repository_uri: &str,
        group_id: &str,
        artifact_id: &str,
        version: Option<&str>,
        compute: F,
    ) -> impl Future<Output = Result<CacheResult<MavenMetadata>, DownloadError>> + Send
    where
        F: Future<Output = Result<Option<MavenMetadata>, DownloadError>> + Send;

    /// POM documents, keyed by repository URI and the fully resolved
    /// coordinate.
    fn compute_pom<F>(
        &self,
        repository_uri: &str,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        compute: F,
    ) -> impl Future<Output = Result<CacheResult<RawPom>, DownloadError>> + Send
    where
        F: Future<Output = Result<Option<RawPom>, DownloadError>> + Send;
}

type MetadataKey = (String, String, String, Option<String>);
type PomKey = (String, String, String, String);

/// Process-lifetime in-memory cache.
///
/// Safe for concurrent use. Two concurrent misses for the same key may both
/// drive their compute futures (last write wins); implementations of
/// [`PomCache`] that want single-flight behavior can collapse duplicates,
/// this one keeps its locking trivial instead.
#[derive(Default)]
pub struct InMemoryPomCache {
    repositories: Mutex<HashMap<String, Option<MavenRepository>>>,
    metadata: Mutex<HashMap<MetadataKey, Option<MavenMetadata>>>,
    poms: Mutex<HashMap<PomKey, Option<RawPom>>>,
}

impl InMemoryPomCache {
    pub fn new() -> Self {
        Self::default()
    }
}

// The maps hold plain data, so a panic while the lock was held cannot leave
// them in a torn state; recover the guard instead of propagating the poison.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn compute_entry<K, V, F>(
    table: &Mutex<HashMap<K, Option<V>>>,
    key: K,
    compute: F,
) -> Result<CacheResult<V>, DownloadError>
where
    K: std::hash::Hash + Eq,
    V: Clone,
    F: Future<Output = Result<Option<V>, DownloadError>>,
{
    if let Some(hit) = lock(table).get(&key) {
        return Ok(CacheResult::cached(hit.clone()));
    }
    let computed = compute.await?;
    lock(table).insert(key, computed.clone());
    Ok(match computed {
        Some(value) => CacheResult::updated(value),
        None => CacheResult::unavailable(),
    })
}

impl PomCache for InMemoryPomCache {
    async fn compute_repository<F>(
        &self,
        repository: &MavenRepository,
        compute: F,
    ) -> Result<CacheResult<MavenRepository>, DownloadError>
    where
        F: Future<Output = Result<Option<MavenRepository>, DownloadError>> + Send,
    {
        compute_entry(&self.repositories, repository.uri().to_string(), compute).await
    }

    async fn compute_metadata<F>(
        &self,
        repository_uri: &str,
        group_id: &str,
        artifact_id: &str,
        version: Option<&str>,
        compute: F,
    ) -> Result<CacheResult<MavenMetadata>, DownloadError>
    where
        F: Future<Output = Result<Option<MavenMetadata>, DownloadError>> + Send,
    {
        let key = (
            repository_uri.to_string(),
            group_id.to_string(),
            artifact_id.to_string(),
            version.map(str::to_string),
        );
        compute_entry(&self.metadata, key, compute).await
    }

    async fn compute_pom<F>(
        &self,
        repository_uri: &str,
        group_id: &str,
        artifact_id: &str,
        version: &str,
        compute: F,
    ) -> Result<CacheResult<RawPom>, DownloadError>
    where
        F: Future<Output = Result<Option<RawPom>, DownloadError>> + Send,
    {
        let key = (
            repository_uri.to_string(),
            group_id.to_string(),
            artifact_id.to_string(),
            version.to_string(),
        );
        compute_entry(&self.poms, key, compute).await
    }
}

#[cfg(test)]
mod tests {
    use pomdl_model::{MavenMetadata, Versioning};
    use pomdl_net::TransportError;

    use super::*;

    fn metadata(versions: &[&str]) -> MavenMetadata {
        MavenMetadata {
            versioning: Versioning {
                versions: versions.iter().map(|v| v.to_string()).collect(),
                snapshot: None,
            },
        }
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = InMemoryPomCache::new();

        let first = cache
            .compute_metadata("https://r.example", "g", "a", None, async {
                Ok(Some(metadata(&["1.0"])))
            })
            .await
            .unwrap();
        assert_eq!(first.state, CacheState::Updated);

        let second = cache
            .compute_metadata("https://r.example", "g", "a", None, async {
                panic!("cache hit must not recompute")
            })
            .await
            .unwrap();
        assert_eq!(second.state, CacheState::Cached);
        assert_eq!(second.data, Some(metadata(&["1.0"])));
    }

    #[tokio::test]
    async fn negative_results_are_stored() {
        let cache = InMemoryPomCache::new();

        let first = cache
            .compute_metadata("https://r.example", "g", "a", None, async { Ok(None) })
            .await
            .unwrap();
        assert_eq!(first.state, CacheState::Unavailable);
        assert!(first.data.is_none());

        let second = cache
            .compute_metadata("https://r.example", "g", "a", None, async {
                panic!("stored miss must not recompute")
            })
            .await
            .unwrap();
        assert_eq!(second.state, CacheState::Cached);
        assert!(second.data.is_none());
    }

    #[tokio::test]
    async fn errors_are_not_stored() {
        let cache = InMemoryPomCache::new();

        let first = cache
            .compute_metadata("https://r.example", "g", "a", None, async {
                Err(DownloadError::Transport(TransportError::ReadTimeout(
                    "boom".into(),
                )))
            })
            .await;
        assert!(first.is_err());

        // The failed attempt left no entry behind, so the next one computes.
        let second = cache
            .compute_metadata("https://r.example", "g", "a", None, async {
                Ok(Some(metadata(&["1.0"])))
            })
            .await
            .unwrap();
        assert_eq!(second.state, CacheState::Updated);
    }

    #[tokio::test]
    async fn version_qualifier_is_part_of_the_key() {
        let cache = InMemoryPomCache::new();

        cache
            .compute_metadata("https://r.example", "g", "a", None, async {
                Ok(Some(metadata(&["1.0"])))
            })
            .await
            .unwrap();

        let qualified = cache
            .compute_metadata("https://r.example", "g", "a", Some("1.0-SNAPSHOT"), async {
                Ok(Some(metadata(&["1.0-SNAPSHOT"])))
            })
            .await
            .unwrap();
        assert_eq!(qualified.state, CacheState::Updated);
    }
}
