use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::gav::is_snapshot;

// URLs are case-sensitive after the domain name, so the whole URI must never
// be lowercased; only the scheme match is case-insensitive.
static INSECURE_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[hH][tT][tT][pP]://").expect("valid scheme regex"));

/// An artifact repository candidate: base URI plus its release/snapshot
/// acceptance policy and optional basic-auth credentials.
///
/// Values are immutable; [`MavenRepository::with_uri`] produces a new
/// descriptor rather than rewriting the existing one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MavenRepository {
    id: String,
    uri: String,
    releases: bool,
    snapshots: bool,
    username: Option<String>,
    password: Option<String>,
}

impl MavenRepository {
    pub fn new(
        id: impl Into<String>,
        uri: impl Into<String>,
        releases: bool,
        snapshots: bool,
    ) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            releases,
            snapshots,
            username: None,
            password: None,
        }
    }

    /// The well-known default repository, appended as the final fallback for
    /// every metadata and POM lookup.
    ///
    /// See <https://maven.apache.org/ref/3.6.3/maven-model-builder/super-pom.html>.
    pub fn central() -> Self {
        Self::new("central", "https://repo.maven.apache.org/maven2", true, false)
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// A copy of this descriptor with a rewritten base URI.
    pub fn with_uri(&self, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..self.clone()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Whether this repository may be queried for the given version,
    /// according to its release/snapshot policy.
    pub fn accepts_version(&self, version: &str) -> bool {
        if is_snapshot(version) {
            self.snapshots
        } else {
            self.releases
        }
    }

    /// Basic-auth pair, present only when both username and password are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }

    pub fn is_insecure(&self) -> bool {
        INSECURE_SCHEME.is_match(&self.uri)
    }

    /// The base URI with an insecure scheme rewritten to `https://`. Already
    /// secure URIs come back unchanged.
    pub fn secure_uri(&self) -> String {
        INSECURE_SCHEME.replace(&self.uri, "https://").into_owned()
    }
}
