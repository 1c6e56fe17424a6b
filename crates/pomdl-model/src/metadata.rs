use serde::{Deserialize, Serialize};

/// Version listing for one group/artifact pair, as served by a repository's
/// `maven-metadata.xml`.
///
/// The empty value ([`MavenMetadata::empty`]) is the identity element of
/// [`MavenMetadata::merge`], which combines listings discovered across
/// multiple repositories.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MavenMetadata {
    #[serde(default)]
    pub versioning: Versioning,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioning {
    /// Discovery order is preserved; duplicates across repositories are kept.
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub snapshot: Option<Snapshot>,
}

/// The dated build a `-SNAPSHOT` version currently points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: String,
    pub build_number: String,
}

impl MavenMetadata {
    /// "No metadata found" sentinel; the identity element of [`merge`].
    ///
    /// [`merge`]: MavenMetadata::merge
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.versioning.versions.is_empty() && self.versioning.snapshot.is_none()
    }

    /// Combine two listings: version lists are concatenated left-to-right and
    /// the snapshot record is dropped once listings from more than one source
    /// are involved.
    pub fn merge(self, other: MavenMetadata) -> MavenMetadata {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let mut versions = self.versioning.versions;
        versions.extend(other.versioning.versions);
        MavenMetadata {
            versioning: Versioning {
                versions,
                snapshot: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_versions(versions: &[&str]) -> MavenMetadata {
        MavenMetadata {
            versioning: Versioning {
                versions: versions.iter().map(|v| v.to_string()).collect(),
                snapshot: None,
            },
        }
    }

    #[test]
    fn empty_is_merge_identity() {
        let m = with_versions(&["1.0", "1.1"]);
        assert_eq!(MavenMetadata::empty().merge(m.clone()), m);
        assert_eq!(m.clone().merge(MavenMetadata::empty()), m);
        assert!(MavenMetadata::empty().merge(MavenMetadata::empty()).is_empty());
    }

    #[test]
    fn merge_concatenates_in_order() {
        let merged = with_versions(&["1.0"]).merge(with_versions(&["2.0", "2.1"]));
        assert_eq!(merged.versioning.versions, vec!["1.0", "2.0", "2.1"]);
    }

    #[test]
    fn merge_is_associative() {
        let a = with_versions(&["1.0"]);
        let b = with_versions(&["2.0"]);
        let c = with_versions(&["3.0"]);
        assert_eq!(
            a.clone().merge(b.clone()).merge(c.clone()),
            a.merge(b.merge(c))
        );
    }

    #[test]
    fn merge_drops_snapshot_record() {
        let mut a = with_versions(&["1.0-SNAPSHOT"]);
        a.versioning.snapshot = Some(Snapshot {
            timestamp: "20240101.120000".into(),
            build_number: "3".into(),
        });
        let merged = a.merge(with_versions(&["1.0"]));
        assert!(merged.versioning.snapshot.is_none());
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let m: MavenMetadata =
            serde_json::from_str(r#"{"versioning":{"versions":["1.0"]}}"#).unwrap();
        assert_eq!(m.versioning.versions, vec!["1.0"]);
        assert!(m.versioning.snapshot.is_none());

        let empty: MavenMetadata = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn metadata_with_only_a_snapshot_is_not_empty() {
        let mut m = MavenMetadata::empty();
        m.versioning.snapshot = Some(Snapshot {
            timestamp: "20240101.120000".into(),
            build_number: "3".into(),
        });
        assert!(!m.is_empty());
    }
}
