use std::fmt;

use serde::{Deserialize, Serialize};

/// Version suffix marking a mutable, re-publishable snapshot version.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Whether a version string refers to a mutable snapshot that still needs
/// timestamp resolution.
pub fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT_SUFFIX)
}

/// A Maven coordinate: groupId, artifactId, version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gav {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Gav {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    pub fn is_snapshot(&self) -> bool {
        is_snapshot(&self.version)
    }
}

impl fmt::Display for Gav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_with_colons() {
        let gav = Gav::new("org.example", "lib", "1.0");
        assert_eq!(gav.to_string(), "org.example:lib:1.0");
    }

    #[test]
    fn snapshot_detection() {
        assert!(Gav::new("g", "a", "1.0-SNAPSHOT").is_snapshot());
        assert!(!Gav::new("g", "a", "1.0").is_snapshot());
        // The marker only counts as a suffix.
        assert!(!Gav::new("g", "a", "1.0-SNAPSHOT-rc1").is_snapshot());
    }
}
