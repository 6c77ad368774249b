//! Kubernetes API version ordering
//!
//! Versions sort by stability first (GA > beta > alpha), then by major and
//! minor number: `v2 > v1 > v1beta2 > v1beta1 > v1alpha1`. Tokens outside the
//! `v<major>[alpha|beta<minor>]` form sort below all others.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stability {
    Alpha,
    Beta,
    Ga,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KubeVersion {
    major: u32,
    stability: Stability,
    minor: u32,
}

impl KubeVersion {
    fn parse(token: &str) -> Option<Self> {
        let rest = token.strip_prefix('v')?;
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let major = rest[..digits].parse().ok()?;
        let suffix = &rest[digits..];

        let (stability, minor) = if suffix.is_empty() {
            (Stability::Ga, 0)
        } else if let Some(minor) = suffix.strip_prefix("beta") {
            (Stability::Beta, minor.parse().ok()?)
        } else if let Some(minor) = suffix.strip_prefix("alpha") {
            (Stability::Alpha, minor.parse().ok()?)
        } else {
            return None;
        };

        Some(Self {
            major,
            stability,
            minor,
        })
    }
}

impl Ord for KubeVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.stability
            .cmp(&other.stability)
            .then(self.major.cmp(&other.major))
            .then(self.minor.cmp(&other.minor))
    }
}

impl PartialOrd for KubeVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two version tokens; `Greater` means `a` is newer
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (KubeVersion::parse(a), KubeVersion::parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let mut versions = vec!["v1alpha1", "v1", "v2beta1", "v1beta2", "v2", "v1beta1"];
        versions.sort_by(|a, b| compare_versions(b, a));
        assert_eq!(
            versions,
            vec!["v2", "v1", "v2beta1", "v1beta2", "v1beta1", "v1alpha1"]
        );
    }

    #[test]
    fn test_unparsable_versions_sort_last() {
        assert_eq!(compare_versions("v1alpha1", "resource"), Ordering::Greater);
        assert_eq!(compare_versions("resource", "v1"), Ordering::Less);
        assert_eq!(compare_versions("vNext", "v1beta1"), Ordering::Less);
    }
}
