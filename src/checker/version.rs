//! Permissive version comparison.
//!
//! Versions are compared on their dotted numeric segments only. Pre-release
//! and build suffixes are ignored, missing segments count as zero, and
//! segments that are not numbers are read as zero. Symbolic versions such as
//! `latest` never take part in ordering.

use crate::model::UpdateKind;

/// Floating or symbolic markers that cannot be ordered.
const SENTINELS: &[&str] = &["latest", "head", "local", "present", "unknown", "*", ""];

fn strip_prefix(version: &str) -> &str {
    let trimmed = version.trim();
    trimmed.strip_prefix('v').unwrap_or(trimmed)
}

fn is_sentinel(version: &str) -> bool {
    let lowered = version.to_ascii_lowercase();
    SENTINELS.contains(&lowered.as_str())
}

/// True for versions such as `latest` or `vHEAD` that take no part in ordering.
pub(crate) fn is_sentinel_version(version: &str) -> bool {
    is_sentinel(strip_prefix(version))
}

/// Splits a version into numeric segments, dropping any `-`/`+` suffix.
fn segments(version: &str) -> Vec<u64> {
    let numeric = match version.find(['-', '+']) {
        Some(idx) => &version[..idx],
        None => version,
    };

    numeric
        .split('.')
        .map(|s| s.trim().parse::<u64>().unwrap_or(0))
        .collect()
}

/// Compares two segment lists after zero-padding the shorter one.
fn compare_segments(a: &[u64], b: &[u64]) -> std::cmp::Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(std::cmp::Ordering::Equal)
}

/// Returns true if `candidate` is strictly newer than `baseline`.
///
/// Any comparison involving a sentinel such as `latest` or `HEAD` is false.
///
/// # Example
///
/// ```
/// use forgecheck::checker::is_newer;
///
/// assert!(is_newer("v2.0.0", "v1.9.9"));
/// assert!(!is_newer("1.0.0-rc2", "1.0.0-rc1"));
/// assert!(!is_newer("2.0.0", "latest"));
/// ```
pub fn is_newer(candidate: &str, baseline: &str) -> bool {
    let candidate = strip_prefix(candidate);
    let baseline = strip_prefix(baseline);

    if is_sentinel(candidate) || is_sentinel(baseline) {
        return false;
    }

    compare_segments(&segments(candidate), &segments(baseline)).is_gt()
}

/// Classify an update from `current` to `latest` as major, minor, or patch.
///
/// Returns `None` when `latest` is not newer than `current`.
pub fn classify_update(current: &str, latest: &str) -> Option<UpdateKind> {
    if !is_newer(latest, current) {
        return None;
    }

    let current = segments(strip_prefix(current));
    let latest = segments(strip_prefix(latest));
    let at = |v: &[u64], i: usize| v.get(i).copied().unwrap_or(0);

    if at(&latest, 0) != at(&current, 0) {
        Some(UpdateKind::Major)
    } else if at(&latest, 1) != at(&current, 1) {
        Some(UpdateKind::Minor)
    } else {
        Some(UpdateKind::Patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_newer_by_segment() {
        assert!(is_newer("2.0.0", "1.0.0"));
        assert!(is_newer("1.2.0", "1.1.0"));
        assert!(is_newer("1.0.2", "1.0.1"));
        assert!(!is_newer("1.0.1", "1.0.2"));
        assert!(is_newer("1.10.0", "1.9.0"));
    }

    #[test]
    fn test_is_newer_irreflexive() {
        for v in ["1.0.0", "v3.2", "0.0.1-beta", "latest", "abc"] {
            assert!(!is_newer(v, v), "{} should not be newer than itself", v);
        }
    }

    #[test]
    fn test_is_newer_antisymmetric() {
        let versions = ["0.1.0", "1.0.0", "1.0.0.1", "1.2", "2.0.0", "10.0.0"];
        for a in versions {
            for b in versions {
                if a != b {
                    assert_ne!(is_newer(a, b), is_newer(b, a), "{} vs {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_is_newer_strips_v_prefix() {
        assert!(is_newer("v2.0.0", "v1.0.0"));
        assert!(is_newer("v2.0.0", "1.0.0"));
        assert!(!is_newer("v1.0.0", "1.0.0"));
    }

    #[test]
    fn test_is_newer_sentinels() {
        for sentinel in ["latest", "HEAD", "local", "Latest"] {
            assert!(!is_newer("2.0.0", sentinel));
            assert!(!is_newer(sentinel, "2.0.0"));
        }
    }

    #[test]
    fn test_is_sentinel_version() {
        assert!(is_sentinel_version("latest"));
        assert!(is_sentinel_version(" HEAD "));
        assert!(!is_sentinel_version("v1.0.0"));
    }

    #[test]
    fn test_is_newer_ignores_prerelease_suffix() {
        assert!(!is_newer("1.0.0-rc2", "1.0.0-rc1"));
        assert!(!is_newer("1.0.0+build.5", "1.0.0"));
        assert!(is_newer("1.0.1-rc1", "1.0.0"));
    }

    #[test]
    fn test_is_newer_pads_segments() {
        assert!(is_newer("1.0.0.1", "1.0.0"));
        assert!(!is_newer("1.0.0", "1.0.0.1"));
        assert!(!is_newer("1.0", "1.0.0"));
        assert!(!is_newer("1.0.0", "1.0"));
    }

    #[test]
    fn test_is_newer_tolerates_garbage() {
        assert!(!is_newer("x.y.z", "0.0.0"));
        assert!(is_newer("1.x", "0.9"));
        assert!(is_newer("2", "1.x.5"));
    }

    #[test]
    fn test_classify_update() {
        assert_eq!(classify_update("1.2.3", "2.0.0"), Some(UpdateKind::Major));
        assert_eq!(classify_update("1.2.3", "1.3.0"), Some(UpdateKind::Minor));
        assert_eq!(classify_update("v1.2.3", "v1.2.4"), Some(UpdateKind::Patch));
        assert_eq!(classify_update("1.2.3", "1.2.3.1"), Some(UpdateKind::Patch));
        assert_eq!(classify_update("2.0.0", "1.0.0"), None);
        assert_eq!(classify_update("latest", "1.0.0"), None);
    }
}
