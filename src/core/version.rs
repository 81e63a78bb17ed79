//! core::version
//!
//! Semantic version parsing of release tags and previous-release lookup.
//!
//! Tags are parsed with the `semver` crate after stripping one leading `v`.
//! Tags that fail to parse are not versions and never take part in a
//! comparison; that is a filtering rule, not an error.

use semver::Version;
use tracing::{debug, warn};

use crate::forge::Release;

/// Parse a release tag (`v1.2.3` or `1.2.3`) as a semantic version.
///
/// # Example
///
/// ```
/// use tagnotes::core::version::parse_tag;
///
/// assert_eq!(parse_tag("v1.0.10").unwrap().patch, 10);
/// assert!(parse_tag("ignore").is_none());
/// ```
pub fn parse_tag(tag: &str) -> Option<Version> {
    let raw = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(raw).ok()
}

/// Whether a version is a final release (no prerelease component).
pub fn is_final(version: &Version) -> bool {
    version.pre.is_empty()
}

/// Find the release immediately preceding `target`.
///
/// Candidates are releases whose tag parses as a final (non-prerelease)
/// version strictly lower than `target`. The highest such version wins,
/// using numeric ordering (`1.0.10 > 1.0.2`).
///
/// Returns `None` if there is no candidate or `target` itself does not
/// parse.
///
/// # Example
///
/// ```
/// use tagnotes::core::version::previous_release;
/// use tagnotes::forge::Release;
///
/// let releases = vec![
///     Release::new("v1.0.2", "master"),
///     Release::new("v1.0.10", "master"),
/// ];
/// let prev = previous_release(&releases, "v1.0.3").unwrap();
/// assert_eq!(prev.tag, "v1.0.2");
/// ```
pub fn previous_release<'a>(releases: &'a [Release], target: &str) -> Option<&'a Release> {
    let Some(target_version) = parse_tag(target) else {
        warn!(version = target, "target version is not a semantic version");
        return None;
    };

    let previous = releases
        .iter()
        .filter_map(|r| parse_tag(&r.tag).map(|v| (v, r)))
        .filter(|(v, _)| is_final(v) && *v < target_version)
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, r)| r);

    debug!(
        version = target,
        previous = previous.map(|r| r.tag.as_str()),
        "resolved previous release"
    );
    previous
}
