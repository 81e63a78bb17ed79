//! changelog::window
//!
//! Time bounds of the reporting window, read from local history.
//!
//! Both bounds are timezone-naive UTC timestamps. Commit dates come from
//! [`CommitLog::committer_date`] with the committer's offset and are
//! shifted to UTC here.

use chrono::{DateTime, NaiveDateTime};
use tracing::debug;

use super::ChangelogError;
use crate::git::CommitLog;

/// Convert an RFC 3339 date with UTC offset to naive UTC.
///
/// # Example
///
/// ```
/// use tagnotes::changelog::window::parse_commit_date;
///
/// let utc = parse_commit_date("2019-10-05T13:45:17+07:00").unwrap();
/// assert_eq!(utc.to_string(), "2019-10-05 06:45:17");
/// ```
pub fn parse_commit_date(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|date| date.naive_utc())
}

/// The UTC committer timestamp of `rev`.
///
/// # Errors
///
/// - [`ChangelogError::Git`] if the revision can't be read
/// - [`ChangelogError::InvalidCommitDate`] if the date doesn't parse
pub fn version_end(log: &dyn CommitLog, rev: &str) -> Result<NaiveDateTime, ChangelogError> {
    let raw = log.committer_date(rev)?;
    let end = parse_commit_date(&raw).ok_or_else(|| ChangelogError::InvalidCommitDate {
        rev: rev.to_string(),
        value: raw.clone(),
    })?;
    debug!(rev, %end, "commit date");
    Ok(end)
}

/// Id of the repository's initial commit.
///
/// This is the last entry of the newest-first commit list.
///
/// # Errors
///
/// - [`ChangelogError::EmptyHistory`] if HEAD has no commits
pub fn first_sha(log: &dyn CommitLog) -> Result<String, ChangelogError> {
    log.commit_ids()?
        .pop()
        .ok_or(ChangelogError::EmptyHistory)
}
